//! Result type alias for glint operations

use std::fmt::Display;

use crate::error::GlintError;

/// Standard Result type for glint operations
pub type Result<T> = std::result::Result<T, GlintError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Log the error at `warn` under `context` and pass the result through
    fn log_err(self, context: &str) -> Result<T>;

    /// Prefix the error message with lazily computed context
    fn with_context<C: Display>(self, context: impl FnOnce() -> C) -> Result<T>;

    /// `Ok(None)` for recoverable errors, which are logged
    fn recoverable(self) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn log_err(self, context: &str) -> Result<T> {
        if let Err(err) = &self {
            tracing::warn!("{context}: {err}");
        }
        self
    }

    fn with_context<C: Display>(self, context: impl FnOnce() -> C) -> Result<T> {
        self.map_err(|err| {
            let context = context();
            match err {
                GlintError::ConfigError { message } => GlintError::ConfigError {
                    message: format!("{context}: {message}"),
                },
                GlintError::RuleError { rule_id, message } => GlintError::RuleError {
                    rule_id,
                    message: format!("{context}: {message}"),
                },
                GlintError::ParseError { message, offset } => GlintError::ParseError {
                    message: format!("{context}: {message}"),
                    offset,
                },
                GlintError::InternalError { message } => GlintError::InternalError {
                    message: format!("{context}: {message}"),
                },
                // No message field to prefix
                other => GlintError::InternalError {
                    message: format!("{context}: {other}"),
                },
            }
        })
    }

    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("Recoverable error: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_prefixes_message() {
        let result: Result<()> = Err(GlintError::config_error("missing field"));
        let err = result.with_context(|| "loading .glintrc.toml").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: loading .glintrc.toml: missing field"
        );
    }

    #[test]
    fn test_log_err_passes_through() {
        let ok: Result<u8> = Ok(1);
        assert_eq!(ok.log_err("ctx").unwrap(), 1);
        let err: Result<u8> = Err(GlintError::internal_error("boom"));
        assert!(err.log_err("ctx").is_err());
    }

    #[test]
    fn test_recoverable() {
        let parse: Result<u8> = Err(GlintError::parse_error("x", 0));
        assert_eq!(parse.recoverable().unwrap(), None);
        let config: Result<u8> = Err(GlintError::config_error("x"));
        assert!(config.recoverable().is_err());
    }
}
