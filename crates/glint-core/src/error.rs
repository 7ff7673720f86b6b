//! Error types for analysis and repair operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for glint operations
#[derive(Debug, Error)]
pub enum GlintError {
    /// Source text the parser could not make sense of
    #[error("Parse error: {message} at offset {offset}")]
    ParseError { message: String, offset: usize },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Rule registration or execution errors
    #[error("Rule error in '{rule_id}': {message}")]
    RuleError { rule_id: String, message: String },

    #[error("Unknown rule '{rule_id}'")]
    UnknownRule { rule_id: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Config,
    Rule,
    Io,
    Serialization,
    Internal,
}

impl GlintError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GlintError::ParseError { .. } => ErrorKind::Parse,
            GlintError::ConfigError { .. } => ErrorKind::Config,
            GlintError::RuleError { .. } | GlintError::UnknownRule { .. } => ErrorKind::Rule,
            GlintError::IoError { .. } => ErrorKind::Io,
            GlintError::SerializationError(_) => ErrorKind::Serialization,
            GlintError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse | ErrorKind::Rule | ErrorKind::Io)
    }

    pub fn parse_error(message: impl Into<String>, offset: usize) -> Self {
        Self::ParseError {
            message: message.into(),
            offset,
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    pub fn unknown_rule(rule_id: impl Into<String>) -> Self {
        Self::UnknownRule {
            rule_id: rule_id.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for GlintError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
