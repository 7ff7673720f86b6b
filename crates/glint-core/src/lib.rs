//! Glint Core
//!
//! Foundation of the glint analysis and repair engine: lossless syntax trees
//! for a C#-family language, the semantic facts rules query, diagnostics,
//! configuration and error types.

pub mod config;
pub mod console;
pub mod cst;
pub mod diagnostics;
pub mod error;
pub mod result;
pub mod semantic;

pub use config::{
    ConfigLoader, FilesConfiguration, GlintConfiguration, LinterConfiguration, LoadedConfig,
    RuleCategory, RuleInfo, RuleSelection, RuleSeverity, RulesConfiguration,
};
pub use console::{Color, Console};
pub use cst::{CsSyntaxKind, SyntaxNode, SyntaxToken, SyntaxTree};
pub use diagnostics::{
    Diagnostic, DiagnosticRenderer, DiagnosticSink, LineIndex, Location, OutputFormat, Payload,
    PropertyBag, Severity,
};
pub use error::{ErrorKind, GlintError};
pub use result::{Result, ResultExt};
pub use semantic::{Compilation, MethodSymbol, SemanticFacts, TypeRef};

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` overrides `default_filter`; the CLI passes a level derived from
/// its `-v` flags.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second call keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "glint=info";

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
