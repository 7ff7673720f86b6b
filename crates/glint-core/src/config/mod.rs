//! Configuration system for glint
//!
//! Configuration lives in `.glintrc.toml` (preferred) or `.glintrc.json`
//! (JSON with comments and trailing commas). Without an explicit path the
//! loader searches from the start directory upward and uses the first file
//! it finds; with no file at all the defaults apply.
//!
//! ## Example Configuration
//!
//! ```toml
//! root = true
//!
//! [files]
//! include = ["src/**/*.cs"]
//! exclude = ["**/Generated"]
//!
//! [linter]
//! enabled = true
//!
//! [linter.rules]
//! recommended = true
//!
//! [linter.rules.usage]
//! unique-non-set-collection = "warn"
//! GL1006 = "off"
//!
//! [linter.rules.style]
//! trailing-binary-operator = "info"
//! ```

mod glint_config;
mod loader;

pub use glint_config::{
    FileMatcher, FilesConfiguration, GlintConfiguration, LinterConfiguration, RuleCategory,
    RuleInfo, RuleSelection, RuleSeverity, RulesConfiguration, json_schema,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader, LoadedConfig};
