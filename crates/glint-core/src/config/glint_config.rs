//! Configuration types for glint

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Severity;
use crate::error::GlintError;
use crate::result::Result;

/// Top-level configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlintConfiguration {
    /// File globs are relative to the directory holding this file
    #[schemars(description = "Marks the root configuration of a project")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<bool>,

    #[schemars(description = "File discovery configuration")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<FilesConfiguration>,

    #[schemars(description = "Linter configuration")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linter: Option<LinterConfiguration>,
}

impl GlintConfiguration {
    /// Get files configuration with defaults
    pub fn files_config(&self) -> FilesConfiguration {
        self.files.clone().unwrap_or_default()
    }

    /// Get linter configuration with defaults
    pub fn linter_config(&self) -> LinterConfiguration {
        self.linter.clone().unwrap_or_default()
    }
}

/// Linter configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinterConfiguration {
    #[schemars(description = "Enable or disable the linter")]
    pub enabled: Option<bool>,

    #[schemars(description = "Rule severity configuration")]
    pub rules: Option<RulesConfiguration>,
}

impl Default for LinterConfiguration {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            rules: Some(RulesConfiguration::default()),
        }
    }
}

/// Rules configuration
///
/// Category maps are keyed by rule name (`redundant-to-array`) or id
/// (`GL1001`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfiguration {
    /// Enable the rules that are on by default
    #[schemars(description = "Enable all recommended rules")]
    pub recommended: Option<bool>,

    /// Usage rules (misused library calls)
    #[schemars(description = "Usage rules configuration")]
    pub usage: Option<BTreeMap<String, RuleSeverity>>,

    /// Style rules (simpler equivalent forms)
    #[schemars(description = "Style rules configuration")]
    pub style: Option<BTreeMap<String, RuleSeverity>>,
}

impl Default for RulesConfiguration {
    fn default() -> Self {
        Self {
            recommended: Some(true),
            usage: None,
            style: None,
        }
    }
}

impl RulesConfiguration {
    fn category(&self, category: RuleCategory) -> Option<&BTreeMap<String, RuleSeverity>> {
        match category {
            RuleCategory::Usage => self.usage.as_ref(),
            RuleCategory::Style => self.style.as_ref(),
        }
    }
}

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Disable the rule
    Off,
    /// Reported to tooling only
    Hidden,
    /// Informational message
    Info,
    /// Warning (doesn't fail the check)
    Warn,
    /// Error (fails the check)
    Error,
}

impl RuleSeverity {
    /// Reporting severity, `None` when the rule is off
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Off => None,
            Self::Hidden => Some(Severity::Hidden),
            Self::Info => Some(Severity::Info),
            Self::Warn => Some(Severity::Warning),
            Self::Error => Some(Severity::Error),
        }
    }
}

/// Files configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilesConfiguration {
    #[schemars(description = "Glob patterns for files to include")]
    pub include: Option<Vec<String>>,

    #[schemars(description = "Glob patterns for files to exclude")]
    pub exclude: Option<Vec<String>>,
}

impl Default for FilesConfiguration {
    fn default() -> Self {
        Self {
            include: Some(vec!["**/*.cs".to_string()]),
            exclude: Some(vec!["**/bin".to_string(), "**/obj".to_string()]),
        }
    }
}

impl FilesConfiguration {
    /// Compile the include and exclude globs
    pub fn matcher(&self) -> Result<FileMatcher> {
        let defaults = Self::default();
        let compile = |patterns: &[String]| -> Result<Vec<Pattern>> {
            patterns
                .iter()
                .map(|p| {
                    Pattern::new(p).map_err(|e| GlintError::ConfigError {
                        message: format!("Invalid glob pattern '{p}': {e}"),
                    })
                })
                .collect()
        };
        let include = self.include.as_ref().or(defaults.include.as_ref());
        let exclude = self.exclude.as_ref().or(defaults.exclude.as_ref());
        Ok(FileMatcher {
            include: compile(include.map(Vec::as_slice).unwrap_or_default())?,
            exclude: compile(exclude.map(Vec::as_slice).unwrap_or_default())?,
        })
    }
}

/// Compiled file globs, matched against paths relative to the project root
///
/// An exclude pattern that matches a directory excludes everything below it.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileMatcher {
    pub fn matches(&self, relative: &Path) -> bool {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        let included = self
            .include
            .iter()
            .any(|p| p.matches_path_with(relative, options));
        included
            && !relative.ancestors().any(|path| {
                self.exclude
                    .iter()
                    .any(|p| p.matches_path_with(path, options))
            })
    }
}

/// Rule categories, used as configuration sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Usage,
    Style,
}

impl RuleCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::Style => "style",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration facts of one rule, as configuration sees them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub category: RuleCategory,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
}

/// Effective severity of every enabled rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSelection {
    enabled: BTreeMap<&'static str, Severity>,
}

impl RuleSelection {
    /// Every rule at its default severity if enabled by default
    pub fn defaults(rules: &[RuleInfo]) -> Self {
        Self::resolve(&LinterConfiguration::default(), rules)
    }

    /// Every rule at its default severity, including rules off by default
    pub fn all(rules: &[RuleInfo]) -> Self {
        Self {
            enabled: rules.iter().map(|r| (r.id, r.default_severity)).collect(),
        }
    }

    /// Apply a linter configuration to the known rules
    ///
    /// Names that match no rule are logged and ignored.
    pub fn resolve(linter: &LinterConfiguration, rules: &[RuleInfo]) -> Self {
        if linter.enabled == Some(false) {
            return Self::default();
        }
        let config = linter.rules.clone().unwrap_or_default();
        let recommended = config.recommended.unwrap_or(true);

        let mut enabled: BTreeMap<&'static str, Severity> = rules
            .iter()
            .filter(|r| recommended && r.enabled_by_default)
            .map(|r| (r.id, r.default_severity))
            .collect();

        for category in [RuleCategory::Usage, RuleCategory::Style] {
            for (key, level) in config.category(category).into_iter().flatten() {
                let Some(rule) = rules
                    .iter()
                    .find(|r| r.id == key.as_str() || r.name == key.as_str())
                else {
                    tracing::warn!("Unknown rule '{key}' in {category} configuration, ignoring");
                    continue;
                };
                if rule.category != category {
                    tracing::warn!(
                        "Rule '{key}' is a {} rule but configured under {category}",
                        rule.category
                    );
                }
                match level.severity() {
                    Some(severity) => enabled.insert(rule.id, severity),
                    None => enabled.remove(rule.id),
                };
            }
        }

        tracing::debug!(enabled = enabled.len(), "Resolved rule selection");
        Self { enabled }
    }

    /// Severity of an enabled rule
    pub fn severity(&self, rule_id: &str) -> Option<Severity> {
        self.enabled.get(rule_id).copied()
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.enabled.contains_key(rule_id)
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Severity)> + '_ {
        self.enabled.iter().map(|(id, severity)| (*id, *severity))
    }
}

/// JSON Schema of the configuration file
pub fn json_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(GlintConfiguration)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<RuleInfo> {
        vec![
            RuleInfo {
                id: "GL1001",
                name: "redundant-to-array",
                category: RuleCategory::Usage,
                default_severity: Severity::Warning,
                enabled_by_default: true,
            },
            RuleInfo {
                id: "GL1005",
                name: "unique-non-set-collection",
                category: RuleCategory::Usage,
                default_severity: Severity::Info,
                enabled_by_default: false,
            },
            RuleInfo {
                id: "GL2004",
                name: "negated-ternary-condition",
                category: RuleCategory::Style,
                default_severity: Severity::Info,
                enabled_by_default: true,
            },
        ]
    }

    #[test]
    fn test_rule_severity_serialization() {
        assert_eq!(serde_json::to_string(&RuleSeverity::Warn).unwrap(), r#""warn""#);
        let parsed: RuleSeverity = serde_json::from_str(r#""hidden""#).unwrap();
        assert_eq!(parsed.severity(), Some(Severity::Hidden));
        assert_eq!(RuleSeverity::Off.severity(), None);
    }

    #[test]
    fn test_default_selection() {
        let selection = RuleSelection::defaults(&rules());
        assert_eq!(selection.severity("GL1001"), Some(Severity::Warning));
        assert!(!selection.is_enabled("GL1005"));
        assert_eq!(selection.len(), 2);
        assert_eq!(RuleSelection::all(&rules()).len(), 3);
    }

    #[test]
    fn test_selection_overrides_by_name_and_id() {
        let mut usage = BTreeMap::new();
        usage.insert("unique-non-set-collection".to_string(), RuleSeverity::Error);
        usage.insert("GL1001".to_string(), RuleSeverity::Off);
        usage.insert("no-such-rule".to_string(), RuleSeverity::Warn);
        let linter = LinterConfiguration {
            enabled: Some(true),
            rules: Some(RulesConfiguration {
                recommended: Some(true),
                usage: Some(usage),
                style: None,
            }),
        };
        let selection = RuleSelection::resolve(&linter, &rules());
        assert_eq!(selection.severity("GL1005"), Some(Severity::Error));
        assert!(!selection.is_enabled("GL1001"));
        assert!(selection.is_enabled("GL2004"));
    }

    #[test]
    fn test_not_recommended_enables_only_named_rules() {
        let mut style = BTreeMap::new();
        style.insert("negated-ternary-condition".to_string(), RuleSeverity::Warn);
        let linter = LinterConfiguration {
            enabled: None,
            rules: Some(RulesConfiguration {
                recommended: Some(false),
                usage: None,
                style: Some(style),
            }),
        };
        let selection = RuleSelection::resolve(&linter, &rules());
        assert_eq!(
            selection.iter().collect::<Vec<_>>(),
            vec![("GL2004", Severity::Warning)]
        );
    }

    #[test]
    fn test_disabled_linter_selects_nothing() {
        let linter = LinterConfiguration {
            enabled: Some(false),
            rules: None,
        };
        assert!(RuleSelection::resolve(&linter, &rules()).is_empty());
    }

    #[test]
    fn test_file_matcher() {
        let matcher = FilesConfiguration::default().matcher().unwrap();
        assert!(matcher.matches(Path::new("Program.cs")));
        assert!(matcher.matches(Path::new("src/App/Program.cs")));
        assert!(!matcher.matches(Path::new("src/App/bin/Debug/Gen.cs")));
        assert!(!matcher.matches(Path::new("README.md")));

        let files = FilesConfiguration {
            include: Some(vec!["[".to_string()]),
            exclude: None,
        };
        assert!(files.matcher().is_err());
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = json_schema();
        let properties = &schema["properties"];
        assert!(properties.get("linter").is_some());
        assert!(properties.get("files").is_some());
    }
}
