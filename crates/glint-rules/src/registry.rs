//! Rule registry

use std::collections::BTreeMap;
use std::fmt::Write as _;

use glint_core::{RuleCategory, RuleInfo, Severity};
use serde::Serialize;

use crate::builtin::BuiltinRules;
use crate::rule::Rule;

/// One line of the rule listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRow {
    pub id: &'static str,
    pub name: &'static str,
    pub category: RuleCategory,
    pub severity: Severity,
    pub enabled: bool,
    pub fixable: bool,
    pub title: &'static str,
}

/// Registry of rules keyed by id
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<&'static str, Rule>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in rule
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        for rule in BuiltinRules::all() {
            registry.register(rule);
        }
        tracing::debug!(rules = registry.len(), "Registered built-in rules");
        registry
    }

    /// Register a rule; a second rule with the same id is ignored
    pub fn register(&mut self, rule: Rule) -> bool {
        if self.rules.contains_key(rule.id) {
            tracing::warn!(
                "Rule '{}' already exists, keeping the first registration",
                rule.id
            );
            return false;
        }
        if self.get_by_name(rule.name).is_some() {
            tracing::warn!(
                "Rule name '{}' is already taken, ignoring rule '{}'",
                rule.name,
                rule.id
            );
            return false;
        }
        tracing::debug!(rule = rule.id, name = rule.name, "Registering rule");
        self.rules.insert(rule.id, rule);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Rule> {
        self.rules.values().find(|r| r.name == name)
    }

    /// Look a rule up by id or name
    pub fn find(&self, key: &str) -> Option<&Rule> {
        self.get(key).or_else(|| self.get_by_name(key))
    }

    /// Rules sorted by id
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn list_ids(&self) -> Vec<&'static str> {
        self.rules.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registration facts for configuration resolution
    pub fn rule_infos(&self) -> Vec<RuleInfo> {
        self.iter().map(Rule::info).collect()
    }

    pub fn table(&self) -> Vec<RuleRow> {
        self.iter()
            .map(|rule| RuleRow {
                id: rule.id,
                name: rule.name,
                category: rule.category,
                severity: rule.default_severity,
                enabled: rule.enabled_by_default,
                fixable: rule.is_fixable(),
                title: rule.title,
            })
            .collect()
    }

    /// Plain-text rendering of [`RuleRegistry::table`]
    pub fn render_table(&self) -> String {
        let rows = self.table();
        let name_width = rows
            .iter()
            .map(|r| r.name.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len());

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<8} {:<name_width$} {:<8} {:<8} {:<8} {}",
            "ID", "NAME", "CATEGORY", "SEVERITY", "ENABLED", "FIX"
        );
        for row in rows {
            let _ = writeln!(
                out,
                "{:<8} {:<name_width$} {:<8} {:<8} {:<8} {}",
                row.id,
                row.name,
                row.category.as_str(),
                row.severity.as_str(),
                if row.enabled { "yes" } else { "no" },
                if row.fixable { "yes" } else { "no" },
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = RuleRegistry::with_builtin_rules();
        assert_eq!(registry.len(), 11);
        assert_eq!(registry.list_ids()[0], "GL1001");
        assert_eq!(registry.find("verbose-linq-chain").unwrap().id, "GL2001");
        assert_eq!(registry.find("GL2001").unwrap().name, "verbose-linq-chain");
        assert!(registry.find("no-such-rule").is_none());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = RuleRegistry::with_builtin_rules();
        let mut clone = *registry.get("GL1001").unwrap();
        clone.title = "Replacement";
        assert!(!registry.register(clone));
        assert_eq!(registry.get("GL1001").unwrap().title, "Redundant .ToArray() call");

        clone.id = "GL1999";
        assert!(!registry.register(clone), "name collision must be rejected");
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn test_table_is_sorted_by_id() {
        let table = RuleRegistry::with_builtin_rules().table();
        let ids: Vec<_> = table.iter().map(|r| r.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(table.iter().all(|r| r.fixable));
    }
}
