//! Built-in rules
//!
//! Usage rules (`GL1xxx`) flag code that does needless work at run time.
//! Style rules (`GL2xxx`) flag code that reads worse than an equivalent
//! spelling.

mod locals;
pub mod style;
pub mod usage;

#[cfg(test)]
pub(crate) mod testing;

use crate::rule::Rule;

/// Collection of built-in rules
pub struct BuiltinRules;

impl BuiltinRules {
    pub fn usage_rules() -> Vec<Rule> {
        vec![
            usage::redundant_to_array::RULE,
            usage::materialize_before_linq::RULE,
            usage::to_list_for_each::RULE,
            usage::single_element_concat::RULE,
            usage::unique_non_set_collection::RULE,
            usage::discard_unused_out_variable::RULE,
            usage::redundant_spread_element::RULE,
        ]
    }

    pub fn style_rules() -> Vec<Rule> {
        vec![
            style::verbose_linq_chain::RULE,
            style::inline_single_use_out_variable::RULE,
            style::trailing_binary_operator::RULE,
            style::negated_ternary_condition::RULE,
        ]
    }

    /// Every built-in rule, usage rules first
    pub fn all() -> Vec<Rule> {
        let mut rules = Self::usage_rules();
        rules.extend(Self::style_rules());
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::RuleCategory;

    #[test]
    fn test_ids_follow_category() {
        for rule in BuiltinRules::usage_rules() {
            assert!(rule.id.starts_with("GL1"), "{}", rule.id);
            assert_eq!(rule.category, RuleCategory::Usage);
        }
        for rule in BuiltinRules::style_rules() {
            assert!(rule.id.starts_with("GL2"), "{}", rule.id);
            assert_eq!(rule.category, RuleCategory::Style);
        }
    }

    #[test]
    fn test_samples_are_annotated() {
        for rule in BuiltinRules::all() {
            assert!(rule.sample.contains("[|"), "{} sample has no span", rule.id);
            let fixed = rule.sample_fixed.unwrap_or_default();
            assert!(!fixed.contains("[|"), "{} fixed sample has a span", rule.id);
        }
    }
}
