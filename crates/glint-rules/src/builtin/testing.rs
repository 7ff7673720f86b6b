//! Helpers for the rule unit tests

use glint_core::SyntaxTree;

use crate::engine::{DEFAULT_MAX_FIX_ITERATIONS, Engine};
use crate::rule::Rule;

/// A file with one class `C` whose only method has `signature` and `body`
pub(crate) fn source(usings: &str, signature: &str, body: &str) -> String {
    format!("{usings}\nclass C\n{{\n    {signature}\n    {{\n        {body}\n    }}\n}}\n")
}

/// Text of every span the rule flags
pub(crate) fn flagged(rule: Rule, text: &str) -> Vec<String> {
    let tree = SyntaxTree::parse(text);
    assert!(!tree.has_errors(), "{:?}", tree.errors());
    Engine::for_rule(rule)
        .check(&tree)
        .iter()
        .map(|d| text[d.span].to_string())
        .collect()
}

/// Text after applying every fix of the rule
pub(crate) fn fixed(rule: Rule, text: &str) -> String {
    let report = Engine::for_rule(rule).fix_all(&SyntaxTree::parse(text), DEFAULT_MAX_FIX_ITERATIONS);
    assert!(!report.tree.has_errors(), "{:?}", report.tree.errors());
    report.tree.text()
}
