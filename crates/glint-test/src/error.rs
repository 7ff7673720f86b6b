//! Harness failures

use similar::TextDiff;
use thiserror::Error;

/// Why a rule did not verify against a sample
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Unbalanced span marker at offset {offset}")]
    UnbalancedMarker { offset: usize },

    #[error("Sample for {rule_id} does not parse:\n{errors}")]
    InvalidSource { rule_id: String, errors: String },

    #[error("Sample for {rule_id} must not contain span markers")]
    UnexpectedMarkers { rule_id: String },

    #[error(
        "{rule_id} flagged the wrong spans\n  missing: {}\n  unexpected: {}",
        list(.missing),
        list(.unexpected)
    )]
    SpanMismatch {
        rule_id: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("{rule_id} has no fixer")]
    NotFixable { rule_id: String },

    #[error("{rule_id} declares a fixer but no fixed sample")]
    MissingFixedSample { rule_id: String },

    #[error("No fix of {rule_id} applied")]
    NoFixApplied { rule_id: String },

    #[error("Fix of {rule_id} produced invalid syntax:\n{errors}")]
    InvalidFix { rule_id: String, errors: String },

    #[error("Fix of {rule_id} does not match the expected text:\n{diff}")]
    FixMismatch { rule_id: String, diff: String },

    #[error("{rule_id} still reports after fixing: {}", list(.remaining))]
    NotIdempotent {
        rule_id: String,
        remaining: Vec<String>,
    },
}

impl VerificationError {
    pub fn fix_mismatch(rule_id: &str, expected: &str, actual: &str) -> Self {
        Self::FixMismatch {
            rule_id: rule_id.to_string(),
            diff: text_diff(expected, actual),
        }
    }
}

/// Line diff from `expected` to `actual`
pub fn text_diff(expected: &str, actual: &str) -> String {
    TextDiff::from_lines(expected, actual)
        .unified_diff()
        .context_radius(3)
        .header("expected", "actual")
        .to_string()
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
