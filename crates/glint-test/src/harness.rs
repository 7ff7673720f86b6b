//! Rule verification against annotated samples

use glint_core::cst::TextRange;
use glint_core::{Diagnostic, SyntaxTree};
use glint_rules::engine::DEFAULT_MAX_FIX_ITERATIONS;
use glint_rules::{Engine, Rule};

use crate::annotated::AnnotatedSource;
use crate::error::VerificationError;

/// Check that `rule` flags exactly the marked spans of `annotated`
///
/// A sample without markers must produce no diagnostic at all.
pub fn verify_diagnostics(
    rule: Rule,
    annotated: &str,
) -> Result<Vec<Diagnostic>, VerificationError> {
    let source = AnnotatedSource::parse(annotated)?;
    let tree = parse(rule, &source.text)?;
    let diagnostics = Engine::for_rule(rule).check(&tree);

    let actual: Vec<TextRange> = diagnostics.iter().map(|d| d.span).collect();
    let describe = |span: &TextRange| format!("`{}` at {:?}", &source.text[*span], span);
    let missing: Vec<String> = source
        .spans
        .iter()
        .filter(|span| !actual.contains(*span))
        .map(describe)
        .collect();
    let unexpected: Vec<String> = actual
        .iter()
        .filter(|span| !source.spans.contains(*span))
        .map(describe)
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() || actual.len() != source.spans.len() {
        return Err(VerificationError::SpanMismatch {
            rule_id: rule.id.to_string(),
            missing,
            unexpected,
        });
    }
    tracing::debug!(rule = rule.id, spans = actual.len(), "Spans verified");
    Ok(diagnostics)
}

/// Check that `rule` flags nothing in `source`, which has no markers
pub fn verify_no_diagnostics(rule: Rule, source: &str) -> Result<(), VerificationError> {
    if AnnotatedSource::parse(source)?.has_markers() {
        return Err(VerificationError::UnexpectedMarkers {
            rule_id: rule.id.to_string(),
        });
    }
    verify_diagnostics(rule, source).map(|_| ())
}

/// Check the spans of `annotated`, then fix it and compare with `expected`
///
/// The fixed text must parse, equal `expected` exactly, and produce no
/// further diagnostic for the rule. Returns the fixed text.
pub fn verify_fix(rule: Rule, annotated: &str, expected: &str) -> Result<String, VerificationError> {
    if !rule.is_fixable() {
        return Err(VerificationError::NotFixable {
            rule_id: rule.id.to_string(),
        });
    }
    verify_diagnostics(rule, annotated)?;

    let source = AnnotatedSource::parse(annotated)?;
    let tree = SyntaxTree::parse(&source.text);
    let report = Engine::for_rule(rule).fix_all(&tree, DEFAULT_MAX_FIX_ITERATIONS);
    if !report.changed() && source.has_markers() {
        return Err(VerificationError::NoFixApplied {
            rule_id: rule.id.to_string(),
        });
    }
    if report.tree.has_errors() {
        return Err(VerificationError::InvalidFix {
            rule_id: rule.id.to_string(),
            errors: render_errors(&report.tree),
        });
    }

    let actual = report.tree.text();
    if actual != expected {
        return Err(VerificationError::fix_mismatch(rule.id, expected, &actual));
    }
    if !report.remaining.is_empty() {
        return Err(VerificationError::NotIdempotent {
            rule_id: rule.id.to_string(),
            remaining: report
                .remaining
                .iter()
                .map(|d| format!("`{}` at {:?}", &actual[d.span], d.span))
                .collect(),
        });
    }
    tracing::debug!(rule = rule.id, fixes = report.applied.len(), "Fix verified");
    Ok(actual)
}

/// Verify the rule's own `sample` and `sample_fixed`
pub fn verify_rule_sample(rule: Rule) -> Result<(), VerificationError> {
    match rule.sample_fixed {
        Some(fixed) => verify_fix(rule, rule.sample, fixed).map(|_| ()),
        None if rule.is_fixable() => Err(VerificationError::MissingFixedSample {
            rule_id: rule.id.to_string(),
        }),
        None => verify_diagnostics(rule, rule.sample).map(|_| ()),
    }
}

fn parse(rule: Rule, text: &str) -> Result<SyntaxTree, VerificationError> {
    let tree = SyntaxTree::parse(text);
    if tree.has_errors() {
        return Err(VerificationError::InvalidSource {
            rule_id: rule.id.to_string(),
            errors: render_errors(&tree),
        });
    }
    Ok(tree)
}

fn render_errors(tree: &SyntaxTree) -> String {
    tree.errors()
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Panicking form of [`verify_diagnostics`]
#[track_caller]
pub fn assert_diagnostics(rule: Rule, annotated: &str) -> Vec<Diagnostic> {
    verify_diagnostics(rule, annotated).unwrap_or_else(|e| panic!("{e}"))
}

/// Panicking form of [`verify_no_diagnostics`]
#[track_caller]
pub fn assert_no_diagnostics(rule: Rule, source: &str) {
    if let Err(e) = verify_no_diagnostics(rule, source) {
        panic!("{e}");
    }
}

/// Panicking form of [`verify_fix`]
#[track_caller]
pub fn assert_fix(rule: Rule, annotated: &str, expected: &str) -> String {
    verify_fix(rule, annotated, expected).unwrap_or_else(|e| panic!("{e}"))
}

/// Panicking form of [`verify_rule_sample`]
#[track_caller]
pub fn assert_rule_sample(rule: Rule) {
    if let Err(e) = verify_rule_sample(rule) {
        panic!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_rules::builtin::style::negated_ternary_condition;

    const RULE: Rule = negated_ternary_condition::RULE;

    const SAMPLE: &str = "class C\n{\n    int M(bool b) => [|!b ? 1 : 2|];\n}\n";
    const FIXED: &str = "class C\n{\n    int M(bool b) => b ? 2 : 1;\n}\n";

    #[test]
    fn test_exact_spans_pass() {
        let diagnostics = verify_diagnostics(RULE, SAMPLE).unwrap();
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_missing_span_fails() {
        let error = verify_diagnostics(RULE, &SAMPLE.replace("[|", "").replace("|]", ""))
            .unwrap_err();
        let VerificationError::SpanMismatch { unexpected, missing, .. } = &error else {
            panic!("unexpected error {error:?}");
        };
        assert!(missing.is_empty());
        assert_eq!(unexpected.len(), 1);
        assert!(unexpected[0].starts_with("`!b ? 1 : 2`"));
    }

    #[test]
    fn test_wrong_span_fails() {
        let sample = "class C\n{\n    int M(bool b) => [|!b|] ? 1 : 2;\n}\n";
        let error = verify_diagnostics(RULE, sample).unwrap_err();
        assert!(matches!(
            error,
            VerificationError::SpanMismatch { ref missing, ref unexpected, .. }
                if missing.len() == 1 && unexpected.len() == 1
        ));
    }

    #[test]
    fn test_invalid_source_fails() {
        let error = verify_diagnostics(RULE, "class C {").unwrap_err();
        assert!(matches!(error, VerificationError::InvalidSource { .. }));
    }

    #[test]
    fn test_no_diagnostics_rejects_markers() {
        assert_eq!(
            verify_no_diagnostics(RULE, SAMPLE),
            Err(VerificationError::UnexpectedMarkers {
                rule_id: "GL2004".to_string()
            })
        );
        assert!(verify_no_diagnostics(RULE, FIXED).is_ok());
    }

    #[test]
    fn test_fix_matches_expected() {
        assert_eq!(verify_fix(RULE, SAMPLE, FIXED).unwrap(), FIXED);
    }

    #[test]
    fn test_fix_mismatch_reports_diff() {
        let error = verify_fix(RULE, SAMPLE, SAMPLE).unwrap_err();
        let VerificationError::FixMismatch { diff, .. } = &error else {
            panic!("unexpected error {error:?}");
        };
        assert!(diff.contains("+    int M(bool b) => b ? 2 : 1;"));
    }

    #[test]
    #[should_panic(expected = "GL2004 flagged the wrong spans")]
    fn test_assert_panics_with_message() {
        assert_diagnostics(RULE, "class C\n{\n    int M(bool b) => [|b|] ? 1 : 2;\n}\n");
    }
}
