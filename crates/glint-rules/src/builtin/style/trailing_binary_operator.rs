//! Binary operators at the end of a line

use glint_core::cst::ast::{AstNode, BinaryExpr};
use glint_core::cst::{CsSyntaxKind, GreenNode, surgeon};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::policies::{is_trailing_operator, move_operator_to_line_start};
use crate::rule::{FixOutcome, Rule, RuleMatch};

pub const TRAILING_BINARY_OPERATOR: &str = "GL2003";

pub const RULE: Rule = Rule {
    id: TRAILING_BINARY_OPERATOR,
    name: "trailing-binary-operator",
    title: "Binary operators should be leading, not trailing",
    message: "Move binary operator to the beginning of the line",
    category: RuleCategory::Style,
    default_severity: Severity::Info,
    enabled_by_default: false,
    node_kinds: &[CsSyntaxKind::BinaryExpr],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"namespace Tests;
class Test
{
    bool Do(bool first, bool second)
    {
        return first [|&&|]
            second;
    }
}
"#;

const SAMPLE_FIXED: &str = r#"namespace Tests;
class Test
{
    bool Do(bool first, bool second)
    {
        return first
            && second;
    }
}
"#;

fn check(node: &SyntaxNode, _facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let binary = BinaryExpr::cast(node.clone())?;
    if !is_trailing_operator(&binary) {
        return None;
    }
    Some(RuleMatch::token(&binary.op_token()?))
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let root = tree.root();
    if !root.text_range().contains_range(diagnostic.span) {
        return None;
    }
    let op = root
        .covering_element(diagnostic.span)
        .into_token()
        .filter(|t| t.text_range() == diagnostic.span)?;
    let binary = BinaryExpr::cast(op.parent()?)?;
    if binary.op_token().as_ref() != Some(&op) {
        return None;
    }
    let moved = move_operator_to_line_start(&binary)?;
    Some(surgeon::replace_node(binary.syntax(), moved))
}
