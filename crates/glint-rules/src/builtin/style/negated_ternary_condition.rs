//! `!c ? a : b` instead of `c ? b : a`

use glint_core::cst::ast::{AstNode, ConditionalExpr, PrefixExpr};
use glint_core::cst::{CsSyntaxKind, GreenNode, surgeon};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::policies::swap_conditional_branches;
use crate::rule::{FixOutcome, Rule, RuleMatch, find_node};

pub const NEGATED_TERNARY_CONDITION: &str = "GL2004";

pub const RULE: Rule = Rule {
    id: NEGATED_TERNARY_CONDITION,
    name: "negated-ternary-condition",
    title: "Avoid negation in the ternary condition",
    message: "This ternary condition has a negation",
    category: RuleCategory::Style,
    default_severity: Severity::Info,
    enabled_by_default: true,
    node_kinds: &[CsSyntaxKind::ConditionalExpr],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"namespace Tests;
class Test
{
    string Do(bool condition) => [|!condition ? "when true" : "when false"|];
}
"#;

const SAMPLE_FIXED: &str = r#"namespace Tests;
class Test
{
    string Do(bool condition) => condition ? "when false" : "when true";
}
"#;

/// The operand of a `!` condition
fn negated_operand(conditional: &ConditionalExpr) -> Option<SyntaxNode> {
    let prefix = PrefixExpr::cast(conditional.condition()?.syntax().clone())?;
    if prefix.op_kind() != Some(CsSyntaxKind::Bang) {
        return None;
    }
    Some(prefix.operand()?.syntax().clone())
}

fn check(node: &SyntaxNode, _facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let conditional = ConditionalExpr::cast(node.clone())?;
    negated_operand(&conditional)?;
    Some(RuleMatch::node(node))
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let node = find_node(&tree.root(), diagnostic.span, CsSyntaxKind::ConditionalExpr)?;
    let conditional = ConditionalExpr::cast(node)?;
    let operand = negated_operand(&conditional)?;
    let swapped = swap_conditional_branches(&conditional, &operand)?;
    Some(surgeon::replace_node(conditional.syntax(), swapped))
}
