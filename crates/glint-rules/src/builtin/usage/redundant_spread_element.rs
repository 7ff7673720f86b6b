//! Spread of a collection that is written out in place
//!
//! `[1, ..new[] { 2, 3 }, 4]` allocates an array only to copy it; the
//! elements can go straight into the outer literal as `[1, 2, 3, 4]`.

use glint_core::cst::ast::{
    ArrayCreation, AstNode, CollectionExpr, ImplicitArrayCreation, ObjectCreation, SpreadElement,
};
use glint_core::cst::trivia::{
    Trivia, node_leading_trivia, node_trailing_trivia, significant_range, with_leading_trivia,
    with_trailing_trivia, without_trivia,
};
use glint_core::cst::{CsSyntaxKind, GreenElement, GreenNode, NodeOrToken, make, surgeon};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::rule::{FixOutcome, Rule, RuleMatch, find_node};

pub const REDUNDANT_SPREAD_ELEMENT: &str = "GL1007";

pub const RULE: Rule = Rule {
    id: REDUNDANT_SPREAD_ELEMENT,
    name: "redundant-spread-element",
    title: "Inline spread element",
    message: "Inline the elements of this spread",
    category: RuleCategory::Usage,
    default_severity: Severity::Info,
    enabled_by_default: true,
    node_kinds: &[CsSyntaxKind::SpreadElement],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"namespace Tests;
class Test
{
    int[] Array => [1, [|..new[] { 2, 3 }|], 4];
}
"#;

const SAMPLE_FIXED: &str = r#"namespace Tests;
class Test
{
    int[] Array => [1, 2, 3, 4];
}
"#;

fn check(node: &SyntaxNode, _facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let spread = SpreadElement::cast(node.clone())?;
    inner_elements(&spread)?;
    Some(RuleMatch::node(node))
}

/// Elements the spread stands for, when they are written out and nonempty
///
/// Accepts `new[] { .. }`, `new T[] { .. }`, a collection initializer
/// without constructor arguments and a nested `[..]` literal. Empty
/// collections are left alone, as is anything carrying a comment that
/// inlining would drop.
fn inner_elements(spread: &SpreadElement) -> Option<Vec<SyntaxNode>> {
    if spread.syntax().parent()?.kind() != CsSyntaxKind::CollectionExpr {
        return None;
    }
    let expr = spread.expr()?;
    let syntax = expr.syntax().clone();
    let elements: Vec<SyntaxNode> = match expr.kind() {
        CsSyntaxKind::ImplicitArrayCreation => ImplicitArrayCreation::cast(syntax)?
            .initializer()?
            .exprs()
            .map(|e| e.syntax().clone())
            .collect(),
        CsSyntaxKind::ArrayCreation => ArrayCreation::cast(syntax)?
            .initializer()?
            .exprs()
            .map(|e| e.syntax().clone())
            .collect(),
        CsSyntaxKind::ObjectCreation => {
            let creation = ObjectCreation::cast(syntax)?;
            if creation.arg_list().is_some_and(|list| list.args().next().is_some()) {
                return None;
            }
            let elements: Vec<SyntaxNode> = creation
                .initializer()?
                .exprs()
                .map(|e| e.syntax().clone())
                .collect();
            if elements.iter().any(|e| e.kind() == CsSyntaxKind::AssignExpr) {
                return None;
            }
            elements
        }
        CsSyntaxKind::CollectionExpr => CollectionExpr::cast(syntax)?.elements().collect(),
        _ => return None,
    };
    if elements.is_empty() || has_inner_comment(expr.syntax()) {
        return None;
    }
    Some(elements)
}

/// Comments inside `node`, its own leading and trailing trivia excluded
fn has_inner_comment(node: &SyntaxNode) -> bool {
    let range = significant_range(node);
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind().is_comment() && range.contains_range(t.text_range()))
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let node = find_node(&tree.root(), diagnostic.span, CsSyntaxKind::SpreadElement)?;
    let spread = SpreadElement::cast(node.clone())?;
    let elements = inner_elements(&spread)?;
    let collection = node.parent()?;

    let last = elements.len() - 1;
    let mut spliced: Vec<GreenElement> = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        let mut green = without_trivia(&element.green());
        if i == 0 {
            green = with_leading_trivia(&green, &node_leading_trivia(&node));
        } else {
            spliced.push(NodeOrToken::Token(make::punct(CsSyntaxKind::Comma)));
            spliced.extend(make::trivia(&[Trivia::whitespace(" ")]));
        }
        if i == last {
            green = with_trailing_trivia(&green, &node_trailing_trivia(&node));
        }
        spliced.push(NodeOrToken::Node(green));
    }

    let index = node.index();
    let replacement = collection
        .green()
        .splice_children(index..index + 1, spliced);
    Some(surgeon::replace_node(&collection, replacement))
}
