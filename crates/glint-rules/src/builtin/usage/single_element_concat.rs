//! `Concat` with a one-element collection

use glint_core::cst::ast::{
    AstNode, CollectionExpr, Expr, ImplicitArrayCreation, Invocation, ObjectCreation,
};
use glint_core::cst::surgeon::{Edit, apply_edits};
use glint_core::cst::{CsSyntaxKind, GreenNode, make};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::call_matcher::linq;
use crate::policies::transplant;
use crate::rule::{FixOutcome, Rule, RuleMatch, find_node};

pub const SINGLE_ELEMENT_CONCAT: &str = "GL1004";

pub const RULE: Rule = Rule {
    id: SINGLE_ELEMENT_CONCAT,
    name: "single-element-concat",
    title: "Simplify .Concat()",
    message: "Replace .Concat([e]) with .Append(e)",
    category: RuleCategory::Usage,
    default_severity: Severity::Info,
    enabled_by_default: true,
    node_kinds: &[CsSyntaxKind::Invocation],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"using System;
using System.Linq;

namespace Tests;
class Test
{
    void Do()
    {
        var result = [|new[] { 1, 2 }.Concat(new[] { 3 })|];
    }
}
"#;

const SAMPLE_FIXED: &str = r#"using System;
using System.Linq;

namespace Tests;
class Test
{
    void Do()
    {
        var result = new[] { 1, 2 }.Append(3);
    }
}
"#;

fn check(node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let call = Invocation::cast(node.clone())?;
    if !linq::CONCAT.matches(&call, facts) {
        return None;
    }
    single_element(&call)?;
    Some(RuleMatch::node(node))
}

/// The only element of the argument, and the argument itself
///
/// Accepts `new[] { e }`, a collection initializer `new T() { e }` and
/// `[e]`. An object initializer or a spread does not count.
fn single_element(call: &Invocation) -> Option<(Expr, Expr)> {
    let args = call.args();
    let [arg] = args.as_slice() else {
        return None;
    };
    if arg.ref_kind().is_some() {
        return None;
    }
    let argument = arg.expr()?;
    let syntax = argument.syntax().clone();
    let element = match argument.kind() {
        CsSyntaxKind::ImplicitArrayCreation => {
            only(ImplicitArrayCreation::cast(syntax)?.initializer()?.exprs())?
        }
        CsSyntaxKind::ObjectCreation => {
            let element = only(ObjectCreation::cast(syntax)?.initializer()?.exprs())?;
            if element.kind() == CsSyntaxKind::AssignExpr {
                return None;
            }
            element
        }
        CsSyntaxKind::CollectionExpr => {
            let element = only(CollectionExpr::cast(syntax)?.elements())?;
            Expr::cast(element)?
        }
        _ => return None,
    };
    Some((element, argument))
}

fn only<T>(mut items: impl Iterator<Item = T>) -> Option<T> {
    let first = items.next()?;
    items.next().is_none().then_some(first)
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let root = tree.root();
    let node = find_node(&root, diagnostic.span, CsSyntaxKind::Invocation)?;
    let call = Invocation::cast(node)?;
    let name = call.name_ref()?;
    if name.text() != "Concat" {
        return None;
    }
    let (element, argument) = single_element(&call)?;
    let edits = vec![
        Edit::replace_token(&name.token()?, make::ident("Append")),
        Edit::replace(
            argument.syntax(),
            transplant(element.syntax(), argument.syntax()),
        ),
    ];
    apply_edits(&root, edits)
}
