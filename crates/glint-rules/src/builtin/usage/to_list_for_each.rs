//! `xs.ToList().ForEach(f)` as a statement
//!
//! The list exists only to be walked once. A `foreach` over `xs` does the
//! same without the copy.

use glint_core::cst::ast::{Arg, AstNode, Expr, ExprStmt, Invocation, Lambda};
use glint_core::cst::trivia::{indentation, node_leading_trivia, trimmed_text};
use glint_core::cst::{CsSyntaxKind, GreenNode, make, surgeon};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::builtin::locals::declared_in_member;
use crate::call_matcher::{LIST_FOR_EACH, is_queryable, linq};
use crate::policies::in_slot;
use crate::rule::{FixOutcome, Rule, RuleMatch, find_node};

pub const TO_LIST_FOR_EACH: &str = "GL1003";

/// Loop variable when the argument is a method group
const DEFAULT_LOOP_VARIABLE: &str = "item";

pub const RULE: Rule = Rule {
    id: TO_LIST_FOR_EACH,
    name: "to-list-for-each",
    title: ".ToList().ForEach() causes unnecessary memory allocation",
    message: "Replace .ToList().ForEach() with a foreach loop to reduce memory usage",
    category: RuleCategory::Usage,
    default_severity: Severity::Warning,
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
    void Do(int[] numbers)
    {
        [|numbers.ToList().ForEach(n => Console.WriteLine(n))|];
    }
}
"#;

const SAMPLE_FIXED: &str = r#"using System;
using System.Linq;

namespace Tests;
class Test
{
    void Do(int[] numbers)
    {
        foreach (var n in numbers)
        {
            Console.WriteLine(n);
        }
    }
}
"#;

fn check(node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let call = Invocation::cast(node.clone())?;
    let statement = ExprStmt::cast(node.parent()?)?;
    if statement.expr()?.syntax() != node || !LIST_FOR_EACH.matches(&call, facts) {
        return None;
    }
    let to_list = Invocation::cast(call.receiver()?.syntax().clone())?;
    if !linq::TO_LIST.matches(&to_list, facts) || is_queryable(&to_list.receiver()?, facts) {
        return None;
    }
    if loop_variable_clashes(&call) {
        return None;
    }
    Some(RuleMatch::node(node))
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let node = find_node(&tree.root(), diagnostic.span, CsSyntaxKind::Invocation)?;
    let call = Invocation::cast(node.clone())?;
    let statement = ExprStmt::cast(node.parent()?)?;
    if call.method_name().as_deref() != Some("ForEach") {
        return None;
    }
    let [arg]: [Arg; 1] = call.args().try_into().ok()?;
    if arg.ref_kind().is_some() {
        return None;
    }
    let to_list = Invocation::cast(call.receiver()?.syntax().clone())?;
    if to_list.method_name().as_deref() != Some("ToList")
        || !to_list.args().is_empty()
        || loop_variable_clashes(&call)
    {
        return None;
    }
    let source = to_list.receiver()?;

    let indent = indentation(&node_leading_trivia(statement.syntax()));
    let (variable, body) = loop_body(&arg.expr()?, &indent)?;
    let text = format!(
        "foreach (var {variable} in {})\n{indent}{body}",
        trimmed_text(source.syntax())
    );
    let replacement = in_slot(&make::stmt(&text), statement.syntax());
    Some(surgeon::replace_node(statement.syntax(), replacement))
}

/// Whether a method-group argument would need a loop variable that the
/// member already declares
fn loop_variable_clashes(call: &Invocation) -> bool {
    call.args()
        .first()
        .and_then(Arg::expr)
        .is_some_and(|arg| {
            arg.kind() != CsSyntaxKind::Lambda
                && declared_in_member(call.syntax(), DEFAULT_LOOP_VARIABLE)
        })
}

/// Loop variable and block for the `ForEach` argument
///
/// Lambdas keep their parameter name; a block body is kept as written, an
/// expression body becomes the loop's only statement. A method group is
/// called with [`DEFAULT_LOOP_VARIABLE`].
fn loop_body(argument: &Expr, indent: &str) -> Option<(String, String)> {
    let single = |statement: String| format!("{{\n{indent}    {statement};\n{indent}}}");
    match argument.kind() {
        CsSyntaxKind::Lambda => {
            let lambda = Lambda::cast(argument.syntax().clone())?;
            let [variable]: [String; 1] = lambda.param_names().try_into().ok()?;
            if let Some(block) = lambda.block_body() {
                return Some((variable, trimmed_text(block.syntax())));
            }
            let body = lambda.expr_body()?;
            Some((variable, single(trimmed_text(body.syntax()))))
        }
        CsSyntaxKind::NameRef | CsSyntaxKind::MemberAccess => {
            let call = format!("{}({DEFAULT_LOOP_VARIABLE})", trimmed_text(argument.syntax()));
            Some((DEFAULT_LOOP_VARIABLE.to_string(), single(call)))
        }
        _ => None,
    }
}
