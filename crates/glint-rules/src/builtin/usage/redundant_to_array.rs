//! `ToArray()` on something that already is an array

use glint_core::cst::ast::{AstNode, Expr, Invocation};
use glint_core::cst::{CsSyntaxKind, GreenNode, surgeon};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::call_matcher::linq;
use crate::policies::remove_trailing_call;
use crate::rule::{FixOutcome, Rule, RuleMatch, find_node};

pub const REDUNDANT_TO_ARRAY: &str = "GL1001";

pub const RULE: Rule = Rule {
    id: REDUNDANT_TO_ARRAY,
    name: "redundant-to-array",
    title: "Redundant .ToArray() call",
    message: ".ToArray() is redundant",
    category: RuleCategory::Usage,
    default_severity: Severity::Warning,
    enabled_by_default: true,
    node_kinds: &[CsSyntaxKind::Invocation],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"using System.Linq;

namespace Tests;
class Test
{
    void Do()
    {
        var words = [|"a b".Split(' ').ToArray()|];
        int[] numbers = [|[1, 2, 3].ToArray()|];
    }
}
"#;

const SAMPLE_FIXED: &str = r#"using System.Linq;

namespace Tests;
class Test
{
    void Do()
    {
        var words = "a b".Split(' ');
        int[] numbers = [1, 2, 3];
    }
}
"#;

fn check(node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let call = Invocation::cast(node.clone())?;
    if !linq::TO_ARRAY.matches(&call, facts) {
        return None;
    }
    let receiver = call.receiver()?.unparenthesized();
    is_array(&receiver, facts).then(|| RuleMatch::node(node))
}

/// Array creations, collection literals and calls declared to return an array
fn is_array(expr: &Expr, facts: &dyn SemanticFacts) -> bool {
    match expr.kind() {
        CsSyntaxKind::ArrayCreation
        | CsSyntaxKind::ImplicitArrayCreation
        | CsSyntaxKind::CollectionExpr => true,
        CsSyntaxKind::Invocation => Invocation::cast(expr.syntax().clone())
            .and_then(|inner| facts.resolve_invocation(&inner))
            .is_some_and(|method| method.return_type.is_array()),
        _ => false,
    }
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let node = find_node(&tree.root(), diagnostic.span, CsSyntaxKind::Invocation)?;
    let call = Invocation::cast(node.clone())?;
    if call.method_name().as_deref() != Some("ToArray") || !call.args().is_empty() {
        return None;
    }
    Some(surgeon::replace_node(&node, remove_trailing_call(&call)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::testing::{fixed, flagged, source};

    const USINGS: &str = "using System;\nusing System.Collections.Generic;\nusing System.Linq;\n";

    #[test]
    fn test_flags_array_sources() {
        let text = source(
            USINGS,
            "void M(string csv)",
            "var a = new[] { 1 }.ToArray();\n        var b = new int[] { 2 }.ToArray();\n        var c = csv.Split(',').ToArray();",
        );
        assert_eq!(
            flagged(RULE, &text),
            ["new[] { 1 }.ToArray()", "new int[] { 2 }.ToArray()", "csv.Split(',').ToArray()"]
        );
    }

    #[test]
    fn test_ignores_other_sequences() {
        let text = source(
            USINGS,
            "void M(int[] numbers, List<int> list)",
            "var a = numbers.ToArray();\n        var b = list.ToArray();\n        var c = numbers.Where(x => x > 0).ToArray();",
        );
        assert!(flagged(RULE, &text).is_empty());
    }

    #[test]
    fn test_fix_keeps_trailing_comment() {
        let text = source(USINGS, "void M()", "var a = new[] { 1 }.ToArray(); // keep");
        assert_eq!(
            fixed(RULE, &text),
            source(USINGS, "void M()", "var a = new[] { 1 }; // keep")
        );
    }

    #[test]
    fn test_parenthesized_receiver() {
        let text = source(USINGS, "void M()", "var a = (new[] { 1 }).ToArray();");
        assert_eq!(flagged(RULE, &text), ["(new[] { 1 }).ToArray()"]);
        assert_eq!(fixed(RULE, &text), source(USINGS, "void M()", "var a = (new[] { 1 });"));
    }
}
