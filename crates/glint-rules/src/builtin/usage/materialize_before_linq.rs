//! `ToList()`/`ToArray()` immediately followed by another sequence call
//!
//! The materialized copy is only enumerated once more, so the call in
//! between allocates for nothing. Queryable sources are left alone:
//! materializing a query decides where the rest of the chain runs.

use glint_core::cst::ast::{AstNode, Invocation, MemberAccess, NameRef};
use glint_core::cst::{CsSyntaxKind, GreenNode, surgeon};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::call_matcher::{is_queryable, linq, match_any, outer_call};
use crate::policies::remove_trailing_call;
use crate::rule::{FixOutcome, Rule, RuleMatch, find_node};

pub const MATERIALIZE_BEFORE_LINQ: &str = "GL1002";

pub const RULE: Rule = Rule {
    id: MATERIALIZE_BEFORE_LINQ,
    name: "materialize-before-linq",
    title: "Unnecessary materialization to array/list in LINQ chain",
    message: "Remove unnecessary materialization to an array or a list",
    category: RuleCategory::Usage,
    default_severity: Severity::Warning,
    enabled_by_default: true,
    node_kinds: &[CsSyntaxKind::Invocation],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"using System.Collections.Generic;
using System.Linq;

namespace Tests;
class Test
{
    void Do()
    {
        int[] numbers = [];
        var greaterThanThree = numbers.[|ToArray|]().Where(x => x > 3);
        var doubled = numbers.[|ToList|]().Select(x => x * 2);
    }
}
"#;

const SAMPLE_FIXED: &str = r#"using System.Collections.Generic;
using System.Linq;

namespace Tests;
class Test
{
    void Do()
    {
        int[] numbers = [];
        var greaterThanThree = numbers.Where(x => x > 3);
        var doubled = numbers.Select(x => x * 2);
    }
}
"#;

fn check(node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let call = Invocation::cast(node.clone())?;
    match_any(&call, facts, &[linq::TO_LIST, linq::TO_ARRAY])?;

    let next = outer_call(node)?;
    if !facts
        .resolve_invocation(&next)
        .is_some_and(|method| linq::is_linq_extension(&method))
    {
        return None;
    }
    if is_queryable(&call.receiver()?, facts) {
        return None;
    }
    Some(RuleMatch::node(call.name_ref()?.syntax()))
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let name = find_node(&tree.root(), diagnostic.span, CsSyntaxKind::NameRef)?;
    let access = MemberAccess::cast(name.parent()?)?;
    let call = Invocation::cast(access.syntax().parent()?)?;
    if call.member_access().as_ref() != Some(&access) {
        return None;
    }
    let name = NameRef::cast(name)?.text();
    if !matches!(name.as_str(), "ToList" | "ToArray") || !call.args().is_empty() {
        return None;
    }
    Some(surgeon::replace_node(call.syntax(), remove_trailing_call(&call)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::testing::{fixed, flagged, source};

    const USINGS: &str = "using System;\nusing System.Collections.Generic;\nusing System.Linq;\n";
    const SIGNATURE: &str = "void M(int[] numbers, List<int> list)";

    #[test]
    fn test_flags_materialize_name() {
        let text = source(
            USINGS,
            SIGNATURE,
            "var a = numbers.ToList().Any();\n        var b = list.ToArray().First();",
        );
        // `list.ToArray()` binds to the list's own method
        assert_eq!(flagged(RULE, &text), ["ToList"]);
    }

    #[test]
    fn test_ignores_terminal_and_instance_follow_up() {
        let text = source(
            USINGS,
            SIGNATURE,
            "var a = numbers.ToList();\n        numbers.ToList().ForEach(x => Console.WriteLine(x));",
        );
        assert!(flagged(RULE, &text).is_empty());
    }

    #[test]
    fn test_ignores_queryable() {
        let text = source(
            USINGS,
            SIGNATURE,
            "var a = numbers.AsQueryable().ToList().Where(x => x > 1);",
        );
        assert!(flagged(RULE, &text).is_empty());
    }

    #[test]
    fn test_fix_multiline_chain() {
        let text = source(
            USINGS,
            SIGNATURE,
            "var a = numbers\n            .ToList()\n            .Where(x => x > 1)\n            .ToArray();",
        );
        assert_eq!(
            fixed(RULE, &text),
            source(
                USINGS,
                SIGNATURE,
                "var a = numbers\n            .Where(x => x > 1)\n            .ToArray();"
            )
        );
    }
}
