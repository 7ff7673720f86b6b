//! `Distinct()` materialized into a list or an array

use glint_core::cst::ast::{AstNode, Invocation};
use glint_core::cst::surgeon::{Edit, apply_edits};
use glint_core::cst::{CsSyntaxKind, GreenNode, make};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::call_matcher::{linq, match_any};
use crate::policies::remove_trailing_call;
use crate::rule::{FixOutcome, Rule, RuleMatch, find_node};

pub const UNIQUE_NON_SET_COLLECTION: &str = "GL1005";

pub const RULE: Rule = Rule {
    id: UNIQUE_NON_SET_COLLECTION,
    name: "unique-non-set-collection",
    title: "Use a set instead",
    message: "Prefer sets when uniqueness is required",
    category: RuleCategory::Usage,
    default_severity: Severity::Info,
    enabled_by_default: false,
    node_kinds: &[CsSyntaxKind::Invocation],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"using System;
using System.Collections.Generic;
using System.Linq;

namespace Tests;
class Test
{
    void Do()
    {
        List<int> numbers = [];
        var distinctNumbers = [|numbers.Distinct().ToArray()|];
    }
}
"#;

const SAMPLE_FIXED: &str = r#"using System;
using System.Collections.Generic;
using System.Linq;

namespace Tests;
class Test
{
    void Do()
    {
        List<int> numbers = [];
        var distinctNumbers = numbers.ToHashSet();
    }
}
"#;

fn check(node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    // only the last call of a chain
    if node
        .parent()
        .is_some_and(|p| matches!(p.kind(), CsSyntaxKind::MemberAccess | CsSyntaxKind::Invocation))
    {
        return None;
    }
    let call = Invocation::cast(node.clone())?;
    match_any(&call, facts, &[linq::TO_LIST, linq::TO_ARRAY])?;
    let distinct = Invocation::cast(call.receiver()?.syntax().clone())?;
    linq::DISTINCT
        .matches(&distinct, facts)
        .then(|| RuleMatch::node(node))
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let root = tree.root();
    let node = find_node(&root, diagnostic.span, CsSyntaxKind::Invocation)?;
    let call = Invocation::cast(node)?;
    let name = call.name_ref()?;
    if !matches!(name.text().as_str(), "ToList" | "ToArray") || !call.args().is_empty() {
        return None;
    }
    let distinct = Invocation::cast(call.receiver()?.syntax().clone())?;
    if distinct.method_name().as_deref() != Some("Distinct") || !distinct.args().is_empty() {
        return None;
    }
    let edits = vec![
        Edit::replace(distinct.syntax(), remove_trailing_call(&distinct)?),
        Edit::replace_token(&name.token()?, make::ident("ToHashSet")),
    ];
    apply_edits(&root, edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::testing::{fixed, flagged, source};

    const USINGS: &str = "using System;\nusing System.Collections.Generic;\nusing System.Linq;\n";
    const SIGNATURE: &str = "void M(int[] numbers, IEqualityComparer<int> comparer)";

    #[test]
    fn test_flags_terminal_call_only() {
        let text = source(
            USINGS,
            SIGNATURE,
            "var a = numbers.Distinct().ToList();\n        var b = numbers.Distinct().ToList().Any();\n        var c = numbers.Distinct().First();",
        );
        assert_eq!(flagged(RULE, &text), ["numbers.Distinct().ToList()"]);
    }

    #[test]
    fn test_comparer_overload_is_skipped() {
        let text = source(USINGS, SIGNATURE, "var a = numbers.Distinct(comparer).ToArray();");
        assert!(flagged(RULE, &text).is_empty());
    }

    #[test]
    fn test_fix_keeps_comments_of_both_calls() {
        let text = source(
            USINGS,
            SIGNATURE,
            "var a = numbers\n            .Distinct() // unique\n            .ToList();",
        );
        assert_eq!(
            fixed(RULE, &text),
            source(USINGS, SIGNATURE, "var a = numbers // unique\n            .ToHashSet();")
        );
    }

    #[test]
    fn test_disabled_by_default() {
        assert!(!RULE.enabled_by_default);
    }
}
