//! `out var x` where `x` is never read

use glint_core::cst::ast::{Arg, AstNode, Block, DeclExpr};
use glint_core::cst::{CsSyntaxKind, GreenNode, make, surgeon};
use glint_core::{Diagnostic, RuleCategory, SemanticFacts, Severity, SyntaxNode, SyntaxTree};

use crate::builtin::locals::use_count;
use crate::policies::in_slot;
use crate::rule::{FixOutcome, Rule, RuleMatch, find_token};

pub const DISCARD_UNUSED_OUT_VARIABLE: &str = "GL1006";

pub const RULE: Rule = Rule {
    id: DISCARD_UNUSED_OUT_VARIABLE,
    name: "discard-unused-out-variable",
    title: "Use discard for unused out variable",
    message: "Unused out variable '{0}' can be replaced with discard '_'",
    category: RuleCategory::Usage,
    default_severity: Severity::Warning,
    enabled_by_default: true,
    node_kinds: &[CsSyntaxKind::DeclExpr],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"using System;

namespace Tests;
class Test
{
    void Method(string day, string count)
    {
        if (Enum.TryParse<DayOfWeek>(day, out DayOfWeek [|dayOfWeek|]))
        {
            Console.WriteLine(day);
        }
        if (int.TryParse(count, out var parsed))
        {
            Console.WriteLine(parsed);
        }
    }
}
"#;

const SAMPLE_FIXED: &str = r#"using System;

namespace Tests;
class Test
{
    void Method(string day, string count)
    {
        if (Enum.TryParse<DayOfWeek>(day, out _))
        {
            Console.WriteLine(day);
        }
        if (int.TryParse(count, out var parsed))
        {
            Console.WriteLine(parsed);
        }
    }
}
"#;

fn check(node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let declaration = DeclExpr::cast(node.clone())?;
    let arg = Arg::cast(node.parent()?)?;
    if arg.ref_kind() != Some(CsSyntaxKind::OutKw) {
        return None;
    }
    let name = declaration.name_token()?;
    if name.text() == "_" {
        return None;
    }
    let symbol = facts.local_symbol(&name)?;
    let block = node.ancestors().find_map(Block::cast)?;
    if use_count(facts, &symbol, block.syntax()) > 0 {
        return None;
    }
    Some(RuleMatch::token(&name).with_arg(name.text()))
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let name = find_token(&tree.root(), diagnostic.span, CsSyntaxKind::Ident)?;
    let declaration = DeclExpr::cast(name.parent()?)?;
    if declaration.name_token().as_ref() != Some(&name) {
        return None;
    }
    let discard = in_slot(&make::name_ref("_"), declaration.syntax());
    Some(surgeon::replace_node(declaration.syntax(), discard))
}
