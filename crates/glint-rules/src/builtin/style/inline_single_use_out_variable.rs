//! An out variable whose only use is copying it into another variable
//!
//! The copy is deleted together with its own trivia, and the out argument
//! declares or assigns the copy's target directly.

use glint_core::cst::ast::{
    Arg, AssignExpr, AstNode, Block, DeclExpr, ExprStmt, LocalDecl, NameRef, Stmt,
};
use glint_core::cst::surgeon::{Edit, apply_edits};
use glint_core::cst::trivia::significant_range;
use glint_core::cst::{CsSyntaxKind, GreenNode, TextRange, make};
use glint_core::{
    Diagnostic, Payload, PropertyBag, RuleCategory, SemanticFacts, Severity, SyntaxNode,
    SyntaxTree,
};

use crate::builtin::locals::use_count;
use crate::policies::in_slot;
use crate::rule::{FixOutcome, Rule, RuleMatch, find_node, find_token};

pub const INLINE_SINGLE_USE_OUT_VARIABLE: &str = "GL2002";

pub const RULE: Rule = Rule {
    id: INLINE_SINGLE_USE_OUT_VARIABLE,
    name: "inline-single-use-out-variable",
    title: "Inline single-use out variable",
    message: "Out variable '{0}' is used only once and can be inlined",
    category: RuleCategory::Style,
    default_severity: Severity::Info,
    enabled_by_default: true,
    node_kinds: &[CsSyntaxKind::DeclExpr],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"using System.Collections.Generic;

namespace Tests;
class Test
{
    int Do(Dictionary<string, int> scores)
    {
        scores.TryGetValue("a", out var [|value|]);
        var result = value;
        return result;
    }
}
"#;

const SAMPLE_FIXED: &str = r#"using System.Collections.Generic;

namespace Tests;
class Test
{
    int Do(Dictionary<string, int> scores)
    {
        scores.TryGetValue("a", out var result);
        return result;
    }
}
"#;

/// The statement that copies the out variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub target_name: String,
    /// `var target = value;` rather than `target = value;`
    pub is_declaration: bool,
    pub statement_span: TextRange,
}

impl Payload for CopyTarget {
    fn encode(&self, bag: &mut PropertyBag) {
        bag.insert("targetName", self.target_name.clone());
        bag.insert_bool("isDeclaration", self.is_declaration);
        bag.insert_range("statementSpan", self.statement_span);
    }

    fn decode(bag: &PropertyBag) -> Option<Self> {
        Some(Self {
            target_name: bag.get("targetName")?.to_string(),
            is_declaration: bag.get_bool("isDeclaration")?,
            statement_span: bag.get_range("statementSpan")?,
        })
    }
}

fn check(node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let declaration = DeclExpr::cast(node.clone())?;
    let arg = Arg::cast(node.parent()?)?;
    if arg.ref_kind() != Some(CsSyntaxKind::OutKw) {
        return None;
    }
    let list = arg.syntax().parent()?;
    if list.parent()?.kind() != CsSyntaxKind::Invocation {
        return None;
    }

    let name = declaration.name_token()?;
    if name.text() == "_" {
        return None;
    }
    let (statement, block) = enclosing_statement(node)?;
    let symbol = facts.local_symbol(&name)?;
    if use_count(facts, &symbol, block.syntax()) != 1 {
        return None;
    }
    let target = find_copy(&block, &statement, name.text())?;
    Some(
        RuleMatch::token(&name)
            .with_arg(name.text())
            .with_payload(&target),
    )
}

/// The statement holding `node` and the block it is a direct child of
fn enclosing_statement(node: &SyntaxNode) -> Option<(Stmt, Block)> {
    let statement = node.ancestors().find_map(Stmt::cast)?;
    let block = Block::cast(statement.syntax().parent()?)?;
    Some((statement, block))
}

/// First statement after `statement` that copies `name` into a variable
fn find_copy(block: &Block, statement: &Stmt, name: &str) -> Option<CopyTarget> {
    block
        .statements()
        .skip_while(|s| s != statement)
        .skip(1)
        .find_map(|s| copy_target(&s, name))
}

fn copy_target(statement: &Stmt, name: &str) -> Option<CopyTarget> {
    let syntax = statement.syntax();
    let (target_name, is_declaration) = match syntax.kind() {
        CsSyntaxKind::LocalDecl => {
            let declaration = LocalDecl::cast(syntax.clone())?;
            let mut declarators = declaration.declarators();
            let declarator = declarators.next()?;
            if declarators.next().is_some() || !is_name(declarator.initializer()?.syntax(), name) {
                return None;
            }
            (declarator.name()?, true)
        }
        CsSyntaxKind::ExprStmt => {
            let expr = ExprStmt::cast(syntax.clone())?.expr()?;
            let assign = AssignExpr::cast(expr.syntax().clone())?;
            if assign.op_kind() != Some(CsSyntaxKind::Eq) || !is_name(assign.rhs()?.syntax(), name) {
                return None;
            }
            let target = NameRef::cast(assign.lhs()?.syntax().clone())?;
            (target.text(), false)
        }
        _ => return None,
    };
    Some(CopyTarget {
        target_name,
        is_declaration,
        statement_span: significant_range(syntax),
    })
}

fn is_name(node: &SyntaxNode, name: &str) -> bool {
    NameRef::cast(node.clone()).is_some_and(|n| n.text() == name && n.type_args().next().is_none())
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let target: CopyTarget = diagnostic.payload()?;
    let root = tree.root();
    let name = find_token(&root, diagnostic.span, CsSyntaxKind::Ident)?;
    let declaration = DeclExpr::cast(name.parent()?)?;

    let kind = if target.is_declaration {
        CsSyntaxKind::LocalDecl
    } else {
        CsSyntaxKind::ExprStmt
    };
    let copy = Stmt::cast(find_node(&root, target.statement_span, kind)?)?;
    let (_, block) = enclosing_statement(declaration.syntax())?;
    if copy.syntax().parent().as_ref() != Some(block.syntax())
        || copy_target(&copy, name.text()).as_ref() != Some(&target)
    {
        return None;
    }

    let rename = if target.is_declaration {
        Edit::replace_token(&name, make::ident(&target.target_name))
    } else {
        let assigned = in_slot(&make::name_ref(&target.target_name), declaration.syntax());
        Edit::replace(declaration.syntax(), assigned)
    };
    apply_edits(&root, vec![rename, Edit::remove(copy.syntax())])
}
