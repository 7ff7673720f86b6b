//! Counting uses of a local variable

use glint_core::cst::ast::{AstNode, DeclExpr, ForeachStmt, Param, VarDeclarator};
use glint_core::semantic::LocalSymbol;
use glint_core::{CsSyntaxKind, SemanticFacts, SyntaxNode};

/// Uses of `symbol` inside `scope`, declaration excluded
///
/// Interpolated strings are single tokens whose holes are never bound, so
/// every one that mentions the name counts as a use.
pub(crate) fn use_count(facts: &dyn SemanticFacts, symbol: &LocalSymbol, scope: &SyntaxNode) -> usize {
    let bound = facts.references(symbol, scope).len();
    let interpolated = scope
        .descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind() == CsSyntaxKind::InterpolatedString)
        .filter(|t| mentions(t.text(), &symbol.name))
        .count();
    bound + interpolated
}

/// Whether a parameter or local of the member around `node` is called `name`
///
/// Covers every scope of the member, so a new local named `name` anywhere
/// in it could clash.
pub(crate) fn declared_in_member(node: &SyntaxNode, name: &str) -> bool {
    let member = node
        .ancestors()
        .find(|n| {
            matches!(
                n.kind(),
                CsSyntaxKind::MethodDecl | CsSyntaxKind::ConstructorDecl | CsSyntaxKind::PropertyDecl
            )
        })
        .or_else(|| node.ancestors().last())
        .unwrap_or_else(|| node.clone());

    member.descendants().any(|n| {
        let declared = match n.kind() {
            CsSyntaxKind::Param => Param::cast(n).and_then(|p| p.name()),
            CsSyntaxKind::VarDeclarator => VarDeclarator::cast(n).and_then(|d| d.name()),
            CsSyntaxKind::DeclExpr => DeclExpr::cast(n).and_then(|d| d.name()),
            CsSyntaxKind::ForeachStmt => ForeachStmt::cast(n).and_then(|f| f.name()),
            CsSyntaxKind::LambdaParamList => {
                return n
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .any(|t| t.kind() == CsSyntaxKind::Ident && t.text() == name);
            }
            _ => None,
        };
        declared.as_deref() == Some(name)
    })
}

/// Whether `name` occurs in `text` as a whole identifier
fn mentions(text: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(name).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}
