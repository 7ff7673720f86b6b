//! Semantic layer
//!
//! Rules never walk declarations themselves. They ask questions through
//! [`SemanticFacts`], which [`Compilation`] answers for one file against the
//! types declared in it and the reference library.
//!
//! - [`types`] - type references and unification
//! - [`symbols`] - resolved methods, parameters and locals
//! - [`declarations`] - types and members extracted from syntax
//! - [`library`] - declaration-only reference library
//! - [`compilation`] - binding and type inference for one file

mod compilation;
mod declarations;
mod library;
mod symbols;
mod types;

pub use compilation::{Compilation, MAX_DEPTH};
pub use declarations::{
    Declarations, MethodInfo, PropertyInfo, TypeInfo, TypeKey, TypeKind, file_usings,
};
pub use library::{SYSTEM_COLLECTIONS, SYSTEM_LINQ, SYSTEM_RUNTIME, library};
pub use symbols::{
    LocalKind, LocalSymbol, MethodKind, MethodSymbol, Origin, ParameterSymbol, RefKind,
};
pub use types::{GENERIC_COLLECTIONS, Substitution, TypeRef, unify};

use crate::cst::ast::{Expr, Invocation};
use crate::cst::{CsSyntaxKind, SyntaxNode, SyntaxToken};

/// Questions a rule may ask about the code it inspects
///
/// Implementations must be shareable across the threads that run rules in
/// parallel. Every method answers `None` or `false` when the code does not
/// resolve; rules treat that as "do not report".
pub trait SemanticFacts: Send + Sync {
    /// The method an invocation binds to, with type arguments applied
    fn resolve_invocation(&self, call: &Invocation) -> Option<MethodSymbol>;

    /// Type of an expression, taking its context into account
    fn type_of(&self, expr: &Expr) -> Option<TypeRef>;

    /// The local, parameter or field a name refers to or declares
    fn local_symbol(&self, token: &SyntaxToken) -> Option<LocalSymbol>;

    /// Whether `ty` is or derives from the type named `full_name`
    fn implements(&self, ty: &TypeRef, full_name: &str) -> bool;

    fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool;

    /// Element type of an enumerable type
    fn element_type(&self, ty: &TypeRef) -> Option<TypeRef>;

    /// Uses of `symbol` inside `scope`, declaration excluded
    fn references(&self, symbol: &LocalSymbol, scope: &SyntaxNode) -> Vec<SyntaxToken> {
        scope
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == CsSyntaxKind::Ident && t.text() == symbol.name)
            .filter(|t| t.parent().is_some_and(|p| p.kind() == CsSyntaxKind::NameRef))
            .filter(|t| {
                self.local_symbol(t)
                    .is_some_and(|s| s.declared_at == symbol.declared_at)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::SyntaxTree;
    use crate::cst::ast::{AstNode, VarDeclarator};

    #[test]
    fn test_references_skip_shadowed_names() {
        let source = "class C\n{\n    void M()\n    {\n        var x = 1;\n        var y = x + x;\n        Action f = x => x;\n    }\n}\n";
        let tree = SyntaxTree::parse(source);
        let compilation = Compilation::new(&tree);
        let x = tree
            .root()
            .descendants()
            .filter_map(VarDeclarator::cast)
            .find(|d| d.name().as_deref() == Some("x"))
            .unwrap();
        let symbol = compilation.local_symbol(&x.name_token().unwrap()).unwrap();
        let uses = compilation.references(&symbol, &tree.root());
        assert_eq!(uses.len(), 2);
        assert!(uses.iter().all(|t| t.text_range().start() > x.syntax().text_range().end()));
    }
}
