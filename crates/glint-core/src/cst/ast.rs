//! Typed AST layer over the CST
//!
//! Thin wrappers that give names to the children of each node kind. Every
//! wrapper implements [`AstNode`] and can be cast from a raw node.
//!
//! # Example
//!
//! ```ignore
//! use glint_core::cst::{SyntaxTree, ast::{AstNode, Invocation}};
//!
//! let tree = SyntaxTree::parse("class A { void M() { xs.ToList(); } }");
//! let call = tree.root().descendants().find_map(Invocation::cast).unwrap();
//! assert_eq!(call.method_name().unwrap(), "ToList");
//! ```

use super::{CsSyntaxKind, SyntaxElement, SyntaxNode, SyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: CsSyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: CsSyntaxKind) -> bool {
                matches!(kind, $(CsSyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

/// First child node castable to `N`
fn child<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

/// All child nodes castable to `N`
fn children<N: AstNode>(parent: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    parent.children().filter_map(N::cast)
}

/// The `n`th child node castable to `N`
fn nth_child<N: AstNode>(parent: &SyntaxNode, n: usize) -> Option<N> {
    parent.children().filter_map(N::cast).nth(n)
}

/// First direct token of a specific kind
fn token_of_kind(parent: &SyntaxNode, kind: CsSyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(SyntaxElement::into_token)
        .find(|t| t.kind() == kind)
}

fn ident_text(parent: &SyntaxNode) -> Option<String> {
    token_of_kind(parent, CsSyntaxKind::Ident).map(|t| t.text().to_string())
}

fn has_modifier(parent: &SyntaxNode, kind: CsSyntaxKind) -> bool {
    token_of_kind(parent, kind).is_some()
}

// ============================================================================
// Categories
// ============================================================================

ast_node!(
    /// Any expression node
    Expr,
    Literal
        | NameRef
        | MemberAccess
        | Invocation
        | DeclExpr
        | ElementAccess
        | ParenExpr
        | BinaryExpr
        | PrefixExpr
        | PostfixExpr
        | ConditionalExpr
        | AssignExpr
        | Lambda
        | ImplicitArrayCreation
        | ArrayCreation
        | ObjectCreation
        | CollectionExpr
);

ast_node!(
    /// Any statement node
    Stmt,
    Block | LocalDecl | ExprStmt | ReturnStmt | IfStmt | ForeachStmt | EmptyStmt
);

ast_node!(
    /// Any type node
    TypeSyntax,
    PredefinedType | NamedType | ArrayType | NullableType
);

impl Expr {
    pub fn kind(&self) -> CsSyntaxKind {
        self.syntax.kind()
    }

    /// Strip any number of enclosing parentheses
    pub fn unparenthesized(&self) -> Expr {
        let mut expr = self.clone();
        while expr.kind() == CsSyntaxKind::ParenExpr {
            match child::<Expr>(&expr.syntax) {
                Some(inner) => expr = inner,
                None => break,
            }
        }
        expr
    }
}

impl TypeSyntax {
    pub fn kind(&self) -> CsSyntaxKind {
        self.syntax.kind()
    }

    /// True for the `var` placeholder
    pub fn is_var(&self) -> bool {
        NamedType::cast(self.syntax.clone())
            .is_some_and(|t| t.segments() == ["var"] && t.type_args().next().is_none())
    }

    /// Element type of an array type
    pub fn element_type(&self) -> Option<TypeSyntax> {
        match self.kind() {
            CsSyntaxKind::ArrayType | CsSyntaxKind::NullableType => child(&self.syntax),
            _ => None,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(CompilationUnit, CompilationUnit);
ast_node!(UsingDirective, UsingDirective);
ast_node!(NamespaceDecl, NamespaceDecl);
ast_node!(TypeDecl, TypeDecl);
ast_node!(MethodDecl, MethodDecl);
ast_node!(ConstructorDecl, ConstructorDecl);
ast_node!(PropertyDecl, PropertyDecl);
ast_node!(FieldDecl, FieldDecl);
ast_node!(Param, Param);
ast_node!(VarDeclarator, VarDeclarator);

impl CompilationUnit {
    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + use<> {
        children(&self.syntax)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = NamespaceDecl> + use<> {
        children(&self.syntax)
    }

    /// Type declarations anywhere in the file, nested types included
    pub fn types(&self) -> impl Iterator<Item = TypeDecl> + use<> {
        self.syntax.descendants().filter_map(TypeDecl::cast)
    }

    pub fn eof_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Eof)
    }
}

impl UsingDirective {
    /// Dotted namespace name, e.g. `System.Linq`
    pub fn name(&self) -> Option<String> {
        child::<QualifiedName>(&self.syntax).map(|n| n.text())
    }
}

ast_node!(QualifiedName, QualifiedName);

impl QualifiedName {
    pub fn text(&self) -> String {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .filter(|t| matches!(t.kind(), CsSyntaxKind::Ident | CsSyntaxKind::Dot))
            .map(|t| t.text().to_string())
            .collect()
    }
}

impl NamespaceDecl {
    pub fn name(&self) -> Option<String> {
        child::<QualifiedName>(&self.syntax).map(|n| n.text())
    }

    pub fn types(&self) -> impl Iterator<Item = TypeDecl> + use<> {
        children(&self.syntax)
    }
}

impl TypeDecl {
    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Ident)
    }

    pub fn is_interface(&self) -> bool {
        has_modifier(&self.syntax, CsSyntaxKind::InterfaceKw)
    }

    pub fn is_static(&self) -> bool {
        has_modifier(&self.syntax, CsSyntaxKind::StaticKw)
    }

    pub fn type_params(&self) -> Vec<String> {
        child::<TypeParamList>(&self.syntax)
            .map(|l| l.names())
            .unwrap_or_default()
    }

    pub fn base_types(&self) -> Vec<TypeSyntax> {
        self.syntax
            .children()
            .find(|n| n.kind() == CsSyntaxKind::BaseList)
            .map(|list| children(&list).collect())
            .unwrap_or_default()
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDecl> + use<> {
        children(&self.syntax)
    }

    pub fn properties(&self) -> impl Iterator<Item = PropertyDecl> + use<> {
        children(&self.syntax)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDecl> + use<> {
        children(&self.syntax)
    }

    /// Dotted name of the enclosing namespace, empty for the global one
    pub fn namespace(&self) -> String {
        self.syntax
            .ancestors()
            .filter_map(NamespaceDecl::cast)
            .filter_map(|ns| ns.name())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join(".")
    }
}

ast_node!(TypeParamList, TypeParamList);

impl TypeParamList {
    pub fn names(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .filter(|t| t.kind() == CsSyntaxKind::Ident)
            .map(|t| t.text().to_string())
            .collect()
    }
}

impl MethodDecl {
    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn is_static(&self) -> bool {
        has_modifier(&self.syntax, CsSyntaxKind::StaticKw)
    }

    pub fn return_type(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn type_params(&self) -> Vec<String> {
        child::<TypeParamList>(&self.syntax)
            .map(|l| l.names())
            .unwrap_or_default()
    }

    pub fn params(&self) -> Vec<Param> {
        self.syntax
            .children()
            .find(|n| n.kind() == CsSyntaxKind::ParamList)
            .map(|list| children(&list).collect())
            .unwrap_or_default()
    }

    pub fn body(&self) -> Option<Block> {
        child(&self.syntax)
    }

    pub fn arrow_body(&self) -> Option<Expr> {
        self.syntax
            .children()
            .find(|n| n.kind() == CsSyntaxKind::ArrowBody)
            .and_then(|body| child(&body))
    }

    /// True if the first parameter carries the `this` modifier
    pub fn is_extension(&self) -> bool {
        self.params().first().is_some_and(Param::is_this)
    }
}

impl ConstructorDecl {
    pub fn params(&self) -> Vec<Param> {
        self.syntax
            .children()
            .find(|n| n.kind() == CsSyntaxKind::ParamList)
            .map(|list| children(&list).collect())
            .unwrap_or_default()
    }
}

impl PropertyDecl {
    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn ty(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn is_static(&self) -> bool {
        has_modifier(&self.syntax, CsSyntaxKind::StaticKw)
    }
}

impl FieldDecl {
    pub fn ty(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn declarators(&self) -> impl Iterator<Item = VarDeclarator> + use<> {
        children(&self.syntax)
    }
}

impl Param {
    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Ident)
    }

    pub fn ty(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn is_this(&self) -> bool {
        has_modifier(&self.syntax, CsSyntaxKind::ThisKw)
    }

    /// `out`, `ref` or `in` modifier
    pub fn ref_kind(&self) -> Option<CsSyntaxKind> {
        [CsSyntaxKind::OutKw, CsSyntaxKind::RefKw, CsSyntaxKind::InKw]
            .into_iter()
            .find(|kind| has_modifier(&self.syntax, *kind))
    }
}

impl VarDeclarator {
    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Ident)
    }

    pub fn initializer(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    /// Declared type from the enclosing local or field declaration
    pub fn declared_type(&self) -> Option<TypeSyntax> {
        self.syntax.parent().and_then(|decl| child(&decl))
    }
}

// ============================================================================
// Statements
// ============================================================================

ast_node!(Block, Block);
ast_node!(LocalDecl, LocalDecl);
ast_node!(ExprStmt, ExprStmt);
ast_node!(ReturnStmt, ReturnStmt);
ast_node!(ForeachStmt, ForeachStmt);
ast_node!(IfStmt, IfStmt);

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.syntax)
    }

    pub fn l_brace(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::LBrace)
    }

    pub fn r_brace(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::RBrace)
    }
}

impl LocalDecl {
    pub fn ty(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn declarators(&self) -> impl Iterator<Item = VarDeclarator> + use<> {
        children(&self.syntax)
    }
}

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl ReturnStmt {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl ForeachStmt {
    pub fn ty(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Ident)
    }

    pub fn iterable(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    pub fn body(&self) -> Option<Stmt> {
        child(&self.syntax)
    }
}

impl IfStmt {
    pub fn condition(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

// ============================================================================
// Expressions
// ============================================================================

ast_node!(NameRef, NameRef);
ast_node!(MemberAccess, MemberAccess);
ast_node!(Invocation, Invocation);
ast_node!(ArgList, ArgList);
ast_node!(Arg, Arg);
ast_node!(DeclExpr, DeclExpr);
ast_node!(BinaryExpr, BinaryExpr);
ast_node!(PrefixExpr, PrefixExpr);
ast_node!(ConditionalExpr, ConditionalExpr);
ast_node!(AssignExpr, AssignExpr);
ast_node!(Lambda, Lambda);
ast_node!(CollectionExpr, CollectionExpr);
ast_node!(SpreadElement, SpreadElement);
ast_node!(ImplicitArrayCreation, ImplicitArrayCreation);
ast_node!(ArrayCreation, ArrayCreation);
ast_node!(ObjectCreation, ObjectCreation);
ast_node!(InitializerList, InitializerList);
ast_node!(Literal, Literal);

impl NameRef {
    /// Identifier, `this` or predefined type keyword
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| !t.kind().is_trivia())
    }

    pub fn text(&self) -> String {
        self.token().map(|t| t.text().to_string()).unwrap_or_default()
    }

    pub fn is_discard(&self) -> bool {
        self.text() == "_"
    }

    pub fn type_args(&self) -> impl Iterator<Item = TypeSyntax> + use<> {
        self.syntax
            .children()
            .find(|n| n.kind() == CsSyntaxKind::TypeArgList)
            .into_iter()
            .flat_map(|list| children::<TypeSyntax>(&list).collect::<Vec<_>>())
    }
}

impl MemberAccess {
    pub fn receiver(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    pub fn name(&self) -> Option<NameRef> {
        nth_child::<Expr>(&self.syntax, 1).and_then(|e| NameRef::cast(e.syntax))
    }

    pub fn dot_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Dot)
    }
}

impl Invocation {
    pub fn callee(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    /// Callee when it is a `receiver.Name` member access
    pub fn member_access(&self) -> Option<MemberAccess> {
        self.callee().and_then(|e| MemberAccess::cast(e.syntax))
    }

    /// Receiver of a member-access call
    pub fn receiver(&self) -> Option<Expr> {
        self.member_access().and_then(|m| m.receiver())
    }

    /// Name node of the invoked method
    pub fn name_ref(&self) -> Option<NameRef> {
        let callee = self.callee()?;
        match callee.kind() {
            CsSyntaxKind::MemberAccess => MemberAccess::cast(callee.syntax)?.name(),
            CsSyntaxKind::NameRef => NameRef::cast(callee.syntax),
            _ => None,
        }
    }

    pub fn method_name(&self) -> Option<String> {
        self.name_ref().map(|n| n.text())
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child(&self.syntax)
    }

    pub fn args(&self) -> Vec<Arg> {
        self.arg_list()
            .map(|list| list.args().collect())
            .unwrap_or_default()
    }
}

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Arg> + use<> {
        children(&self.syntax)
    }

    pub fn l_paren(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::LParen)
    }

    pub fn r_paren(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::RParen)
    }
}

impl Arg {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    /// `out`, `ref` or `in` keyword
    pub fn ref_kind(&self) -> Option<CsSyntaxKind> {
        [CsSyntaxKind::OutKw, CsSyntaxKind::RefKw, CsSyntaxKind::InKw]
            .into_iter()
            .find(|kind| has_modifier(&self.syntax, *kind))
    }

    pub fn decl_expr(&self) -> Option<DeclExpr> {
        child(&self.syntax)
    }
}

impl DeclExpr {
    pub fn ty(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Ident)
    }
}

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        nth_child(&self.syntax, 0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        nth_child(&self.syntax, 1)
    }

    pub fn op_token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| t.kind().binary_precedence().is_some())
    }
}

impl PrefixExpr {
    pub fn op_token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| !t.kind().is_trivia())
    }

    pub fn op_kind(&self) -> Option<CsSyntaxKind> {
        self.op_token().map(|t| t.kind())
    }

    pub fn operand(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl ConditionalExpr {
    pub fn condition(&self) -> Option<Expr> {
        nth_child(&self.syntax, 0)
    }

    pub fn when_true(&self) -> Option<Expr> {
        nth_child(&self.syntax, 1)
    }

    pub fn when_false(&self) -> Option<Expr> {
        nth_child(&self.syntax, 2)
    }

    pub fn question_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Question)
    }

    pub fn colon_token(&self) -> Option<SyntaxToken> {
        token_of_kind(&self.syntax, CsSyntaxKind::Colon)
    }
}

impl AssignExpr {
    pub fn lhs(&self) -> Option<Expr> {
        nth_child(&self.syntax, 0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        nth_child(&self.syntax, 1)
    }

    pub fn op_kind(&self) -> Option<CsSyntaxKind> {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .map(|t| t.kind())
            .find(|k| k.is_assignment_operator())
    }
}

impl Lambda {
    pub fn param_names(&self) -> Vec<String> {
        self.syntax
            .children()
            .find(|n| n.kind() == CsSyntaxKind::LambdaParamList)
            .map(|list| {
                list.children_with_tokens()
                    .filter_map(SyntaxElement::into_token)
                    .filter(|t| t.kind() == CsSyntaxKind::Ident)
                    .map(|t| t.text().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn param_tokens(&self) -> Vec<SyntaxToken> {
        self.syntax
            .children()
            .find(|n| n.kind() == CsSyntaxKind::LambdaParamList)
            .map(|list| {
                list.children_with_tokens()
                    .filter_map(SyntaxElement::into_token)
                    .filter(|t| t.kind() == CsSyntaxKind::Ident)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn block_body(&self) -> Option<Block> {
        child(&self.syntax)
    }

    pub fn expr_body(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl CollectionExpr {
    /// Elements in order; spreads are `SpreadElement` nodes
    pub fn elements(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax.children()
    }
}

impl SpreadElement {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl InitializerList {
    pub fn exprs(&self) -> impl Iterator<Item = Expr> + use<> {
        children(&self.syntax)
    }
}

impl ImplicitArrayCreation {
    pub fn initializer(&self) -> Option<InitializerList> {
        child(&self.syntax)
    }
}

impl ArrayCreation {
    pub fn ty(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn initializer(&self) -> Option<InitializerList> {
        child(&self.syntax)
    }
}

impl ObjectCreation {
    pub fn ty(&self) -> Option<TypeSyntax> {
        child(&self.syntax)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child(&self.syntax)
    }

    pub fn initializer(&self) -> Option<InitializerList> {
        child(&self.syntax)
    }
}

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| !t.kind().is_trivia())
    }
}

// ============================================================================
// Types
// ============================================================================

ast_node!(NamedType, NamedType);
ast_node!(PredefinedType, PredefinedType);

impl NamedType {
    /// Identifier segments, e.g. `["System", "Collections", "Generic", "List"]`
    pub fn segments(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .filter(|t| t.kind() == CsSyntaxKind::Ident)
            .map(|t| t.text().to_string())
            .collect()
    }

    /// Type arguments of the last segment
    pub fn type_args(&self) -> impl Iterator<Item = TypeSyntax> + use<> {
        self.syntax
            .children()
            .filter(|n| n.kind() == CsSyntaxKind::TypeArgList)
            .last()
            .into_iter()
            .flat_map(|list| children::<TypeSyntax>(&list).collect::<Vec<_>>())
    }
}

impl PredefinedType {
    pub fn keyword(&self) -> Option<CsSyntaxKind> {
        self.syntax
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .map(|t| t.kind())
            .find(|k| k.is_predefined_type())
    }
}
