//! Semantic model of one source file
//!
//! A [`Compilation`] owns the declarations of a file plus a view of the
//! reference library, and answers questions about expressions in that file:
//! what a call binds to, what type an expression has, which declaration a
//! name refers to.
//!
//! # Call binding
//!
//! Candidates are searched in tiers, and the first tier with a candidate
//! decides:
//!
//! 1. instance methods of the receiver type, most derived type first
//! 2. extension methods declared in the file whose namespace is visible
//! 3. reference library extension methods whose namespace is imported
//!
//! Within a tier, arity must match. When several candidates remain they are
//! filtered by argument types and then by specificity; if that still leaves
//! more than one, the call is ambiguous and does not bind.
//!
//! Lambda bodies are never used for inference, so a type parameter that
//! only a lambda could bind stays unbound in the resolved symbol.

use dashmap::DashMap;
use rowan::{TextRange, TextSize};
use tracing::{debug, trace};

use super::declarations::{MethodInfo, Scope, TypeInfo, file_usings};
use super::types::{GENERIC_COLLECTIONS, Substitution, unify};
use super::{
    Declarations, LocalKind, LocalSymbol, MethodKind, MethodSymbol, Origin, ParameterSymbol,
    RefKind, SemanticFacts, TypeRef, library,
};
use crate::cst::ast::{
    Arg, ArrayCreation, AstNode, Block, ConditionalExpr, ConstructorDecl, Expr, ForeachStmt,
    Invocation, Lambda, LocalDecl, MemberAccess, MethodDecl, NameRef, ObjectCreation, PrefixExpr,
    PropertyDecl, TypeDecl, TypeSyntax, VarDeclarator,
};
use crate::cst::{CsSyntaxKind, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree};

/// Bound on nested resolution requests
pub const MAX_DEPTH: usize = 32;

/// Outcome of searching one tier of candidates
#[derive(Debug)]
enum Binding {
    Found(MethodSymbol),
    Ambiguous,
    NotFound,
}

impl Binding {
    fn found(self) -> Option<MethodSymbol> {
        match self {
            Self::Found(method) => Some(method),
            Self::Ambiguous | Self::NotFound => None,
        }
    }
}

/// Arguments of a call, typed without target typing
struct CallSite {
    args: Vec<Arg>,
    arg_types: Vec<Option<TypeRef>>,
    explicit_type_args: Vec<TypeRef>,
}

/// Semantic model of one file
///
/// Answers are cached per syntax range, so repeated questions from several
/// rules cost one resolution.
pub struct Compilation {
    source: Declarations,
    usings: Vec<String>,
    type_cache: DashMap<(TextRange, CsSyntaxKind), Option<TypeRef>>,
    call_cache: DashMap<TextRange, Option<MethodSymbol>>,
}

impl std::fmt::Debug for Compilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compilation")
            .field("types", &self.source.len())
            .field("usings", &self.usings)
            .finish()
    }
}

impl Compilation {
    pub fn new(tree: &SyntaxTree) -> Self {
        let root = tree.root();
        let usings = file_usings(&root);
        let source = Declarations::build(&[(root, Origin::Source)], library());
        debug!(
            types = source.len(),
            usings = usings.len(),
            "Built compilation"
        );
        Self {
            source,
            usings,
            type_cache: DashMap::new(),
            call_cache: DashMap::new(),
        }
    }

    /// Namespaces imported at the top of the file
    pub fn usings(&self) -> &[String] {
        &self.usings
    }

    /// Types declared in the file
    pub fn declarations(&self) -> &Declarations {
        &self.source
    }

    fn exists(&self, namespace: &str, name: &str, arity: usize) -> bool {
        self.source.contains(namespace, name, arity) || library().contains(namespace, name, arity)
    }

    fn type_info(&self, ty: &TypeRef) -> Option<&TypeInfo> {
        let TypeRef::Named {
            namespace,
            name,
            args,
        } = ty
        else {
            return None;
        };
        self.source
            .get(namespace, name, args.len())
            .or_else(|| library().get(namespace, name, args.len()))
    }

    fn scope(&self, node: &SyntaxNode) -> Scope {
        Scope::at(node, &self.usings)
    }

    /// Resolve type syntax at its position in the file
    pub fn resolve_type_syntax(&self, ty: &TypeSyntax) -> Option<TypeRef> {
        let exists = |ns: &str, name: &str, arity: usize| self.exists(ns, name, arity);
        self.scope(ty.syntax()).resolve_type(ty, &exists)
    }

    // ------------------------------------------------------------------
    // Type relationships
    // ------------------------------------------------------------------

    /// The type itself followed by its base types and interfaces, with type
    /// arguments substituted, most derived first
    pub fn base_instances(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut out = Vec::new();
        self.collect_bases(ty, &mut out, 0);
        let object = TypeRef::system("Object");
        if matches!(ty, TypeRef::Named { .. } | TypeRef::Array(_)) && !out.contains(&object) {
            out.push(object);
        }
        out
    }

    fn collect_bases(&self, ty: &TypeRef, out: &mut Vec<TypeRef>, depth: usize) {
        if depth > MAX_DEPTH || out.contains(ty) {
            return;
        }
        out.push(ty.clone());
        match ty {
            TypeRef::Array(element) => {
                for interface in ["IList", "IReadOnlyList"] {
                    let base =
                        TypeRef::named(GENERIC_COLLECTIONS, interface, vec![(**element).clone()]);
                    self.collect_bases(&base, out, depth + 1);
                }
            }
            TypeRef::Named { .. } => {
                let Some(info) = self.type_info(ty) else {
                    return;
                };
                let map = substitution_for(info, ty);
                for base in &info.bases {
                    self.collect_bases(&base.substitute(&map), out, depth + 1);
                }
            }
            TypeRef::Param(_) | TypeRef::Void => {}
        }
    }

    /// Element type of an enumerable type
    pub fn element_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        if let Some(element) = ty.element_type() {
            return Some(element.clone());
        }
        self.base_instances(ty)
            .into_iter()
            .find(|b| b.is(GENERIC_COLLECTIONS, "IEnumerable") && b.type_args().len() == 1)
            .and_then(|b| b.type_args().first().cloned())
    }

    fn assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        if from == to || to.has_params() || to.is("System", "Object") {
            return true;
        }
        if implicit_numeric(from, to) {
            return true;
        }
        self.base_instances(from).iter().any(|b| b == to)
    }

    /// Unify `pattern` against the first base instance of `actual` that fits
    fn unify_with_bases(
        &self,
        pattern: &TypeRef,
        actual: &TypeRef,
        map: &mut Substitution,
    ) -> bool {
        for candidate in self.base_instances(actual) {
            let mut trial = map.clone();
            if unify(pattern, &candidate, &mut trial) {
                *map = trial;
                return true;
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Expression types
    // ------------------------------------------------------------------

    fn type_of_node(&self, node: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        if depth > MAX_DEPTH {
            trace!(range = ?node.text_range(), "Type resolution depth exceeded");
            return None;
        }
        let key = (node.text_range(), node.kind());
        if let Some(cached) = self.type_cache.get(&key) {
            return cached.clone();
        }
        let ty = self.compute_type(node, depth + 1);
        self.type_cache.insert(key, ty.clone());
        ty
    }

    fn compute_type(&self, node: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        match node.kind() {
            CsSyntaxKind::Literal => literal_type(node),
            CsSyntaxKind::NameRef => self.name_type(node, depth),
            CsSyntaxKind::ParenExpr | CsSyntaxKind::PostfixExpr | CsSyntaxKind::AssignExpr => {
                self.type_of_node(&first_expr(node)?, depth)
            }
            CsSyntaxKind::MemberAccess => self.member_type(node, depth),
            CsSyntaxKind::Invocation => self
                .resolve_call(&Invocation::cast(node.clone())?, depth)
                .map(|m| m.return_type),
            CsSyntaxKind::ImplicitArrayCreation => {
                let first = node
                    .children()
                    .find(|n| n.kind() == CsSyntaxKind::InitializerList)
                    .and_then(|list| first_expr(&list))?;
                Some(TypeRef::array(self.type_of_node(&first, depth)?))
            }
            CsSyntaxKind::ArrayCreation => {
                self.resolve_type_syntax(&ArrayCreation::cast(node.clone())?.ty()?)
            }
            CsSyntaxKind::ObjectCreation => {
                self.resolve_type_syntax(&ObjectCreation::cast(node.clone())?.ty()?)
            }
            CsSyntaxKind::CollectionExpr => self
                .collection_target_type(node, depth)
                .or_else(|| self.natural_collection_type(node, depth)),
            CsSyntaxKind::BinaryExpr => {
                let op = node
                    .children_with_tokens()
                    .filter_map(SyntaxElement::into_token)
                    .find(|t| t.kind().binary_precedence().is_some())?
                    .kind();
                match op {
                    CsSyntaxKind::EqEq
                    | CsSyntaxKind::BangEq
                    | CsSyntaxKind::Lt
                    | CsSyntaxKind::Gt
                    | CsSyntaxKind::LtEq
                    | CsSyntaxKind::GtEq
                    | CsSyntaxKind::AmpAmp
                    | CsSyntaxKind::PipePipe => Some(TypeRef::system("Boolean")),
                    _ => self.type_of_node(&first_expr(node)?, depth),
                }
            }
            CsSyntaxKind::PrefixExpr => {
                let prefix = PrefixExpr::cast(node.clone())?;
                if prefix.op_kind() == Some(CsSyntaxKind::Bang) {
                    Some(TypeRef::system("Boolean"))
                } else {
                    self.type_of_node(prefix.operand()?.syntax(), depth)
                }
            }
            CsSyntaxKind::ConditionalExpr => {
                let conditional = ConditionalExpr::cast(node.clone())?;
                conditional
                    .when_true()
                    .and_then(|e| self.type_of_node(e.syntax(), depth))
                    .or_else(|| {
                        conditional
                            .when_false()
                            .and_then(|e| self.type_of_node(e.syntax(), depth))
                    })
            }
            CsSyntaxKind::ElementAccess => self.element_access_type(node, depth),
            CsSyntaxKind::DeclExpr => {
                let ident = node
                    .children_with_tokens()
                    .filter_map(SyntaxElement::into_token)
                    .find(|t| t.kind() == CsSyntaxKind::Ident)?;
                self.declared_symbol(&ident, depth)?.ty
            }
            _ => None,
        }
    }

    fn name_type(&self, node: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        let token = NameRef::cast(node.clone())?.token()?;
        match token.kind() {
            CsSyntaxKind::ThisKw => Some(self.enclosing_type(node)?.self_type()),
            CsSyntaxKind::Ident => self.lookup_local(&token, depth)?.ty,
            _ => None,
        }
    }

    fn member_type(&self, node: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        let access = MemberAccess::cast(node.clone())?;
        let member = access.name()?.text();
        let receiver = access.receiver()?;
        if let Some(static_type) = self.static_receiver(&receiver, depth) {
            return self
                .type_info(&static_type)?
                .properties
                .iter()
                .find(|p| p.is_static && p.name == member)
                .map(|p| p.ty.clone());
        }
        let receiver_ty = self.type_of_node(receiver.syntax(), depth)?;
        if member == "Length" && receiver_ty.is_array() {
            return Some(TypeRef::system("Int32"));
        }
        self.base_instances(&receiver_ty).iter().find_map(|base| {
            let info = self.type_info(base)?;
            let property = info.properties.iter().find(|p| p.name == member)?;
            Some(property.ty.substitute(&substitution_for(info, base)))
        })
    }

    fn element_access_type(&self, node: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        let receiver = self.type_of_node(&first_expr(node)?, depth)?;
        if let Some(element) = receiver.element_type() {
            return Some(element.clone());
        }
        if receiver.is("System", "String") {
            return Some(TypeRef::system("Char"));
        }
        if receiver.is(GENERIC_COLLECTIONS, "Dictionary") {
            return receiver.type_args().get(1).cloned();
        }
        self.base_instances(&receiver)
            .into_iter()
            .find(|b| {
                b.is(GENERIC_COLLECTIONS, "IList") || b.is(GENERIC_COLLECTIONS, "IReadOnlyList")
            })
            .and_then(|b| b.type_args().first().cloned())
    }

    /// `T[]` where `T` is the type of the first element
    fn natural_collection_type(&self, node: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        let first = node.children().next()?;
        let element = if first.kind() == CsSyntaxKind::SpreadElement {
            let spread = self.type_of_node(&first_expr(&first)?, depth)?;
            self.element_type(&spread)?
        } else {
            self.type_of_node(&first, depth)?
        };
        Some(TypeRef::array(element))
    }

    /// Type a collection expression is converted to by its context
    fn collection_target_type(&self, node: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        let parent = node.parent()?;
        match parent.kind() {
            CsSyntaxKind::VarDeclarator => {
                let ty = VarDeclarator::cast(parent)?.declared_type()?;
                self.resolve_type_syntax(&ty)
            }
            CsSyntaxKind::Arg => self.parameter_type_of_arg(&parent, depth),
            CsSyntaxKind::AssignExpr => {
                let lhs = first_expr(&parent)?;
                if lhs == *node {
                    return None;
                }
                self.type_of_node(&lhs, depth)
            }
            CsSyntaxKind::ReturnStmt | CsSyntaxKind::ArrowBody => {
                let method = parent.ancestors().find_map(MethodDecl::cast)?;
                self.resolve_type_syntax(&method.return_type()?)
            }
            _ => None,
        }
    }

    /// Parameter type at the position of `arg` in its resolved call
    fn parameter_type_of_arg(&self, arg: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        let arg_list = arg.parent()?;
        let index = arg_list
            .children()
            .filter(|n| n.kind() == CsSyntaxKind::Arg)
            .position(|n| n == *arg)?;
        let call = Invocation::cast(arg_list.parent()?)?;
        let method = self.resolve_call(&call, depth)?;
        method.parameters.get(index).map(|p| p.ty.clone())
    }

    /// Type of an argument as seen by overload resolution
    fn arg_type(&self, arg: &Arg, depth: usize) -> Option<TypeRef> {
        if let Some(decl) = arg.decl_expr() {
            return decl.ty().and_then(|t| self.resolve_type_syntax(&t));
        }
        let expr = arg.expr()?;
        match expr.kind() {
            CsSyntaxKind::CollectionExpr => self.natural_collection_type(expr.syntax(), depth),
            CsSyntaxKind::Lambda => None,
            _ => self.type_of_node(expr.syntax(), depth),
        }
    }

    fn enclosing_type(&self, node: &SyntaxNode) -> Option<&TypeInfo> {
        let decl = node.ancestors().find_map(TypeDecl::cast)?;
        self.source
            .get(&decl.namespace(), &decl.name()?, decl.type_params().len())
    }

    /// The type named by a receiver expression, if it names one
    fn static_receiver(&self, receiver: &Expr, depth: usize) -> Option<TypeRef> {
        let mut segments = Vec::new();
        let mut current = receiver.clone();
        while current.kind() == CsSyntaxKind::MemberAccess {
            let access = MemberAccess::cast(current.syntax().clone())?;
            segments.push(access.name()?.text());
            current = access.receiver()?;
        }
        let token = NameRef::cast(current.syntax().clone())?.token()?;
        if token.kind().is_predefined_type() && segments.is_empty() {
            return TypeRef::from_keyword(token.kind());
        }
        if token.kind() != CsSyntaxKind::Ident || self.lookup_local(&token, depth).is_some() {
            return None;
        }
        segments.push(token.text().to_string());
        segments.reverse();
        let exists = |ns: &str, name: &str, arity: usize| self.exists(ns, name, arity);
        let (namespace, name) = self
            .scope(receiver.syntax())
            .resolve_name(&segments, 0, &exists)?;
        Some(TypeRef::named(&namespace, &name, Vec::new()))
    }

    // ------------------------------------------------------------------
    // Call binding
    // ------------------------------------------------------------------

    fn resolve_call(&self, call: &Invocation, depth: usize) -> Option<MethodSymbol> {
        if depth > MAX_DEPTH {
            return None;
        }
        let range = call.syntax().text_range();
        if let Some(cached) = self.call_cache.get(&range) {
            return cached.clone();
        }
        let resolved = self.bind_call(call, depth + 1);
        match &resolved {
            Some(method) => trace!(method = %method.display(), "Bound call"),
            None => trace!(call = %call.syntax().text(), "Call did not bind"),
        }
        self.call_cache.insert(range, resolved.clone());
        resolved
    }

    fn bind_call(&self, call: &Invocation, depth: usize) -> Option<MethodSymbol> {
        let args = call.args();
        let site = CallSite {
            arg_types: args.iter().map(|a| self.arg_type(a, depth)).collect(),
            explicit_type_args: call
                .name_ref()
                .map(|n| {
                    n.type_args()
                        .filter_map(|t| self.resolve_type_syntax(&t))
                        .collect()
                })
                .unwrap_or_default(),
            args,
        };
        let callee = call.callee()?;
        match callee.kind() {
            CsSyntaxKind::MemberAccess => {
                let access = MemberAccess::cast(callee.syntax().clone())?;
                let name = access.name()?.text();
                let receiver = access.receiver()?;
                if let Some(static_type) = self.static_receiver(&receiver, depth) {
                    return self.bind_static(&static_type, &name, &site).found();
                }
                let receiver_ty = self.type_of_node(receiver.syntax(), depth)?;
                match self.bind_instance(&receiver_ty, &name, &site) {
                    Binding::Found(method) => return Some(method),
                    Binding::Ambiguous => return None,
                    Binding::NotFound => {}
                }
                let scope = self.scope(call.syntax());
                match self.bind_extension(&self.source, &scope, &receiver_ty, &name, &site) {
                    Binding::Found(method) => Some(method),
                    Binding::Ambiguous => None,
                    Binding::NotFound => self
                        .bind_extension(library(), &scope, &receiver_ty, &name, &site)
                        .found(),
                }
            }
            CsSyntaxKind::NameRef => {
                let name = NameRef::cast(callee.syntax().clone())?.text();
                let self_type = self.enclosing_type(call.syntax())?.self_type();
                let candidates = self
                    .methods_in_hierarchy(&self_type, &name, site.args.len(), None)
                    .into_iter()
                    .filter_map(|m| self.apply_explicit_type_args(m, &site))
                    .map(|m| self.infer_from_args(m, &site))
                    .collect();
                self.pick(candidates, &site).found()
            }
            _ => None,
        }
    }

    /// Methods named `name` from the most derived type that declares any
    fn methods_in_hierarchy(
        &self,
        ty: &TypeRef,
        name: &str,
        arity: usize,
        is_static: Option<bool>,
    ) -> Vec<MethodSymbol> {
        for base in self.base_instances(ty) {
            let Some(info) = self.type_info(&base) else {
                continue;
            };
            let matching: Vec<&MethodInfo> = info
                .methods
                .iter()
                .filter(|m| m.name == name && m.parameters.len() == arity)
                .filter(|m| is_static.is_none_or(|s| m.is_static == s))
                .collect();
            if !matching.is_empty() {
                let map = substitution_for(info, &base);
                return matching
                    .into_iter()
                    .filter_map(|m| self.instantiate(info, m, &map, None))
                    .collect();
            }
        }
        Vec::new()
    }

    fn bind_instance(&self, receiver: &TypeRef, name: &str, site: &CallSite) -> Binding {
        let candidates = self
            .methods_in_hierarchy(receiver, name, site.args.len(), Some(false))
            .into_iter()
            .filter_map(|m| self.apply_explicit_type_args(m, site))
            .map(|m| self.infer_from_args(m, site))
            .collect();
        self.pick(candidates, site)
    }

    fn bind_static(&self, ty: &TypeRef, name: &str, site: &CallSite) -> Binding {
        let Some(info) = self.type_info(ty) else {
            return Binding::NotFound;
        };
        let candidates = info
            .methods
            .iter()
            .filter(|m| m.is_static && m.name == name && m.parameters.len() == site.args.len())
            .filter_map(|m| self.instantiate(info, m, &Substitution::new(), None))
            .filter_map(|m| self.apply_explicit_type_args(m, site))
            .map(|m| self.infer_from_args(m, site))
            .collect();
        self.pick(candidates, site)
    }

    fn bind_extension(
        &self,
        declarations: &Declarations,
        scope: &Scope,
        receiver: &TypeRef,
        name: &str,
        site: &CallSite,
    ) -> Binding {
        let mut candidates = Vec::new();
        for info in declarations
            .iter()
            .filter(|t| t.is_static && scope.sees_namespace(&t.namespace))
        {
            let methods = info.methods.iter().filter(|m| {
                m.is_extension && m.name == name && m.parameters.len() == site.args.len() + 1
            });
            for method in methods {
                let candidate = self
                    .instantiate(info, method, &Substitution::new(), Some(receiver))
                    .and_then(|m| self.apply_explicit_type_args(m, site))
                    .map(|m| self.infer_from_args(m, site));
                candidates.extend(candidate);
            }
        }
        self.pick(candidates, site)
    }

    /// Build a method symbol, binding the receiver of a reduced extension
    /// method; `None` if the receiver does not fit its `this` parameter
    fn instantiate(
        &self,
        info: &TypeInfo,
        method: &MethodInfo,
        type_map: &Substitution,
        receiver: Option<&TypeRef>,
    ) -> Option<MethodSymbol> {
        let mut map = type_map.clone();
        let mut parameters = method.parameters.clone();
        let (kind, this_parameter) = match receiver {
            Some(receiver) => {
                if parameters.is_empty() {
                    return None;
                }
                let this_parameter = parameters.remove(0);
                if !self.unify_with_bases(&this_parameter.ty, receiver, &mut map) {
                    return None;
                }
                (MethodKind::ReducedExtension, Some(this_parameter))
            }
            None => (MethodKind::Ordinary, None),
        };
        let symbol = MethodSymbol {
            name: method.name.clone(),
            containing_namespace: info.namespace.clone(),
            containing_type: info.name.clone(),
            origin: info.origin.clone(),
            kind,
            is_static: method.is_static,
            is_extension: method.is_extension,
            type_params: method.type_params.clone(),
            type_args: method
                .type_params
                .iter()
                .map(|p| TypeRef::Param(p.clone()))
                .collect(),
            this_parameter,
            parameters,
            return_type: method.return_type.clone(),
        };
        Some(substitute_symbol(symbol, &map))
    }

    fn apply_explicit_type_args(
        &self,
        method: MethodSymbol,
        site: &CallSite,
    ) -> Option<MethodSymbol> {
        if site.explicit_type_args.is_empty() {
            return Some(method);
        }
        if site.explicit_type_args.len() != method.type_params.len() {
            return None;
        }
        let map: Substitution = method
            .type_params
            .iter()
            .cloned()
            .zip(site.explicit_type_args.iter().cloned())
            .collect();
        Some(substitute_symbol(method, &map))
    }

    /// Bind remaining method type parameters from argument types
    fn infer_from_args(&self, method: MethodSymbol, site: &CallSite) -> MethodSymbol {
        let mut map = Substitution::new();
        for (param, arg_ty) in method.parameters.iter().zip(&site.arg_types) {
            if let Some(arg_ty) = arg_ty
                && param.ty.has_params()
            {
                self.unify_with_bases(&param.ty, arg_ty, &mut map);
            }
        }
        if map.is_empty() {
            return method;
        }
        substitute_symbol(method, &map)
    }

    fn is_applicable(&self, method: &MethodSymbol, site: &CallSite) -> bool {
        method
            .parameters
            .iter()
            .zip(site.args.iter().zip(&site.arg_types))
            .all(|(param, (arg, arg_ty))| {
                if arg_ref_kind(arg) != param.ref_kind {
                    return false;
                }
                if arg.expr().is_some_and(|e| e.kind() == CsSyntaxKind::Lambda) {
                    return param.ty.is_delegate() || matches!(param.ty, TypeRef::Param(_));
                }
                arg_ty
                    .as_ref()
                    .is_none_or(|arg_ty| self.assignable(arg_ty, &param.ty))
            })
    }

    /// Every parameter of `a`, receiver included, converts to the matching
    /// parameter of `b`
    fn at_least_as_specific(&self, a: &MethodSymbol, b: &MethodSymbol) -> bool {
        let a_params: Vec<_> = a.all_parameters().collect();
        let b_params: Vec<_> = b.all_parameters().collect();
        a_params.len() == b_params.len()
            && a_params
                .iter()
                .zip(&b_params)
                .all(|(pa, pb)| self.assignable(&pa.ty, &pb.ty))
    }

    fn pick(&self, mut candidates: Vec<MethodSymbol>, site: &CallSite) -> Binding {
        if candidates.len() <= 1 {
            return candidates.pop().map_or(Binding::NotFound, Binding::Found);
        }
        let mut applicable: Vec<MethodSymbol> = candidates
            .into_iter()
            .filter(|m| self.is_applicable(m, site))
            .collect();
        if applicable.len() == 1 {
            return applicable.pop().map_or(Binding::Ambiguous, Binding::Found);
        }
        let best: Vec<usize> = (0..applicable.len())
            .filter(|&i| {
                (0..applicable.len()).all(|j| {
                    i == j
                        || (self.at_least_as_specific(&applicable[i], &applicable[j])
                            && !self.at_least_as_specific(&applicable[j], &applicable[i]))
                })
            })
            .collect();
        match best.as_slice() {
            [only] => Binding::Found(applicable.swap_remove(*only)),
            _ => {
                trace!(candidates = applicable.len(), "Ambiguous call");
                Binding::Ambiguous
            }
        }
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    /// Find the declaration an identifier in a `NameRef` refers to
    fn lookup_local(&self, token: &SyntaxToken, depth: usize) -> Option<LocalSymbol> {
        let name_ref = token.parent()?;
        if let Some(access) = name_ref.parent().and_then(MemberAccess::cast)
            && access.name().is_some_and(|n| *n.syntax() == name_ref)
        {
            return None;
        }
        let name = token.text();
        let offset = token.text_range().start();
        for scope in name_ref.ancestors().skip(1) {
            let declaring = match scope.kind() {
                CsSyntaxKind::Block => find_in_block(&scope, name, offset),
                CsSyntaxKind::ForeachStmt => {
                    let foreach = ForeachStmt::cast(scope.clone())?;
                    let in_body = foreach
                        .body()
                        .is_some_and(|b| b.syntax().text_range().contains(offset));
                    foreach.name_token().filter(|t| in_body && t.text() == name)
                }
                CsSyntaxKind::Lambda => Lambda::cast(scope.clone())?
                    .param_tokens()
                    .into_iter()
                    .find(|t| t.text() == name),
                CsSyntaxKind::MethodDecl => MethodDecl::cast(scope.clone())?
                    .params()
                    .iter()
                    .filter_map(|p| p.name_token())
                    .find(|t| t.text() == name),
                CsSyntaxKind::ConstructorDecl => ConstructorDecl::cast(scope.clone())?
                    .params()
                    .iter()
                    .filter_map(|p| p.name_token())
                    .find(|t| t.text() == name),
                CsSyntaxKind::TypeDecl => {
                    member_declaration(&TypeDecl::cast(scope.clone())?, name)
                }
                _ => None,
            };
            if let Some(declaring) = declaring {
                return self.declared_symbol(&declaring, depth);
            }
        }
        None
    }

    /// Symbol for a declaring identifier
    fn declared_symbol(&self, ident: &SyntaxToken, depth: usize) -> Option<LocalSymbol> {
        let parent = ident.parent()?;
        let (kind, ty) = match parent.kind() {
            CsSyntaxKind::VarDeclarator => {
                let declarator = VarDeclarator::cast(parent.clone())?;
                let kind = match parent.parent().map(|p| p.kind()) {
                    Some(CsSyntaxKind::LocalDecl) => LocalKind::Local,
                    _ => LocalKind::Field,
                };
                let declared = declarator.declared_type()?;
                let ty = if declared.is_var() {
                    declarator
                        .initializer()
                        .and_then(|init| self.type_of_node(init.syntax(), depth))
                } else {
                    self.resolve_type_syntax(&declared)
                };
                (kind, ty)
            }
            CsSyntaxKind::DeclExpr => {
                let declared = parent.children().find_map(TypeSyntax::cast)?;
                let ty = if declared.is_var() {
                    self.parameter_type_of_arg(&parent.parent()?, depth)
                } else {
                    self.resolve_type_syntax(&declared)
                };
                (LocalKind::OutVariable, ty)
            }
            CsSyntaxKind::Param => {
                let ty = parent
                    .children()
                    .find_map(TypeSyntax::cast)
                    .and_then(|t| self.resolve_type_syntax(&t));
                (LocalKind::Parameter, ty)
            }
            CsSyntaxKind::ForeachStmt => {
                let foreach = ForeachStmt::cast(parent.clone())?;
                let declared = foreach.ty()?;
                let ty = if declared.is_var() {
                    foreach
                        .iterable()
                        .and_then(|e| self.type_of_node(e.syntax(), depth))
                        .and_then(|t| self.element_type(&t))
                } else {
                    self.resolve_type_syntax(&declared)
                };
                (LocalKind::ForeachVariable, ty)
            }
            CsSyntaxKind::LambdaParamList => (LocalKind::LambdaParameter, None),
            CsSyntaxKind::PropertyDecl => {
                let ty = PropertyDecl::cast(parent.clone())?
                    .ty()
                    .and_then(|t| self.resolve_type_syntax(&t));
                (LocalKind::Field, ty)
            }
            _ => return None,
        };
        Some(LocalSymbol {
            name: ident.text().to_string(),
            declared_at: ident.text_range(),
            ty,
            kind,
        })
    }
}

impl SemanticFacts for Compilation {
    fn resolve_invocation(&self, call: &Invocation) -> Option<MethodSymbol> {
        self.resolve_call(call, 0)
    }

    fn type_of(&self, expr: &Expr) -> Option<TypeRef> {
        self.type_of_node(expr.syntax(), 0)
    }

    fn local_symbol(&self, token: &SyntaxToken) -> Option<LocalSymbol> {
        if token.kind() != CsSyntaxKind::Ident {
            return None;
        }
        match token.parent()?.kind() {
            CsSyntaxKind::NameRef => self.lookup_local(token, 0),
            _ => self.declared_symbol(token, 0),
        }
    }

    fn implements(&self, ty: &TypeRef, full_name: &str) -> bool {
        self.base_instances(ty)
            .iter()
            .any(|b| b.full_name().as_deref() == Some(full_name))
    }

    fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        self.assignable(from, to)
    }

    fn element_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        Compilation::element_type(self, ty)
    }
}

fn first_expr(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.children().find(|n| Expr::can_cast(n.kind()))
}

/// Implicit numeric conversions between predefined types
fn implicit_numeric(from: &TypeRef, to: &TypeRef) -> bool {
    const WIDENING: &[(&str, &[&str])] = &[
        ("Int32", &["Int64", "Single", "Double", "Decimal"]),
        ("Int64", &["Single", "Double", "Decimal"]),
        ("Char", &["Int32", "Int64", "Single", "Double", "Decimal"]),
        ("Single", &["Double"]),
    ];
    if !from.type_args().is_empty() || !to.type_args().is_empty() {
        return false;
    }
    if from.namespace() != Some("System") || to.namespace() != Some("System") {
        return false;
    }
    let (Some(from), Some(to)) = (from.full_name(), to.full_name()) else {
        return false;
    };
    WIDENING.iter().any(|(source, targets)| {
        from.strip_prefix("System.") == Some(*source)
            && targets.iter().any(|t| to.strip_prefix("System.") == Some(*t))
    })
}

fn arg_ref_kind(arg: &Arg) -> RefKind {
    match arg.ref_kind() {
        Some(CsSyntaxKind::OutKw) => RefKind::Out,
        Some(CsSyntaxKind::RefKw) => RefKind::Ref,
        Some(CsSyntaxKind::InKw) => RefKind::In,
        _ => RefKind::Value,
    }
}

/// Map from a type's own parameters to the arguments of `instance`
fn substitution_for(info: &TypeInfo, instance: &TypeRef) -> Substitution {
    info.type_params
        .iter()
        .cloned()
        .zip(instance.type_args().iter().cloned())
        .collect()
}

fn substitute_symbol(mut symbol: MethodSymbol, map: &Substitution) -> MethodSymbol {
    let substitute_param = |p: &ParameterSymbol| ParameterSymbol {
        ty: p.ty.substitute(map),
        ..p.clone()
    };
    symbol.parameters = symbol.parameters.iter().map(substitute_param).collect();
    symbol.this_parameter = symbol.this_parameter.as_ref().map(substitute_param);
    symbol.return_type = symbol.return_type.substitute(map);
    symbol.type_args = symbol.type_args.iter().map(|t| t.substitute(map)).collect();
    symbol
}

fn literal_type(node: &SyntaxNode) -> Option<TypeRef> {
    let token = node
        .children_with_tokens()
        .filter_map(SyntaxElement::into_token)
        .find(|t| !t.kind().is_trivia())?;
    let name = match token.kind() {
        CsSyntaxKind::IntLiteral if token.text().ends_with(['L', 'l']) => "Int64",
        CsSyntaxKind::IntLiteral => "Int32",
        CsSyntaxKind::RealLiteral => match token.text().chars().last() {
            Some('f' | 'F') => "Single",
            Some('m' | 'M') => "Decimal",
            _ => "Double",
        },
        CsSyntaxKind::StringLiteral | CsSyntaxKind::InterpolatedString => "String",
        CsSyntaxKind::CharLiteral => "Char",
        CsSyntaxKind::TrueKw | CsSyntaxKind::FalseKw => "Boolean",
        _ => return None,
    };
    Some(TypeRef::system(name))
}

/// Declaring identifier of a local visible at `offset` in `block`
///
/// Statements after the use and nested blocks are not searched. A local
/// whose own declarator contains the use is not yet in scope.
fn find_in_block(block: &SyntaxNode, name: &str, offset: TextSize) -> Option<SyntaxToken> {
    let mut found = None;
    for stmt in Block::cast(block.clone())?.statements() {
        let stmt = stmt.syntax().clone();
        if stmt.text_range().start() >= offset {
            break;
        }
        if stmt.kind() == CsSyntaxKind::Block {
            continue;
        }
        let locals: Vec<SyntaxToken> = LocalDecl::cast(stmt.clone())
            .map(|decl| {
                decl.declarators()
                    .filter(|d| !d.syntax().text_range().contains(offset))
                    .filter_map(|d| d.name_token())
                    .collect()
            })
            .unwrap_or_default();
        let out_vars = stmt
            .descendants()
            .filter(|n| n.kind() == CsSyntaxKind::DeclExpr)
            .filter(|n| {
                n.ancestors()
                    .take_while(|a| *a != stmt)
                    .all(|a| !matches!(a.kind(), CsSyntaxKind::Block | CsSyntaxKind::Lambda))
            })
            .filter_map(|n| {
                n.children_with_tokens()
                    .filter_map(SyntaxElement::into_token)
                    .find(|t| t.kind() == CsSyntaxKind::Ident)
            });
        for ident in locals.into_iter().chain(out_vars) {
            if ident.text() == name && ident.text_range().end() <= offset {
                found = Some(ident);
            }
        }
    }
    found
}

/// Declaring identifier of a field or property of `decl`
fn member_declaration(decl: &TypeDecl, name: &str) -> Option<SyntaxToken> {
    let fields = decl
        .fields()
        .flat_map(|f| f.declarators())
        .filter_map(|d| d.name_token());
    let properties = decl.properties().filter_map(|p| {
        p.syntax()
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| t.kind() == CsSyntaxKind::Ident)
    });
    fields.chain(properties).find(|t| t.text() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USINGS: &str = "using System;\nusing System.Collections.Generic;\nusing System.Linq;";

    fn compile(source: &str) -> (SyntaxTree, Compilation) {
        let tree = SyntaxTree::parse(source);
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        let compilation = Compilation::new(&tree);
        (tree, compilation)
    }

    fn in_method(usings: &str, body: &str) -> String {
        format!(
            "{usings}\nclass C\n{{\n    void M(int[] numbers, List<int> list)\n    {{\n        {body}\n    }}\n}}\n"
        )
    }

    fn call_named(tree: &SyntaxTree, name: &str) -> Invocation {
        tree.root()
            .descendants()
            .filter_map(Invocation::cast)
            .find(|c| c.method_name().as_deref() == Some(name))
            .unwrap()
    }

    fn declarator_named(tree: &SyntaxTree, name: &str) -> VarDeclarator {
        tree.root()
            .descendants()
            .filter_map(VarDeclarator::cast)
            .find(|d| d.name().as_deref() == Some(name))
            .unwrap()
    }

    #[test]
    fn test_binds_linq_extension_on_array() {
        let (tree, compilation) = compile(&in_method(USINGS, "var xs = numbers.ToList();"));
        let method = compilation
            .resolve_invocation(&call_named(&tree, "ToList"))
            .unwrap();
        assert_eq!(method.kind, MethodKind::ReducedExtension);
        assert_eq!(method.containing_type_full_name(), "System.Linq.Enumerable");
        assert_eq!(method.origin.library(), Some(super::super::SYSTEM_LINQ));
        assert_eq!(method.type_args, vec![TypeRef::system("Int32")]);
        assert!(method.parameters.is_empty());
        assert_eq!(
            method.return_type,
            TypeRef::named(GENERIC_COLLECTIONS, "List", vec![TypeRef::system("Int32")])
        );
    }

    #[test]
    fn test_extension_needs_using() {
        let (tree, compilation) = compile(&in_method(
            "using System.Collections.Generic;",
            "var xs = numbers.ToList();",
        ));
        assert!(
            compilation
                .resolve_invocation(&call_named(&tree, "ToList"))
                .is_none()
        );
    }

    #[test]
    fn test_instance_method_beats_extension() {
        let (tree, compilation) = compile(&in_method(USINGS, "var found = list.Contains(3);"));
        let method = compilation
            .resolve_invocation(&call_named(&tree, "Contains"))
            .unwrap();
        assert_eq!(method.kind, MethodKind::Ordinary);
        assert_eq!(
            method.containing_type_full_name(),
            "System.Collections.Generic.List"
        );
        assert_eq!(method.parameters[0].ty, TypeRef::system("Int32"));
    }

    #[test]
    fn test_queryable_preferred_over_enumerable() {
        let (tree, compilation) =
            compile(&in_method(USINGS, "var q = numbers.AsQueryable().Distinct();"));
        let method = compilation
            .resolve_invocation(&call_named(&tree, "Distinct"))
            .unwrap();
        assert_eq!(method.containing_type_full_name(), "System.Linq.Queryable");
    }

    #[test]
    fn test_var_local_type_flows_through_chain() {
        let (tree, compilation) = compile(&in_method(
            USINGS,
            "var set = numbers.ToHashSet();\n        var n = set.Count;",
        ));
        let n = declarator_named(&tree, "n");
        let symbol = compilation.local_symbol(&n.name_token().unwrap()).unwrap();
        assert_eq!(symbol.kind, LocalKind::Local);
        assert_eq!(symbol.ty, Some(TypeRef::system("Int32")));
    }

    #[test]
    fn test_out_var_takes_parameter_type() {
        let (tree, compilation) = compile(&in_method(
            USINGS,
            "if (int.TryParse(\"1\", out var value)) { }",
        ));
        let ident = tree
            .root()
            .descendants()
            .find(|n| n.kind() == CsSyntaxKind::DeclExpr)
            .unwrap()
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| t.kind() == CsSyntaxKind::Ident)
            .unwrap();
        let symbol = compilation.local_symbol(&ident).unwrap();
        assert_eq!(symbol.kind, LocalKind::OutVariable);
        assert_eq!(symbol.ty, Some(TypeRef::system("Int32")));
    }

    #[test]
    fn test_static_call_with_explicit_type_args() {
        let source = format!(
            "{USINGS}\nclass C\n{{\n    bool M(string s)\n    {{\n        return Enum.TryParse<DayOfWeek>(s, out var day);\n    }}\n}}\n"
        );
        let (tree, compilation) = compile(&source);
        let method = compilation
            .resolve_invocation(&call_named(&tree, "TryParse"))
            .unwrap();
        assert_eq!(method.type_args, vec![TypeRef::system("DayOfWeek")]);
        assert_eq!(method.parameters[1].ref_kind, RefKind::Out);
        assert_eq!(method.parameters[1].ty, TypeRef::system("DayOfWeek"));
    }

    #[test]
    fn test_source_extension_shadows_library() {
        let source = format!(
            "{USINGS}\nnamespace App\n{{\n    static class Ext\n    {{\n        public static List<T> ToList<T>(this IEnumerable<T> source);\n    }}\n\n    class C\n    {{\n        void M(int[] numbers)\n        {{\n            var xs = numbers.ToList();\n        }}\n    }}\n}}\n"
        );
        let (tree, compilation) = compile(&source);
        let method = compilation
            .resolve_invocation(&call_named(&tree, "ToList"))
            .unwrap();
        assert_eq!(method.origin, Origin::Source);
        assert_eq!(method.containing_type_full_name(), "App.Ext");
    }

    #[test]
    fn test_type_relationships() {
        let (_, compilation) = compile(USINGS);
        let list = TypeRef::named(GENERIC_COLLECTIONS, "List", vec![TypeRef::system("String")]);
        assert!(compilation.implements(&list, "System.Collections.Generic.IEnumerable"));
        assert!(compilation.implements(
            &TypeRef::system("String"),
            "System.Collections.Generic.IEnumerable"
        ));
        assert!(compilation.is_assignable(&TypeRef::system("Int32"), &TypeRef::system("Int64")));
        assert!(!compilation.is_assignable(&TypeRef::system("Int64"), &TypeRef::system("Int32")));
        assert_eq!(
            compilation.element_type(&list),
            Some(TypeRef::system("String"))
        );
    }

    #[test]
    fn test_collection_expression_target_type() {
        let (tree, compilation) = compile(&in_method(USINGS, "List<int> xs = [1, 2];"));
        let collection = tree
            .root()
            .descendants()
            .find_map(|n| Expr::cast(n).filter(|e| e.kind() == CsSyntaxKind::CollectionExpr))
            .unwrap();
        assert_eq!(
            compilation.type_of(&collection),
            Some(TypeRef::named(
                GENERIC_COLLECTIONS,
                "List",
                vec![TypeRef::system("Int32")]
            ))
        );
    }

    #[test]
    fn test_local_lookup_respects_order() {
        let (tree, compilation) = compile(&in_method(
            USINGS,
            "var a = 1;\n        var b = a;\n        var c = 2.5;",
        ));
        let b = declarator_named(&tree, "b");
        let symbol = compilation.local_symbol(&b.name_token().unwrap()).unwrap();
        assert_eq!(symbol.ty, Some(TypeRef::system("Int32")));
        let a_use = b
            .initializer()
            .and_then(|e| NameRef::cast(e.syntax().clone()))
            .and_then(|n| n.token())
            .unwrap();
        let a = compilation.local_symbol(&a_use).unwrap();
        assert_eq!(a.declared_at, declarator_named(&tree, "a").name_token().unwrap().text_range());
    }
}
