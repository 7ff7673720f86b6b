//! Declared types and their members
//!
//! Declarations are extracted from syntax into owned data, so they can be
//! shared across threads independently of the red trees they came from.
//! Extraction runs in two passes: type shells first, so member signatures
//! can refer to any type declared in the same batch of files.

use indexmap::IndexMap;
use tracing::trace;

use super::{Origin, ParameterSymbol, RefKind, TypeRef};
use crate::cst::ast::{
    AstNode, CompilationUnit, MethodDecl, NamedType, NamespaceDecl, Param, PredefinedType,
    TypeDecl, TypeSyntax,
};
use crate::cst::{CsSyntaxKind, SyntaxNode};

/// Namespace, name and generic arity
pub type TypeKey = (String, String, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub name: String,
    pub is_static: bool,
    pub is_extension: bool,
    pub type_params: Vec<String>,
    pub parameters: Vec<ParameterSymbol>,
    pub return_type: TypeRef,
}

#[derive(Debug, Clone)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub namespace: String,
    pub name: String,
    pub type_params: Vec<String>,
    pub kind: TypeKind,
    pub is_static: bool,
    pub origin: Origin,
    pub bases: Vec<TypeRef>,
    pub methods: Vec<MethodInfo>,
    /// Properties and fields
    pub properties: Vec<PropertyInfo>,
}

impl TypeInfo {
    pub fn key(&self) -> TypeKey {
        (
            self.namespace.clone(),
            self.name.clone(),
            self.type_params.len(),
        )
    }

    /// The type with its own parameters as arguments
    pub fn self_type(&self) -> TypeRef {
        TypeRef::named(
            &self.namespace,
            &self.name,
            self.type_params
                .iter()
                .map(|p| TypeRef::Param(p.clone()))
                .collect(),
        )
    }
}

/// A set of declared types
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    types: IndexMap<TypeKey, TypeInfo>,
}

impl Declarations {
    /// Extract declarations from parsed files
    ///
    /// Type names in member signatures resolve against these files and
    /// against `external`.
    pub fn build(roots: &[(SyntaxNode, Origin)], external: &Declarations) -> Self {
        let mut shells = IndexMap::new();
        for (root, origin) in roots {
            for decl in root.descendants().filter_map(TypeDecl::cast) {
                let Some(info) = shell(&decl, origin) else {
                    continue;
                };
                shells.insert(info.key(), info);
            }
        }

        let exists = |ns: &str, name: &str, arity: usize| {
            let key = (ns.to_string(), name.to_string(), arity);
            shells.contains_key(&key) || external.types.contains_key(&key)
        };

        let mut members = Vec::new();
        for (root, _) in roots {
            let usings = file_usings(root);
            for decl in root.descendants().filter_map(TypeDecl::cast) {
                let Some(key) = decl_key(&decl) else {
                    continue;
                };
                let scope = Scope::at(decl.syntax(), &usings);
                let bases = decl
                    .base_types()
                    .iter()
                    .filter_map(|b| scope.resolve_type(b, &exists))
                    .collect::<Vec<_>>();
                let (methods, properties) = collect_members(&decl, &usings, &exists);
                members.push((key, bases, methods, properties));
            }
        }

        for (key, bases, methods, properties) in members {
            if let Some(info) = shells.get_mut(&key) {
                info.bases = bases;
                info.methods.extend(methods);
                info.properties.extend(properties);
            }
        }
        Self { types: shells }
    }

    pub fn get(&self, namespace: &str, name: &str, arity: usize) -> Option<&TypeInfo> {
        self.types
            .get(&(namespace.to_string(), name.to_string(), arity))
    }

    pub fn contains(&self, namespace: &str, name: &str, arity: usize) -> bool {
        self.get(namespace, name, arity).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn decl_key(decl: &TypeDecl) -> Option<TypeKey> {
    Some((decl.namespace(), decl.name()?, decl.type_params().len()))
}

fn shell(decl: &TypeDecl, origin: &Origin) -> Option<TypeInfo> {
    let kind = if decl.is_interface() {
        TypeKind::Interface
    } else if decl
        .syntax()
        .children_with_tokens()
        .any(|e| e.kind() == CsSyntaxKind::StructKw)
    {
        TypeKind::Struct
    } else {
        TypeKind::Class
    };
    Some(TypeInfo {
        namespace: decl.namespace(),
        name: decl.name()?,
        type_params: decl.type_params(),
        kind,
        is_static: decl.is_static(),
        origin: origin.clone(),
        bases: Vec::new(),
        methods: Vec::new(),
        properties: Vec::new(),
    })
}

fn collect_members(
    decl: &TypeDecl,
    usings: &[String],
    exists: &dyn Fn(&str, &str, usize) -> bool,
) -> (Vec<MethodInfo>, Vec<PropertyInfo>) {
    let mut methods = Vec::new();
    for method in decl.methods() {
        match method_info(&method, usings, exists) {
            Some(info) => methods.push(info),
            None => trace!(
                method = method.name().unwrap_or_default(),
                "Skipping method with unresolved signature"
            ),
        }
    }

    let scope = Scope::at(decl.syntax(), usings);
    let mut properties = Vec::new();
    for property in decl.properties() {
        if let (Some(name), Some(ty)) = (
            property.name(),
            property.ty().and_then(|t| scope.resolve_type(&t, exists)),
        ) {
            properties.push(PropertyInfo {
                name,
                ty,
                is_static: property.is_static(),
            });
        }
    }
    for field in decl.fields() {
        let Some(ty) = field.ty().and_then(|t| scope.resolve_type(&t, exists)) else {
            continue;
        };
        let is_static = field
            .syntax()
            .children_with_tokens()
            .any(|e| matches!(e.kind(), CsSyntaxKind::StaticKw | CsSyntaxKind::ConstKw));
        for declarator in field.declarators() {
            if let Some(name) = declarator.name() {
                properties.push(PropertyInfo {
                    name,
                    ty: ty.clone(),
                    is_static,
                });
            }
        }
    }
    (methods, properties)
}

fn method_info(
    method: &MethodDecl,
    usings: &[String],
    exists: &dyn Fn(&str, &str, usize) -> bool,
) -> Option<MethodInfo> {
    let scope = Scope::at(method.syntax(), usings);
    let parameters = method
        .params()
        .iter()
        .map(|p| parameter_symbol(p, &scope, exists))
        .collect::<Option<Vec<_>>>()?;
    Some(MethodInfo {
        name: method.name()?,
        is_static: method.is_static(),
        is_extension: method.is_extension(),
        type_params: method.type_params(),
        parameters,
        return_type: scope.resolve_type(&method.return_type()?, exists)?,
    })
}

pub(crate) fn parameter_symbol(
    param: &Param,
    scope: &Scope,
    exists: &dyn Fn(&str, &str, usize) -> bool,
) -> Option<ParameterSymbol> {
    let ref_kind = match param.ref_kind() {
        Some(CsSyntaxKind::OutKw) => RefKind::Out,
        Some(CsSyntaxKind::RefKw) => RefKind::Ref,
        Some(CsSyntaxKind::InKw) => RefKind::In,
        _ => RefKind::Value,
    };
    Some(ParameterSymbol {
        name: param.name()?,
        ty: scope.resolve_type(&param.ty()?, exists)?,
        ref_kind,
    })
}

/// Namespaces imported by `using` directives at the top of a file
pub fn file_usings(root: &SyntaxNode) -> Vec<String> {
    CompilationUnit::cast(root.clone())
        .map(|unit| unit.usings().filter_map(|u| u.name()).collect())
        .unwrap_or_default()
}

/// Names visible at a point in the source, for resolving type syntax
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    /// Enclosing namespaces, innermost first, ending with the global one
    namespaces: Vec<String>,
    usings: Vec<String>,
    type_params: Vec<String>,
}

impl Scope {
    pub(crate) fn at(node: &SyntaxNode, usings: &[String]) -> Self {
        let mut type_params = Vec::new();
        let mut parts = Vec::new();
        for ancestor in node.ancestors() {
            if let Some(method) = MethodDecl::cast(ancestor.clone()) {
                type_params.extend(method.type_params());
            } else if let Some(decl) = TypeDecl::cast(ancestor.clone()) {
                type_params.extend(decl.type_params());
            } else if let Some(name) = NamespaceDecl::cast(ancestor).and_then(|ns| ns.name()) {
                parts.push(name);
            }
        }
        parts.reverse();
        let full = parts.join(".");
        let segments: Vec<&str> = if full.is_empty() {
            Vec::new()
        } else {
            full.split('.').collect()
        };
        let mut namespaces: Vec<String> = (1..=segments.len())
            .rev()
            .map(|n| segments[..n].join("."))
            .collect();
        namespaces.push(String::new());
        Self {
            namespaces,
            usings: usings.to_vec(),
            type_params,
        }
    }

    /// Whether types in `namespace` are visible without qualification
    pub(crate) fn sees_namespace(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|n| n == namespace) || self.usings.iter().any(|u| u == namespace)
    }

    /// Resolve a possibly dotted type name to its namespace and name
    pub(crate) fn resolve_name(
        &self,
        segments: &[String],
        arity: usize,
        exists: &dyn Fn(&str, &str, usize) -> bool,
    ) -> Option<(String, String)> {
        let (name, qualifier) = segments.split_last()?;
        if !qualifier.is_empty() {
            let qualifier = qualifier.join(".");
            return self
                .namespaces
                .iter()
                .map(|ns| {
                    if ns.is_empty() {
                        qualifier.clone()
                    } else {
                        format!("{ns}.{qualifier}")
                    }
                })
                .find(|ns| exists(ns, name, arity))
                .map(|ns| (ns, name.clone()));
        }
        self.namespaces
            .iter()
            .chain(&self.usings)
            .find(|ns| exists(ns, name, arity))
            .map(|ns| (ns.clone(), name.clone()))
    }

    pub(crate) fn resolve_type(
        &self,
        ty: &TypeSyntax,
        exists: &dyn Fn(&str, &str, usize) -> bool,
    ) -> Option<TypeRef> {
        match ty.kind() {
            CsSyntaxKind::PredefinedType => PredefinedType::cast(ty.syntax().clone())?
                .keyword()
                .and_then(TypeRef::from_keyword),
            CsSyntaxKind::NamedType => {
                let named = NamedType::cast(ty.syntax().clone())?;
                let segments = named.segments();
                if ty.is_var() {
                    return None;
                }
                if let [single] = segments.as_slice() {
                    if self.type_params.contains(single) {
                        return Some(TypeRef::Param(single.clone()));
                    }
                }
                let args = named
                    .type_args()
                    .map(|arg| self.resolve_type(&arg, exists))
                    .collect::<Option<Vec<_>>>()?;
                let (namespace, name) = self.resolve_name(&segments, args.len(), exists)?;
                Some(TypeRef::Named {
                    namespace,
                    name,
                    args,
                })
            }
            CsSyntaxKind::ArrayType => Some(TypeRef::array(
                self.resolve_type(&ty.element_type()?, exists)?,
            )),
            CsSyntaxKind::NullableType => self.resolve_type(&ty.element_type()?, exists),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::SyntaxTree;

    const SOURCE: &str = r#"
using System.Collections.Generic;

namespace Shapes
{
    public interface IShape { double Area(); }

    public class Box<T> : IShape
    {
        private List<T> items;
        public int Count { get; }
        public double Area();
        public static Box<T> Of(T item);
    }
}
"#;

    #[test]
    fn test_build_resolves_members() {
        let tree = SyntaxTree::parse(SOURCE);
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        let declarations =
            Declarations::build(&[(tree.root(), Origin::Source)], super::super::library());
        let shape_box = declarations.get("Shapes", "Box", 1).unwrap();
        assert_eq!(shape_box.bases, vec![TypeRef::named("Shapes", "IShape", vec![])]);
        let of = shape_box.methods.iter().find(|m| m.name == "Of").unwrap();
        assert!(of.is_static);
        assert_eq!(of.parameters[0].ty, TypeRef::Param("T".into()));
        let items = shape_box
            .properties
            .iter()
            .find(|p| p.name == "items")
            .unwrap();
        assert_eq!(
            items.ty,
            TypeRef::named("System.Collections.Generic", "List", vec![TypeRef::Param("T".into())])
        );
    }

    #[test]
    fn test_scope_namespaces() {
        let tree = SyntaxTree::parse("namespace A.B { class C { } }");
        let class = tree.root().descendants().find_map(TypeDecl::cast).unwrap();
        let scope = Scope::at(class.syntax(), &["System".to_string()]);
        assert!(scope.sees_namespace("A.B"));
        assert!(scope.sees_namespace("A"));
        assert!(scope.sees_namespace(""));
        assert!(scope.sees_namespace("System"));
        assert!(!scope.sees_namespace("System.Linq"));
    }
}
