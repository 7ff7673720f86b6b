//! Type references

use std::collections::HashMap;
use std::fmt;

use crate::cst::CsSyntaxKind;

/// Bindings from type parameter names to types
pub type Substitution = HashMap<String, TypeRef>;

/// A reference to a type, with generic arguments applied
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named {
        namespace: String,
        name: String,
        args: Vec<TypeRef>,
    },
    Array(Box<TypeRef>),
    /// An unbound type parameter
    Param(String),
    Void,
}

/// Predefined keyword, its spelling, and the `System` type it stands for
const KEYWORD_TYPES: &[(CsSyntaxKind, &str, &str)] = &[
    (CsSyntaxKind::IntKw, "int", "Int32"),
    (CsSyntaxKind::LongKw, "long", "Int64"),
    (CsSyntaxKind::DoubleKw, "double", "Double"),
    (CsSyntaxKind::FloatKw, "float", "Single"),
    (CsSyntaxKind::DecimalKw, "decimal", "Decimal"),
    (CsSyntaxKind::BoolKw, "bool", "Boolean"),
    (CsSyntaxKind::CharKw, "char", "Char"),
    (CsSyntaxKind::StringKw, "string", "String"),
    (CsSyntaxKind::ObjectKw, "object", "Object"),
];

pub const GENERIC_COLLECTIONS: &str = "System.Collections.Generic";

impl TypeRef {
    pub fn named(namespace: &str, name: &str, args: Vec<TypeRef>) -> Self {
        Self::Named {
            namespace: namespace.to_string(),
            name: name.to_string(),
            args,
        }
    }

    /// A non-generic type in the `System` namespace
    pub fn system(name: &str) -> Self {
        Self::named("System", name, Vec::new())
    }

    pub fn array(element: TypeRef) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn from_keyword(kind: CsSyntaxKind) -> Option<Self> {
        if kind == CsSyntaxKind::VoidKw {
            return Some(Self::Void);
        }
        KEYWORD_TYPES
            .iter()
            .find(|(k, _, _)| *k == kind)
            .map(|(_, _, name)| Self::system(name))
    }

    /// Keyword spelling for predefined types, e.g. `int` for `System.Int32`
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Named {
                namespace,
                name,
                args,
            } if namespace == "System" && args.is_empty() => KEYWORD_TYPES
                .iter()
                .find(|(_, _, n)| *n == name.as_str())
                .map(|(_, keyword, _)| *keyword),
            Self::Void => Some("void"),
            _ => None,
        }
    }

    /// Namespace-qualified name without type arguments
    pub fn full_name(&self) -> Option<String> {
        match self {
            Self::Named {
                namespace, name, ..
            } if namespace.is_empty() => Some(name.clone()),
            Self::Named {
                namespace, name, ..
            } => Some(format!("{namespace}.{name}")),
            _ => None,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Named { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    /// True for a named type with the given namespace and name, any arity
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        matches!(self, Self::Named { namespace: ns, name: n, .. } if ns == namespace && n == name)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            Self::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// `System.Action` or `System.Func` of any arity
    pub fn is_delegate(&self) -> bool {
        self.is("System", "Action") || self.is("System", "Func")
    }

    pub fn has_params(&self) -> bool {
        match self {
            Self::Param(_) => true,
            Self::Array(element) => element.has_params(),
            Self::Named { args, .. } => args.iter().any(TypeRef::has_params),
            Self::Void => false,
        }
    }

    pub fn substitute(&self, map: &Substitution) -> TypeRef {
        match self {
            Self::Param(name) => map.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Array(element) => Self::array(element.substitute(map)),
            Self::Named {
                namespace,
                name,
                args,
            } => Self::Named {
                namespace: namespace.clone(),
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(map)).collect(),
            },
            Self::Void => Self::Void,
        }
    }

    /// Source spelling, e.g. `int[]` or `List<int>`
    pub fn display_name(&self) -> String {
        if let Some(keyword) = self.keyword() {
            return keyword.to_string();
        }
        match self {
            Self::Named { name, args, .. } if args.is_empty() => name.clone(),
            Self::Named { name, args, .. } => {
                let args: Vec<String> = args.iter().map(TypeRef::display_name).collect();
                format!("{name}<{}>", args.join(", "))
            }
            Self::Array(element) => format!("{}[]", element.display_name()),
            Self::Param(name) => name.clone(),
            Self::Void => "void".to_string(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Match `pattern` against `actual`, binding type parameters into `map`
///
/// A parameter that is already bound must match its binding exactly.
pub fn unify(pattern: &TypeRef, actual: &TypeRef, map: &mut Substitution) -> bool {
    match (pattern, actual) {
        (TypeRef::Param(name), _) => match map.get(name) {
            Some(bound) => bound == actual,
            None => {
                map.insert(name.clone(), actual.clone());
                true
            }
        },
        (TypeRef::Array(p), TypeRef::Array(a)) => unify(p, a, map),
        (
            TypeRef::Named {
                namespace: pn,
                name: pname,
                args: pargs,
            },
            TypeRef::Named {
                namespace: an,
                name: aname,
                args: aargs,
            },
        ) => {
            pn == an
                && pname == aname
                && pargs.len() == aargs.len()
                && pargs.iter().zip(aargs).all(|(p, a)| unify(p, a, map))
        }
        _ => pattern == actual,
    }
}
