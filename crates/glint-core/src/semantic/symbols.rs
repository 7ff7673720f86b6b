//! Symbols produced by name and call resolution

use rowan::TextRange;

use super::TypeRef;

/// Where a declaration comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Declared in the analyzed source
    Source,
    /// Declared in a reference library, identified by name
    Library(String),
}

impl Origin {
    pub fn library(&self) -> Option<&str> {
        match self {
            Self::Library(name) => Some(name),
            Self::Source => None,
        }
    }
}

/// How a method symbol was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Ordinary,
    /// An extension method invoked with receiver syntax; the receiver
    /// parameter is moved to [`MethodSymbol::this_parameter`]
    ReducedExtension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Value,
    Out,
    Ref,
    In,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: TypeRef,
    pub ref_kind: RefKind,
}

/// A resolved method with type arguments substituted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSymbol {
    pub name: String,
    pub containing_namespace: String,
    pub containing_type: String,
    pub origin: Origin,
    pub kind: MethodKind,
    pub is_static: bool,
    pub is_extension: bool,
    pub type_params: Vec<String>,
    pub type_args: Vec<TypeRef>,
    pub this_parameter: Option<ParameterSymbol>,
    pub parameters: Vec<ParameterSymbol>,
    pub return_type: TypeRef,
}

impl MethodSymbol {
    /// Namespace-qualified name of the containing type
    pub fn containing_type_full_name(&self) -> String {
        if self.containing_namespace.is_empty() {
            self.containing_type.clone()
        } else {
            format!("{}.{}", self.containing_namespace, self.containing_type)
        }
    }

    /// Parameters including the receiver of a reduced extension
    pub fn all_parameters(&self) -> impl Iterator<Item = &ParameterSymbol> {
        self.this_parameter.iter().chain(&self.parameters)
    }

    /// `Namespace.Type.Name<Args>(ParamTypes)`
    pub fn display(&self) -> String {
        let args = if self.type_args.is_empty() {
            String::new()
        } else {
            let args: Vec<String> = self.type_args.iter().map(TypeRef::display_name).collect();
            format!("<{}>", args.join(", "))
        };
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| p.ty.display_name())
            .collect();
        format!(
            "{}.{}{args}({})",
            self.containing_type_full_name(),
            self.name,
            params.join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    Local,
    /// Declared inline in an `out` argument
    OutVariable,
    Parameter,
    ForeachVariable,
    LambdaParameter,
    /// Field or property of the enclosing type
    Field,
}

/// A named value visible at some point in a method body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalSymbol {
    pub name: String,
    /// Range of the declaring identifier
    pub declared_at: TextRange,
    pub ty: Option<TypeRef>,
    pub kind: LocalKind,
}
