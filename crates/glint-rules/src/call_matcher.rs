//! Symbol-bound call matching
//!
//! A call matches a [`WellKnownMethod`] only when its resolved symbol has the
//! expected containing namespace, type and defining library, and was reached
//! the expected way: extension methods must appear in reduced form
//! (`xs.ToList()`, not `Enumerable.ToList(xs)`), instance methods must be
//! non-static members of the type itself. A method of the same name declared
//! anywhere else never matches, and neither does a call that does not
//! resolve.
//!
//! Overload-sensitive rules state which overloads they accept with an
//! [`OverloadFilter`] instead of checking parameters themselves.

use glint_core::cst::ast::{AstNode, Expr, Invocation};
use glint_core::semantic::{MethodKind, SYSTEM_COLLECTIONS, SYSTEM_LINQ};
use glint_core::{MethodSymbol, SemanticFacts, SyntaxNode};

/// How the method is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Static extension method called with receiver syntax
    Extension,
    /// Instance method of the containing type
    Instance,
}

/// Which overloads of a method qualify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadFilter {
    Any,
    /// Exactly this many explicit arguments, receiver not counted
    Arity(usize),
    /// No parameter of the given type, e.g. a comparer
    Excluding(&'static str),
}

impl OverloadFilter {
    pub fn accepts(self, method: &MethodSymbol) -> bool {
        match self {
            Self::Any => true,
            Self::Arity(count) => method.parameters.len() == count,
            Self::Excluding(full_name) => !method
                .parameters
                .iter()
                .any(|p| p.ty.full_name().as_deref() == Some(full_name)),
        }
    }
}

/// A library method identified by where it is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownMethod {
    pub namespace: &'static str,
    pub type_name: &'static str,
    /// Identity of the defining library
    pub library: &'static str,
    pub name: &'static str,
    pub dispatch: Dispatch,
    pub overloads: OverloadFilter,
}

impl WellKnownMethod {
    pub const fn extension(
        namespace: &'static str,
        type_name: &'static str,
        library: &'static str,
        name: &'static str,
    ) -> Self {
        Self {
            namespace,
            type_name,
            library,
            name,
            dispatch: Dispatch::Extension,
            overloads: OverloadFilter::Any,
        }
    }

    pub const fn instance(
        namespace: &'static str,
        type_name: &'static str,
        library: &'static str,
        name: &'static str,
    ) -> Self {
        Self {
            namespace,
            type_name,
            library,
            name,
            dispatch: Dispatch::Instance,
            overloads: OverloadFilter::Any,
        }
    }

    pub const fn with_overloads(mut self, overloads: OverloadFilter) -> Self {
        self.overloads = overloads;
        self
    }

    pub fn matches_symbol(&self, method: &MethodSymbol) -> bool {
        if method.name != self.name
            || method.containing_namespace != self.namespace
            || method.containing_type != self.type_name
            || method.origin.library() != Some(self.library)
        {
            return false;
        }
        let dispatch_ok = match self.dispatch {
            Dispatch::Extension => method.kind == MethodKind::ReducedExtension,
            Dispatch::Instance => method.kind == MethodKind::Ordinary && !method.is_static,
        };
        dispatch_ok && self.overloads.accepts(method)
    }

    /// Resolve `call` and compare; unresolved calls never match
    pub fn matches(&self, call: &Invocation, facts: &dyn SemanticFacts) -> bool {
        // Cheap syntactic check before asking for the symbol
        if call.method_name().as_deref() != Some(self.name) {
            return false;
        }
        facts
            .resolve_invocation(call)
            .is_some_and(|method| self.matches_symbol(&method))
    }
}

/// Resolved symbol of `call` if it is one of `candidates`
pub fn match_any(
    call: &Invocation,
    facts: &dyn SemanticFacts,
    candidates: &[WellKnownMethod],
) -> Option<MethodSymbol> {
    let name = call.method_name()?;
    if !candidates.iter().any(|c| c.name == name) {
        return None;
    }
    let method = facts.resolve_invocation(call)?;
    candidates
        .iter()
        .any(|c| c.matches_symbol(&method))
        .then_some(method)
}

/// `System.Linq.Enumerable` extension methods
pub mod linq {
    use super::*;

    const fn enumerable(name: &'static str) -> WellKnownMethod {
        WellKnownMethod::extension(SYSTEM_LINQ, "Enumerable", SYSTEM_LINQ, name)
    }

    pub const TO_ARRAY: WellKnownMethod = enumerable("ToArray");
    pub const TO_LIST: WellKnownMethod = enumerable("ToList");
    pub const TO_HASH_SET: WellKnownMethod =
        enumerable("ToHashSet").with_overloads(OverloadFilter::Arity(0));
    pub const APPEND: WellKnownMethod = enumerable("Append");
    pub const PREPEND: WellKnownMethod = enumerable("Prepend");
    pub const CONCAT: WellKnownMethod = enumerable("Concat");
    /// Only the overload without an equality comparer
    pub const DISTINCT: WellKnownMethod = enumerable("Distinct").with_overloads(
        OverloadFilter::Excluding("System.Collections.Generic.IEqualityComparer"),
    );

    /// Calls that force a sequence into a stored collection
    pub const MATERIALIZE: &[WellKnownMethod] = &[TO_ARRAY, TO_LIST, TO_HASH_SET];

    /// Any `Enumerable` method called as an extension
    pub fn is_linq_extension(method: &MethodSymbol) -> bool {
        method.kind == MethodKind::ReducedExtension
            && method.containing_namespace == SYSTEM_LINQ
            && method.containing_type == "Enumerable"
            && method.origin.library() == Some(SYSTEM_LINQ)
    }
}

/// `List<T>.ForEach`
pub const LIST_FOR_EACH: WellKnownMethod = WellKnownMethod::instance(
    "System.Collections.Generic",
    "List",
    SYSTEM_COLLECTIONS,
    "ForEach",
);

/// Whether the static type of `expr` is a queryable sequence
///
/// Materializing a query changes where it runs, so rules leave those alone.
pub fn is_queryable(expr: &Expr, facts: &dyn SemanticFacts) -> bool {
    facts
        .type_of(expr)
        .is_some_and(|ty| facts.implements(&ty, "System.Linq.IQueryable"))
}

/// The invocation whose callee is the member access `node` belongs to
///
/// For `xs.ToList().Where(f)` and the `xs.ToList()` node this is the
/// `Where` call.
pub fn outer_call(node: &SyntaxNode) -> Option<Invocation> {
    let access = node.parent()?;
    if access.kind() != glint_core::CsSyntaxKind::MemberAccess {
        return None;
    }
    let call = Invocation::cast(access.parent()?)?;
    call.callee()
        .is_some_and(|c| c.syntax() == &access)
        .then_some(call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{Compilation, SyntaxTree};

    const USINGS: &str = "using System;\nusing System.Collections.Generic;\nusing System.Linq;\n";

    fn compile(usings: &str, body: &str) -> (SyntaxTree, Compilation) {
        let source = format!(
            "{usings}\nclass C\n{{\n    void M(int[] numbers, List<int> list, IEqualityComparer<int> comparer)\n    {{\n        {body}\n    }}\n}}\n"
        );
        let tree = SyntaxTree::parse(&source);
        assert!(!tree.has_errors(), "{:?}", tree.errors());
        let compilation = Compilation::new(&tree);
        (tree, compilation)
    }

    fn calls(tree: &SyntaxTree, name: &str) -> Vec<Invocation> {
        tree.root()
            .descendants()
            .filter_map(Invocation::cast)
            .filter(|c| c.method_name().as_deref() == Some(name))
            .collect()
    }

    #[test]
    fn test_reduced_extension_matches() {
        let (tree, facts) = compile(USINGS, "var xs = numbers.ToList();");
        let call = &calls(&tree, "ToList")[0];
        assert!(linq::TO_LIST.matches(call, &facts));
        assert!(!linq::TO_ARRAY.matches(call, &facts));
    }

    #[test]
    fn test_unresolved_call_never_matches() {
        // without `using System.Linq` the extension is not visible
        let (tree, facts) = compile("using System.Collections.Generic;\n", "var xs = numbers.ToList();");
        assert!(!linq::TO_LIST.matches(&calls(&tree, "ToList")[0], &facts));
    }

    #[test]
    fn test_source_shadow_does_not_match() {
        let source = format!(
            "{USINGS}\nnamespace App\n{{\n    static class Ext\n    {{\n        public static List<T> ToList<T>(this IEnumerable<T> source);\n    }}\n\n    class C\n    {{\n        void M(int[] numbers)\n        {{\n            var xs = numbers.ToList();\n        }}\n    }}\n}}\n"
        );
        let tree = SyntaxTree::parse(&source);
        let facts = Compilation::new(&tree);
        assert!(!linq::TO_LIST.matches(&calls(&tree, "ToList")[0], &facts));
    }

    #[test]
    fn test_instance_dispatch() {
        let (tree, facts) = compile(USINGS, "list.ForEach(x => Console.WriteLine(x));");
        assert!(LIST_FOR_EACH.matches(&calls(&tree, "ForEach")[0], &facts));

        let (tree, facts) = compile(USINGS, "var a = list.ToArray();");
        let to_array = &calls(&tree, "ToArray")[0];
        // List<T>.ToArray is an instance method, not the extension
        assert!(!linq::TO_ARRAY.matches(to_array, &facts));
    }

    #[test]
    fn test_overload_filter_excludes_comparer() {
        let (tree, facts) = compile(
            USINGS,
            "var a = numbers.Distinct().ToList();\n        var b = numbers.Distinct(comparer).ToList();",
        );
        let distinct = calls(&tree, "Distinct");
        assert!(linq::DISTINCT.matches(&distinct[0], &facts));
        assert!(!linq::DISTINCT.matches(&distinct[1], &facts));
    }

    #[test]
    fn test_match_any_returns_symbol() {
        let (tree, facts) = compile(USINGS, "var s = numbers.ToHashSet();");
        let method = match_any(&calls(&tree, "ToHashSet")[0], &facts, linq::MATERIALIZE).unwrap();
        assert!(method.return_type.is("System.Collections.Generic", "HashSet"));
        assert!(linq::is_linq_extension(&method));
    }

    #[test]
    fn test_queryable_receiver() {
        let (tree, facts) = compile(USINGS, "var q = numbers.AsQueryable().ToList();");
        let receiver = calls(&tree, "ToList")[0].receiver().unwrap();
        assert!(is_queryable(&receiver, &facts));
        let plain = calls(&tree, "AsQueryable")[0].receiver().unwrap();
        assert!(!is_queryable(&plain, &facts));
    }

    #[test]
    fn test_outer_call() {
        let (tree, _) = compile(USINGS, "var xs = numbers.ToList().Where(x => x > 1);");
        let to_list = &calls(&tree, "ToList")[0];
        let outer = outer_call(to_list.syntax()).unwrap();
        assert_eq!(outer.method_name().as_deref(), Some("Where"));
        assert!(outer_call(outer.syntax()).is_none());
    }
}
