//! `Append`/`Prepend`/`Concat` chains materialized into a collection
//!
//! ```text
//! var all = xs.Append(2).Prepend(3).Concat(ys).ToArray();
//! int[] all = [3, ..xs, 2, ..ys];
//! ```
//!
//! Only chains passed as an argument or used as a local initializer are
//! rewritten; elsewhere the literal may not have a target type. A `var`
//! declaration gets the materialized type spelled out, and its namespace
//! imported when it is not yet.

use glint_core::cst::ast::{
    Arg, AstNode, CompilationUnit, Expr, Invocation, LocalDecl, Stmt, VarDeclarator,
};
use glint_core::cst::surgeon::{Edit, apply_edits};
use glint_core::cst::trivia::{indentation, node_leading_trivia, trimmed_text};
use glint_core::cst::{CsSyntaxKind, GreenNode, make};
use glint_core::{
    Diagnostic, MethodSymbol, Payload, PropertyBag, RuleCategory, SemanticFacts, Severity,
    SyntaxNode, SyntaxTree,
};

use crate::call_matcher::{WellKnownMethod, linq, match_any};
use crate::chain::{Layout, LinkKind, SyntaxChain, render_collection};
use crate::policies::{ensure_using_directives, in_slot};
use crate::rule::{FixOutcome, Rule, RuleMatch, find_node};

pub const VERBOSE_LINQ_CHAIN: &str = "GL2001";

pub const RULE: Rule = Rule {
    id: VERBOSE_LINQ_CHAIN,
    name: "verbose-linq-chain",
    title: "Simplify LINQ chain",
    message: "Replace a verbose LINQ chain with a collection expression",
    category: RuleCategory::Style,
    default_severity: Severity::Info,
    enabled_by_default: true,
    node_kinds: &[CsSyntaxKind::Invocation],
    matcher: check,
    fixer: Some(fix),
    sample: SAMPLE,
    sample_fixed: Some(SAMPLE_FIXED),
};

const SAMPLE: &str = r#"using System.Linq;

namespace Tests;
class Test
{
    static int[] array1 = [0, 1];
    static int[] array2 = [5];
    void Do()
    {
        var array3 = [|array1.Append(2).Prepend(3).Concat(array2).ToArray()|];
    }
}
"#;

const SAMPLE_FIXED: &str = r#"using System.Linq;

namespace Tests;
class Test
{
    static int[] array1 = [0, 1];
    static int[] array2 = [5];
    void Do()
    {
        int[] array3 = [3, ..array1, 2, ..array2];
    }
}
"#;

/// What the fix needs beyond the span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRewrite {
    /// Links that become elements, counted from the materializing call
    pub links: usize,
    /// Replacement for a `var` declaration type
    pub explicit_type: Option<String>,
    /// Namespace of `explicit_type` that is not imported yet
    pub import: Option<String>,
}

impl Payload for ChainRewrite {
    fn encode(&self, bag: &mut PropertyBag) {
        bag.insert("links", self.links.to_string());
        if let Some(ty) = &self.explicit_type {
            bag.insert("explicitType", ty.clone());
        }
        if let Some(namespace) = &self.import {
            bag.insert("import", namespace.clone());
        }
    }

    fn decode(bag: &PropertyBag) -> Option<Self> {
        Some(Self {
            links: bag.get_parsed("links")?,
            explicit_type: bag.get("explicitType").map(str::to_string),
            import: bag.get("import").map(str::to_string),
        })
    }
}

/// Where the materializing call sits
enum Site {
    Argument,
    Initializer(LocalDecl),
}

impl Site {
    fn of(call: &SyntaxNode) -> Option<Self> {
        let parent = call.parent()?;
        if let Some(arg) = Arg::cast(parent.clone()) {
            let list = parent.parent()?;
            let owner = list.parent()?;
            return (arg.ref_kind().is_none()
                && list.kind() == CsSyntaxKind::ArgList
                && owner.kind() == CsSyntaxKind::Invocation)
                .then_some(Self::Argument);
        }
        let declarator = VarDeclarator::cast(parent)?;
        if declarator.initializer()?.syntax() != call {
            return None;
        }
        LocalDecl::cast(declarator.syntax().parent()?).map(Self::Initializer)
    }
}

fn link_method(kind: LinkKind) -> WellKnownMethod {
    match kind {
        LinkKind::Append => linq::APPEND,
        LinkKind::Prepend => linq::PREPEND,
        LinkKind::Concat => linq::CONCAT,
    }
}

fn check(node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<RuleMatch> {
    let call = Invocation::cast(node.clone())?;
    let method = match_any(&call, facts, linq::MATERIALIZE)?;
    let site = Site::of(node)?;

    // Links below a call that is not the library method stay in the receiver
    let chain = SyntaxChain::collect(call.receiver()?)?;
    let bound = chain
        .links
        .iter()
        .take_while(|link| link_method(link.kind).matches(&link.call, facts))
        .count();
    let chain = chain.truncate(bound)?;

    let (explicit_type, import) = match site {
        Site::Initializer(declaration) if declaration.ty()?.is_var() => {
            if declaration.declarators().count() != 1 {
                return None;
            }
            spelled_type(node, &method)?
        }
        _ => (None, None),
    };
    let payload = ChainRewrite {
        links: chain.len(),
        explicit_type,
        import,
    };
    Some(RuleMatch::node(node).with_payload(&payload))
}

/// Source spelling of the materialized type, and its namespace if the file
/// does not import it
fn spelled_type(
    node: &SyntaxNode,
    method: &MethodSymbol,
) -> Option<(Option<String>, Option<String>)> {
    let ty = &method.return_type;
    if ty.has_params() {
        return None;
    }
    let unit = node.ancestors().find_map(CompilationUnit::cast)?;
    let import = ty
        .namespace()
        .filter(|ns| !ns.is_empty() && *ns != "System")
        .filter(|ns| !unit.usings().any(|u| u.name().as_deref() == Some(*ns)))
        .map(str::to_string);
    Some((Some(ty.display_name()), import))
}

fn fix(tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
    FixOutcome::from_green(rewrite(tree, diagnostic))
}

fn rewrite(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<GreenNode> {
    let payload: ChainRewrite = diagnostic.payload()?;
    let root = tree.root();
    let node = find_node(&root, diagnostic.span, CsSyntaxKind::Invocation)?;
    let call = Invocation::cast(node.clone())?;
    let materialize = call.method_name()?;
    if !matches!(materialize.as_str(), "ToArray" | "ToList" | "ToHashSet")
        || !call.args().is_empty()
    {
        return None;
    }
    let chain = SyntaxChain::collect(call.receiver()?)?.truncate(payload.links)?;

    let statement = node.ancestors().find_map(Stmt::cast)?;
    let layout = Layout {
        continuation_indent: chain.continuation_indent(),
        closing_indent: indentation(&node_leading_trivia(statement.syntax())),
    };
    let literal = render_collection(
        &chain.elements(),
        |expr: &Expr| trimmed_text(expr.syntax()),
        &layout,
    );
    let mut edits = vec![Edit::replace(&node, in_slot(&make::expr(&literal), &node))];

    if let Some(ty) = &payload.explicit_type {
        let declared = VarDeclarator::cast(node.parent()?)?.declared_type()?;
        if !declared.is_var() {
            return None;
        }
        edits.push(Edit::replace(
            declared.syntax(),
            in_slot(&make::ty(ty), declared.syntax()),
        ));
    }
    let green = apply_edits(&root, edits)?;

    match &payload.import {
        Some(namespace) => ensure_using_directives(&SyntaxNode::new_root(green), &[namespace]),
        None => Some(green),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::testing::{fixed, flagged, source};

    const USINGS: &str = "using System;\nusing System.Linq;\n";
    const SIGNATURE: &str = "void M(int[] first, int[] second)";

    #[test]
    fn test_payload_round_trip() {
        let payload = ChainRewrite {
            links: 3,
            explicit_type: Some("List<int>".to_string()),
            import: None,
        };
        let mut bag = PropertyBag::new();
        payload.encode(&mut bag);
        assert_eq!(bag.get("links"), Some("3"));
        assert_eq!(bag.get("import"), None);
        assert_eq!(ChainRewrite::decode(&bag), Some(payload));
        assert_eq!(ChainRewrite::decode(&PropertyBag::new()), None);
    }

    #[test]
    fn test_flags_argument_and_initializer_only() {
        let text = format!(
            "{USINGS}\nclass C\n{{\n    void Use(int[] values) {{ }}\n\n    int[] M(int[] first)\n    {{\n        Use(first.Append(1).ToArray());\n        int[] a = first.Prepend(0).ToArray();\n        var b = first.ToArray();\n        return first.Append(2).ToArray();\n    }}\n}}\n"
        );
        assert_eq!(
            flagged(RULE, &text),
            ["first.Append(1).ToArray()", "first.Prepend(0).ToArray()"]
        );
    }

    #[test]
    fn test_comparer_overload_is_not_materialize() {
        let usings = "using System;\nusing System.Collections.Generic;\nusing System.Linq;\n";
        let text = source(
            usings,
            "void M(int[] first, IEqualityComparer<int> comparer)",
            "var set = first.Append(1).ToHashSet(comparer);",
        );
        assert!(flagged(RULE, &text).is_empty());
    }

    #[test]
    fn test_repeated_prepends() {
        let text = source(USINGS, SIGNATURE, "var all = first.Prepend(1).Prepend(2).ToArray();");
        assert_eq!(
            fixed(RULE, &text),
            source(USINGS, SIGNATURE, "int[] all = [2, 1, ..first];")
        );
    }

    #[test]
    fn test_var_list_adds_import() {
        let text = source(
            USINGS,
            "void M(int[] first)",
            "var all = first.Concat(first).Append(3).ToList();",
        );
        assert_eq!(
            fixed(RULE, &text),
            source(
                "using System;\nusing System.Linq;\nusing System.Collections.Generic;\n",
                "void M(int[] first)",
                "List<int> all = [..first, ..first, 3];"
            )
        );
    }

    #[test]
    fn test_multiline_chain_keeps_line_breaks() {
        let text = source(
            USINGS,
            SIGNATURE,
            "int[] all = first\n            .Append(1) // one\n            .Concat(second)\n            .ToArray();",
        );
        assert_eq!(
            fixed(RULE, &text),
            source(
                USINGS,
                SIGNATURE,
                "int[] all = [..first,\n            1, // one\n            ..second];"
            )
        );
    }
}
