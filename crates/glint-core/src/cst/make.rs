//! Node factory
//!
//! Composite syntax is produced by parsing a small text fragment, which keeps
//! the factory and the parser in agreement about tree shape. Single tokens
//! and trivia are built directly.

use rowan::{GreenNode, GreenToken, NodeOrToken};
use tracing::warn;

use super::parser::{FragmentKind, parse_fragment, parse_source};
use super::trivia::Trivia;
use super::{CsSyntaxKind, GreenElement, SyntaxNode};

pub fn token(kind: CsSyntaxKind, text: &str) -> GreenToken {
    GreenToken::new(kind.into(), text)
}

pub fn ident(name: &str) -> GreenToken {
    token(CsSyntaxKind::Ident, name)
}

/// Token of a fixed-spelling kind such as `;` or `out`
pub fn punct(kind: CsSyntaxKind) -> GreenToken {
    token(kind, kind.static_text().unwrap_or_default())
}

pub fn trivia(pieces: &[Trivia]) -> Vec<GreenElement> {
    pieces
        .iter()
        .map(|t| NodeOrToken::Token(t.to_green()))
        .collect()
}

pub fn node(kind: CsSyntaxKind, children: Vec<GreenElement>) -> GreenNode {
    GreenNode::new(kind.into(), children)
}

/// `NameRef` for a bare identifier
pub fn name_ref(name: &str) -> GreenNode {
    node(CsSyntaxKind::NameRef, vec![NodeOrToken::Token(ident(name))])
}

fn fragment(text: &str, kind: FragmentKind) -> GreenNode {
    let (green, errors) = parse_fragment(text, kind);
    if !errors.is_empty() {
        warn!(fragment = text, ?errors, "Node factory produced syntax errors");
    }
    debug_assert!(errors.is_empty(), "invalid {kind:?} fragment `{text}`: {errors:?}");
    green
}

/// Parse an expression fragment such as `[1, ..xs]`
pub fn expr(text: &str) -> GreenNode {
    fragment(text, FragmentKind::Expression)
}

/// Parse a statement fragment, trivia included
pub fn stmt(text: &str) -> GreenNode {
    fragment(text, FragmentKind::Statement)
}

/// Parse a type fragment such as `List<int>`
pub fn ty(text: &str) -> GreenNode {
    fragment(text, FragmentKind::Type)
}

/// `using <namespace>;` followed by a newline
pub fn using_directive(namespace: &str) -> Option<GreenNode> {
    let (green, errors) = parse_source(&format!("using {namespace};\n"));
    if !errors.is_empty() {
        warn!(namespace, ?errors, "Invalid namespace for using directive");
        return None;
    }
    SyntaxNode::new_root(green)
        .first_child()
        .filter(|n| n.kind() == CsSyntaxKind::UsingDirective)
        .map(|n| n.green().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_fragment() {
        let green = expr("xs.Append(1)");
        let node = SyntaxNode::new_root(green);
        assert_eq!(node.kind(), CsSyntaxKind::Invocation);
        assert_eq!(node.text().to_string(), "xs.Append(1)");
    }

    #[test]
    fn test_statement_fragment_keeps_trivia() {
        let node = SyntaxNode::new_root(stmt("    foreach (var x in xs)\n    {\n        F(x);\n    }\n"));
        assert_eq!(node.kind(), CsSyntaxKind::ForeachStmt);
        assert_eq!(
            node.text().to_string(),
            "    foreach (var x in xs)\n    {\n        F(x);\n    }\n"
        );
    }

    #[test]
    fn test_using_directive() {
        let node = SyntaxNode::new_root(using_directive("System.Collections.Generic").unwrap());
        assert_eq!(node.text().to_string(), "using System.Collections.Generic;\n");
    }

    #[test]
    fn test_tokens() {
        assert_eq!(punct(CsSyntaxKind::Semicolon).text(), ";");
        assert_eq!(u32::from(name_ref("_").text_len()), 1);
    }
}
