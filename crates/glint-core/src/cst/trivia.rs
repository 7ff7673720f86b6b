//! Trivia handling
//!
//! Trivia (whitespace, newlines and comments) lives in the tree as sibling
//! tokens. Ownership follows one rule, established by the parser:
//!
//! - A token's **trailing** trivia is the trivia after it, on the same line,
//!   up to and including the first newline.
//! - Everything else before a token is its **leading** trivia.
//!
//! # Example
//!
//! ```text
//! var x = a; // note
//!     .Skip(1);
//! ```
//!
//! `;` owns ` // note\n` as trailing trivia, `.` owns the four spaces as
//! leading trivia.
//!
//! The functions here compute those views on red tokens and nodes, and
//! rebuild green nodes with different boundary trivia.

use rowan::{GreenNode, GreenNodeData, GreenToken, GreenTokenData, Language, NodeOrToken, TextRange};

use super::{CsLanguage, CsSyntaxKind, GreenElement, SyntaxElement, SyntaxNode, SyntaxToken};

/// Kind of a trivia piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    Newline,
    Comment,
}

/// A single piece of trivia
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl Trivia {
    pub fn whitespace(text: impl Into<String>) -> Self {
        Self {
            kind: TriviaKind::Whitespace,
            text: text.into(),
        }
    }

    pub fn newline() -> Self {
        Self {
            kind: TriviaKind::Newline,
            text: "\n".to_string(),
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            kind: TriviaKind::Comment,
            text: text.into(),
        }
    }

    fn from_kind(kind: CsSyntaxKind, text: &str) -> Option<Self> {
        let kind = match kind {
            CsSyntaxKind::Whitespace => TriviaKind::Whitespace,
            CsSyntaxKind::Newline => TriviaKind::Newline,
            CsSyntaxKind::LineComment | CsSyntaxKind::BlockComment => TriviaKind::Comment,
            _ => return None,
        };
        Some(Self {
            kind,
            text: text.to_string(),
        })
    }

    /// Convert a red trivia token; `None` for significant tokens
    pub fn from_token(token: &SyntaxToken) -> Option<Self> {
        Self::from_kind(token.kind(), token.text())
    }

    fn from_green(token: &GreenTokenData) -> Option<Self> {
        Self::from_kind(raw_kind(token.kind()), token.text())
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TriviaKind::Comment
    }

    pub fn is_line_comment(&self) -> bool {
        self.is_comment() && self.text.starts_with("//")
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TriviaKind::Whitespace
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TriviaKind::Newline
    }

    pub fn syntax_kind(&self) -> CsSyntaxKind {
        match self.kind {
            TriviaKind::Whitespace => CsSyntaxKind::Whitespace,
            TriviaKind::Newline => CsSyntaxKind::Newline,
            TriviaKind::Comment if self.text.starts_with("//") => CsSyntaxKind::LineComment,
            TriviaKind::Comment => CsSyntaxKind::BlockComment,
        }
    }

    pub fn to_green(&self) -> GreenToken {
        GreenToken::new(self.syntax_kind().into(), &self.text)
    }
}

/// Concatenated text of a trivia list
pub fn render(trivia: &[Trivia]) -> String {
    trivia.iter().map(|t| t.text.as_str()).collect()
}

pub fn contains_comment(trivia: &[Trivia]) -> bool {
    trivia.iter().any(Trivia::is_comment)
}

pub fn contains_newline(trivia: &[Trivia]) -> bool {
    trivia.iter().any(Trivia::is_newline)
}

/// Drop whitespace pieces from the start of the list
pub fn trim_start_whitespace(trivia: &[Trivia]) -> Vec<Trivia> {
    let start = trivia
        .iter()
        .position(|t| !t.is_whitespace())
        .unwrap_or(trivia.len());
    trivia[start..].to_vec()
}

/// Drop whitespace pieces from the end of the list
pub fn trim_end_whitespace(trivia: &[Trivia]) -> Vec<Trivia> {
    let end = trivia
        .iter()
        .rposition(|t| !t.is_whitespace())
        .map_or(0, |i| i + 1);
    trivia[..end].to_vec()
}

/// Whitespace following the last newline, i.e. the indentation of the line
/// the trivia ends on
pub fn indentation(trivia: &[Trivia]) -> String {
    let start = trivia
        .iter()
        .rposition(Trivia::is_newline)
        .map_or(0, |i| i + 1);
    trivia[start..]
        .iter()
        .take_while(|t| t.is_whitespace())
        .map(|t| t.text.as_str())
        .collect()
}

pub(crate) fn raw_kind(raw: rowan::SyntaxKind) -> CsSyntaxKind {
    CsLanguage::kind_from_raw(raw)
}

// ============================================================================
// Red tree views
// ============================================================================

/// Trivia tokens owned by `token` as leading trivia
pub fn leading_trivia_tokens(token: &SyntaxToken) -> Vec<SyntaxToken> {
    let mut run = Vec::new();
    let mut bounded_by_token = false;
    let mut prev = token.prev_sibling_or_token();
    while let Some(element) = prev {
        match element {
            NodeOrToken::Token(t) if t.kind().is_trivia() => {
                prev = t.prev_sibling_or_token();
                run.push(t);
            }
            NodeOrToken::Token(_) => {
                bounded_by_token = true;
                break;
            }
            NodeOrToken::Node(_) => break,
        }
    }
    run.reverse();
    if bounded_by_token {
        // the previous token owns everything up to its first newline
        match run.iter().position(|t| t.kind() == CsSyntaxKind::Newline) {
            Some(newline) => {
                run.drain(..=newline);
            }
            None => run.clear(),
        }
    }
    run
}

/// Trivia tokens owned by `token` as trailing trivia
pub fn trailing_trivia_tokens(token: &SyntaxToken) -> Vec<SyntaxToken> {
    let mut run = Vec::new();
    let mut next = token.next_sibling_or_token();
    while let Some(NodeOrToken::Token(t)) = next {
        if !t.kind().is_trivia() {
            break;
        }
        next = t.next_sibling_or_token();
        let newline = t.kind() == CsSyntaxKind::Newline;
        run.push(t);
        if newline {
            break;
        }
    }
    run
}

pub fn leading_trivia(token: &SyntaxToken) -> Vec<Trivia> {
    leading_trivia_tokens(token)
        .iter()
        .filter_map(Trivia::from_token)
        .collect()
}

pub fn trailing_trivia(token: &SyntaxToken) -> Vec<Trivia> {
    trailing_trivia_tokens(token)
        .iter()
        .filter_map(Trivia::from_token)
        .collect()
}

/// First non-trivia token inside `node`
pub fn first_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(SyntaxElement::into_token)
        .find(|t| !t.kind().is_trivia())
}

/// Last non-trivia token inside `node`
pub fn last_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    let mut token = node.last_token()?;
    while token.kind().is_trivia() {
        token = token.prev_token()?;
        if !node.text_range().contains_range(token.text_range()) {
            return None;
        }
    }
    Some(token)
}

pub fn node_leading_trivia(node: &SyntaxNode) -> Vec<Trivia> {
    first_token(node)
        .map(|t| leading_trivia(&t))
        .unwrap_or_default()
}

pub fn node_trailing_trivia(node: &SyntaxNode) -> Vec<Trivia> {
    last_token(node)
        .map(|t| trailing_trivia(&t))
        .unwrap_or_default()
}

/// Range of `node` without its boundary trivia
pub fn significant_range(node: &SyntaxNode) -> TextRange {
    match (first_token(node), last_token(node)) {
        (Some(first), Some(last)) => {
            TextRange::new(first.text_range().start(), last.text_range().end())
        }
        _ => TextRange::empty(node.text_range().start()),
    }
}

/// Source text of `node` without its boundary trivia
pub fn trimmed_text(node: &SyntaxNode) -> String {
    let range = significant_range(node) - node.text_range().start();
    let text = node.text().to_string();
    text[range].to_string()
}

// ============================================================================
// Green tree rewriting
// ============================================================================

fn is_trivia_element(element: &GreenElement) -> bool {
    match element {
        NodeOrToken::Token(t) => raw_kind(t.kind()).is_trivia(),
        NodeOrToken::Node(_) => false,
    }
}

fn owned_children(node: &GreenNodeData) -> Vec<GreenElement> {
    node.children()
        .map(|child| match child {
            NodeOrToken::Node(n) => NodeOrToken::Node(n.to_owned()),
            NodeOrToken::Token(t) => NodeOrToken::Token(t.to_owned()),
        })
        .collect()
}

fn green_trivia(trivia: &[Trivia]) -> impl Iterator<Item = GreenElement> + '_ {
    trivia.iter().map(|t| NodeOrToken::Token(t.to_green()))
}

/// Leading trivia of the first significant token of a green node
pub fn green_leading_trivia(node: &GreenNodeData) -> Vec<Trivia> {
    let mut out = Vec::new();
    for child in node.children() {
        match child {
            NodeOrToken::Token(t) => match Trivia::from_green(t) {
                Some(trivia) => out.push(trivia),
                None => break,
            },
            NodeOrToken::Node(n) => {
                out.extend(green_leading_trivia(n));
                break;
            }
        }
    }
    out
}

/// Trailing trivia of the last significant token of a green node
pub fn green_trailing_trivia(node: &GreenNodeData) -> Vec<Trivia> {
    let children: Vec<_> = node.children().collect();
    let mut after = Vec::new();
    let mut inner = Vec::new();
    for child in children.iter().rev() {
        match child {
            NodeOrToken::Token(t) => match Trivia::from_green(t) {
                Some(trivia) => after.push(trivia),
                None => break,
            },
            NodeOrToken::Node(n) => {
                inner = green_trailing_trivia(n);
                break;
            }
        }
    }
    after.reverse();
    inner.extend(after);
    inner
}

/// Rebuild `node` with `trivia` as the leading trivia of its first token
pub fn with_leading_trivia(node: &GreenNodeData, trivia: &[Trivia]) -> GreenNode {
    let children = owned_children(node);
    let mut out: Vec<GreenElement> = Vec::with_capacity(children.len() + trivia.len());
    match children.iter().position(|c| !is_trivia_element(c)) {
        None => out.extend(green_trivia(trivia)),
        Some(i) => match &children[i] {
            NodeOrToken::Token(_) => {
                out.extend(green_trivia(trivia));
                out.extend(children[i..].iter().cloned());
            }
            NodeOrToken::Node(first) => {
                out.push(NodeOrToken::Node(with_leading_trivia(first, trivia)));
                out.extend(children[i + 1..].iter().cloned());
            }
        },
    }
    GreenNode::new(node.kind(), out)
}

/// Rebuild `node` with `trivia` as the trailing trivia of its last token
pub fn with_trailing_trivia(node: &GreenNodeData, trivia: &[Trivia]) -> GreenNode {
    let children = owned_children(node);
    let mut out: Vec<GreenElement> = Vec::with_capacity(children.len() + trivia.len());
    match children.iter().rposition(|c| !is_trivia_element(c)) {
        None => out.extend(green_trivia(trivia)),
        Some(i) => match &children[i] {
            NodeOrToken::Token(_) => {
                out.extend(children[..=i].iter().cloned());
                out.extend(green_trivia(trivia));
            }
            NodeOrToken::Node(last) => {
                out.extend(children[..i].iter().cloned());
                out.push(NodeOrToken::Node(with_trailing_trivia(last, trivia)));
            }
        },
    }
    GreenNode::new(node.kind(), out)
}

/// Rebuild `node` with no boundary trivia at all
pub fn without_trivia(node: &GreenNodeData) -> GreenNode {
    with_trailing_trivia(&with_leading_trivia(node, &[]), &[])
}

/// Green elements for a token surrounded by the given trivia
pub fn token_with_trivia(
    token: GreenToken,
    leading: &[Trivia],
    trailing: &[Trivia],
) -> Vec<GreenElement> {
    let mut out: Vec<GreenElement> = green_trivia(leading).collect();
    out.push(NodeOrToken::Token(token));
    out.extend(green_trivia(trailing));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_source;

    fn root(source: &str) -> SyntaxNode {
        SyntaxNode::new_root(parse_source(source).0)
    }

    fn token(root: &SyntaxNode, text: &str) -> SyntaxToken {
        root.descendants_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| t.text() == text)
            .unwrap()
    }

    #[test]
    fn test_trailing_trivia_ends_at_first_newline() {
        let root = root("class A\n{\n    int x = a; // note\n        // next\n    int y;\n}\n");
        let semi = token(&root, ";");
        assert_eq!(render(&trailing_trivia(&semi)), " // note\n");
        let int = root
            .descendants_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .filter(|t| t.text() == "int")
            .nth(1)
            .unwrap();
        assert_eq!(render(&leading_trivia(&int)), "        // next\n    ");
    }

    #[test]
    fn test_leading_trivia_after_token_sibling() {
        let root = root("class A { void M() { F(a, /* b */ b); } }");
        let b = root
            .descendants_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .filter(|t| t.text() == "b")
            .last()
            .unwrap();
        assert_eq!(render(&leading_trivia(&b)), "");
        let comma = token(&root, ",");
        assert_eq!(render(&trailing_trivia(&comma)), " /* b */ ");
        assert_eq!(render(&node_leading_trivia(&b.parent().unwrap())), "");
    }

    #[test]
    fn test_green_trivia_rewrite() {
        let root = root("class A { void M() { x = a /* one */ + b; } }");
        let binary = root
            .descendants()
            .find(|n| n.kind() == CsSyntaxKind::BinaryExpr)
            .unwrap();
        let green = binary.green();
        assert_eq!(render(&green_leading_trivia(&green)), "");
        assert_eq!(render(&green_trailing_trivia(&green)), "");
        let rebuilt = with_trailing_trivia(&with_leading_trivia(&green, &[]), &[Trivia::comment("/* end */")]);
        assert_eq!(SyntaxNode::new_root(rebuilt).text().to_string(), "a /* one */ + b/* end */");
        let stripped = SyntaxNode::new_root(without_trivia(&green));
        assert_eq!(stripped.text().to_string(), "a /* one */ + b");
    }

    #[test]
    fn test_trimmed_text_and_indentation() {
        let root = root("class A\n{\n    void M()\n    {\n        F(1); // x\n    }\n}\n");
        let stmt = root
            .descendants()
            .find(|n| n.kind() == CsSyntaxKind::ExprStmt)
            .unwrap();
        assert_eq!(trimmed_text(&stmt), "F(1);");
        assert_eq!(indentation(&node_leading_trivia(&stmt)), "        ");
        assert_eq!(render(&node_trailing_trivia(&stmt)), " // x\n");
    }

    #[test]
    fn test_trim_helpers() {
        let list = vec![
            Trivia::whitespace(" "),
            Trivia::comment("/* a */"),
            Trivia::whitespace("  "),
        ];
        assert_eq!(render(&trim_start_whitespace(&list)), "/* a */  ");
        assert_eq!(render(&trim_end_whitespace(&list)), " /* a */");
        assert!(contains_comment(&list));
        assert!(!contains_newline(&list));
    }
}
