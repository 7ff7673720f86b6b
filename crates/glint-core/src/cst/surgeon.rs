//! Structural tree edits
//!
//! Trees are immutable. Every operation takes red nodes of the current tree
//! and returns the green root of a new tree; untouched subtrees are shared
//! between the old and the new tree.
//!
//! Removing a node removes its whole text, trivia included, so deleting a
//! statement also deletes its indentation and line break.

use rowan::{GreenNode, GreenToken, NodeOrToken, TextRange};
use tracing::debug;

use super::trivia::{Trivia, leading_trivia_tokens, token_with_trivia, trailing_trivia_tokens};
use super::{CsSyntaxKind, GreenElement, SyntaxElement, SyntaxNode, SyntaxToken};

/// Replace `node` with `replacement`, which may be of another kind
///
/// The new child is spliced into the parent's green node; replacing the
/// root returns `replacement` itself.
pub fn replace_node(node: &SyntaxNode, replacement: GreenNode) -> GreenNode {
    match node.parent() {
        Some(parent) => {
            let new_parent = parent
                .green()
                .replace_child(node.index(), NodeOrToken::Node(replacement));
            parent.replace_with(new_parent)
        }
        None => replacement,
    }
}

/// Replace `token` with `replacement`; surrounding trivia is kept
pub fn replace_token(token: &SyntaxToken, replacement: GreenToken) -> Option<GreenNode> {
    let parent = token.parent()?;
    let new_parent = parent
        .green()
        .replace_child(token.index(), NodeOrToken::Token(replacement));
    Some(parent.replace_with(new_parent))
}

/// Remove `node` from its parent, `None` for the root
pub fn remove_node(node: &SyntaxNode) -> Option<GreenNode> {
    let parent = node.parent()?;
    let new_parent = parent.green().remove_child(node.index());
    Some(parent.replace_with(new_parent))
}

/// Insert elements into `parent` before the child at `index`
pub fn insert_children(parent: &SyntaxNode, index: usize, elements: Vec<GreenElement>) -> GreenNode {
    let new_parent = parent.green().splice_children(index..index, elements);
    parent.replace_with(new_parent)
}

/// Replace `token` together with the trivia it owns
pub fn replace_token_with_trivia(
    token: &SyntaxToken,
    replacement: GreenToken,
    leading: &[Trivia],
    trailing: &[Trivia],
) -> Option<GreenNode> {
    let parent = token.parent()?;
    let start = leading_trivia_tokens(token)
        .first()
        .map_or(token.index(), SyntaxToken::index);
    let end = trailing_trivia_tokens(token)
        .last()
        .map_or(token.index(), SyntaxToken::index)
        + 1;
    let new_parent = parent
        .green()
        .splice_children(start..end, token_with_trivia(replacement, leading, trailing));
    Some(parent.replace_with(new_parent))
}

/// Child-index path from the root to a node
///
/// Paths survive re-rooting a shared green tree, which makes them the way to
/// find "the same node" in a tree built on another thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn of(node: &SyntaxNode) -> Self {
        let mut indices: Vec<usize> = node
            .ancestors()
            .take_while(|n| n.parent().is_some())
            .map(|n| n.index())
            .collect();
        indices.reverse();
        Self(indices)
    }

    pub fn resolve(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        let mut node = root.clone();
        for &index in &self.0 {
            node = node.children_with_tokens().nth(index)?.into_node()?;
        }
        Some(node)
    }
}

/// What to do with an edit target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    Replace(GreenNode),
    ReplaceToken(GreenToken),
    Remove,
}

/// An edit addressed by the full range and kind of its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: TextRange,
    pub kind: CsSyntaxKind,
    pub action: EditAction,
}

impl Edit {
    pub fn replace(node: &SyntaxNode, replacement: GreenNode) -> Self {
        Self {
            range: node.text_range(),
            kind: node.kind(),
            action: EditAction::Replace(replacement),
        }
    }

    pub fn replace_token(token: &SyntaxToken, replacement: GreenToken) -> Self {
        Self {
            range: token.text_range(),
            kind: token.kind(),
            action: EditAction::ReplaceToken(replacement),
        }
    }

    pub fn remove(node: &SyntaxNode) -> Self {
        Self {
            range: node.text_range(),
            kind: node.kind(),
            action: EditAction::Remove,
        }
    }

    fn apply(&self, root: &SyntaxNode) -> Option<GreenNode> {
        match (&self.action, find_element(root, self.range, self.kind)?) {
            (EditAction::Replace(green), NodeOrToken::Node(node)) => {
                Some(replace_node(&node, green.clone()))
            }
            (EditAction::ReplaceToken(green), NodeOrToken::Token(token)) => {
                replace_token(&token, green.clone())
            }
            (EditAction::Remove, NodeOrToken::Node(node)) => remove_node(&node),
            _ => None,
        }
    }
}

fn find_element(root: &SyntaxNode, range: TextRange, kind: CsSyntaxKind) -> Option<SyntaxElement> {
    if !root.text_range().contains_range(range) {
        return None;
    }
    let mut element = root.covering_element(range);
    loop {
        if element.text_range() == range && element.kind() == kind {
            return Some(element);
        }
        element = NodeOrToken::Node(element.parent()?);
    }
}

/// Apply non-overlapping edits to the tree rooted at `root`
///
/// Edits are applied from the end of the text towards the start, so the
/// ranges of pending edits stay valid. Returns `None` if edits overlap or a
/// target cannot be found.
pub fn apply_edits(root: &SyntaxNode, mut edits: Vec<Edit>) -> Option<GreenNode> {
    edits.sort_by(|a, b| {
        b.range
            .start()
            .cmp(&a.range.start())
            .then(b.range.end().cmp(&a.range.end()))
    });
    if edits
        .windows(2)
        .any(|pair| pair[1].range.end() > pair[0].range.start())
    {
        debug!("Rejecting overlapping edits");
        return None;
    }

    let mut green = root.green().into_owned();
    for edit in &edits {
        let current = SyntaxNode::new_root(green.clone());
        match edit.apply(&current) {
            Some(next) => green = next,
            None => {
                debug!(range = ?edit.range, kind = %edit.kind, "Edit target not found");
                return None;
            }
        }
    }
    Some(green)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::make;
    use crate::cst::parse_source;

    fn root(source: &str) -> SyntaxNode {
        SyntaxNode::new_root(parse_source(source).0)
    }

    fn find(root: &SyntaxNode, kind: CsSyntaxKind) -> SyntaxNode {
        root.descendants().find(|n| n.kind() == kind).unwrap()
    }

    #[test]
    fn test_replace_node_keeps_rest_of_tree() {
        let source = "class A { void M() { F(new[] { 1 }); } }";
        let root = root(source);
        let target = find(&root, CsSyntaxKind::ImplicitArrayCreation);
        let green = replace_node(&target, make::expr("[1]"));
        assert_eq!(
            SyntaxNode::new_root(green).text().to_string(),
            "class A { void M() { F([1]); } }"
        );
        assert_eq!(root.text().to_string(), source);
    }

    #[test]
    fn test_replace_node_with_other_kind() {
        let root = root("class A { void M() { var a = [1, 2].ToArray(); } }");
        let call = find(&root, CsSyntaxKind::Invocation);
        let collection = find(&root, CsSyntaxKind::CollectionExpr);
        let green = replace_node(&call, collection.green().into_owned());
        let new_root = SyntaxNode::new_root(green);
        assert_eq!(
            new_root.text().to_string(),
            "class A { void M() { var a = [1, 2]; } }"
        );
        assert!(new_root.descendants().all(|n| n.kind() != CsSyntaxKind::Invocation));
    }

    #[test]
    fn test_replace_root() {
        let root = root("class A { }");
        let other = parse_source("class B { }").0;
        let green = replace_node(&root, other.clone());
        assert_eq!(green, other);
    }

    #[test]
    fn test_replace_token_keeps_trivia() {
        let root = root("class A { void M() { F(x /* c */); } }");
        let x = root
            .descendants_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| t.text() == "x")
            .unwrap();
        let green = replace_token(&x, make::ident("value")).unwrap();
        assert_eq!(
            SyntaxNode::new_root(green).text().to_string(),
            "class A { void M() { F(value /* c */); } }"
        );
    }

    #[test]
    fn test_remove_statement_with_its_line() {
        let root = root("class A\n{\n    void M()\n    {\n        F();\n        G();\n    }\n}\n");
        let stmt = find(&root, CsSyntaxKind::ExprStmt);
        let green = remove_node(&stmt).unwrap();
        assert_eq!(
            SyntaxNode::new_root(green).text().to_string(),
            "class A\n{\n    void M()\n    {\n        G();\n    }\n}\n"
        );
    }

    #[test]
    fn test_replace_token_with_trivia() {
        let root = root("class A { int M() => a ? b : c; }");
        let question = root
            .descendants_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| t.kind() == CsSyntaxKind::Question)
            .unwrap();
        let green = replace_token_with_trivia(
            &question,
            make::punct(CsSyntaxKind::Question),
            &[Trivia::comment("/* q */")],
            &[Trivia::whitespace("  ")],
        )
        .unwrap();
        assert_eq!(
            SyntaxNode::new_root(green).text().to_string(),
            "class A { int M() => a /* q */?  b : c; }"
        );
    }

    #[test]
    fn test_node_path_round_trip() {
        let root = root("class A { void M() { F(1); G(2); } }");
        let second = root
            .descendants()
            .filter(|n| n.kind() == CsSyntaxKind::ExprStmt)
            .nth(1)
            .unwrap();
        let path = NodePath::of(&second);
        let rerooted = SyntaxNode::new_root(root.green().into_owned());
        let resolved = path.resolve(&rerooted).unwrap();
        assert_eq!(resolved.text_range(), second.text_range());
        assert_eq!(resolved.kind(), CsSyntaxKind::ExprStmt);
    }

    #[test]
    fn test_batch_edits_apply_back_to_front() {
        let root = root("class A { void M() { F(out var x); G(x); } }");
        let ident = root
            .descendants_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|t| t.text() == "x")
            .unwrap();
        let second = root
            .descendants()
            .filter(|n| n.kind() == CsSyntaxKind::ExprStmt)
            .nth(1)
            .unwrap();
        let edits = vec![
            Edit::remove(&second),
            Edit::replace_token(&ident, make::ident("y")),
        ];
        let green = apply_edits(&root, edits).unwrap();
        assert_eq!(
            SyntaxNode::new_root(green).text().to_string(),
            "class A { void M() { F(out var y); } }"
        );
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let root = root("class A { void M() { F(1); } }");
        let stmt = find(&root, CsSyntaxKind::ExprStmt);
        let call = find(&root, CsSyntaxKind::Invocation);
        assert!(apply_edits(&root, vec![Edit::remove(&stmt), Edit::replace(&call, make::expr("G()"))]).is_none());
    }
}
