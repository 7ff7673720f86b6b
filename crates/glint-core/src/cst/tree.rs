//! Parsed syntax tree handle

use rowan::GreenNode;

use super::{ParseError, SyntaxNode, parse_source};

/// An immutable syntax tree with the errors found while parsing it
///
/// Cloning is cheap: the green tree is reference counted. Red views are
/// created on demand by [`SyntaxTree::root`] and are not `Send`; to work on
/// a tree from several threads, share the `SyntaxTree` and call `root` on
/// each thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl SyntaxTree {
    pub fn parse(text: &str) -> Self {
        let (green, errors) = parse_source(text);
        Self { green, errors }
    }

    /// Wrap a green tree produced by a rewrite
    ///
    /// Rewrites do not re-run the parser, so the tree carries no errors. Use
    /// [`SyntaxTree::reparse`] to validate the result.
    pub fn from_green(green: GreenNode) -> Self {
        Self {
            green,
            errors: Vec::new(),
        }
    }

    /// Parse the text of this tree again
    pub fn reparse(&self) -> Self {
        Self::parse(&self.text())
    }

    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn text(&self) -> String {
        self.root().text().to_string()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
