//! Concrete Syntax Tree (CST) for the analyzed language
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! The CST preserves all source information including whitespace, comments,
//! and formatting, so rewrites only change the text they touch.
//!
//! ## Architecture
//!
//! - **Green Tree**: immutable, position-independent storage shared between
//!   versions of a tree. Cheap to clone and safe to send across threads.
//! - **Red Tree**: on-demand view with parent pointers and offsets, used for
//!   navigation. Red nodes stay on the thread that created them.
//!
//! ## Trivia Handling
//!
//! Trivia is attached to tokens:
//! - **Leading trivia**: everything before a token that is not the previous
//!   token's trailing trivia
//! - **Trailing trivia**: everything after a token up to the next line break
//!
//! See [`trivia`] for the exact rule. The lossless property holds for every
//! input, including invalid code: `SyntaxTree::parse(source).text() == source`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use glint_core::cst::{CsSyntaxKind, SyntaxTree};
//!
//! let tree = SyntaxTree::parse("class A { void M() { F(); } } // done");
//! assert_eq!(tree.text(), "class A { void M() { F(); } } // done");
//!
//! for token in tree.root().descendants_with_tokens() {
//!     if let Some(comment) = token.as_token() {
//!         if comment.kind() == CsSyntaxKind::LineComment {
//!             println!("Found comment: {}", comment.text());
//!         }
//!     }
//! }
//! ```

mod language;
mod lexer;
mod parser;
mod syntax_kind;
mod tree;

pub mod ast;
pub mod make;
pub mod surgeon;
pub mod trivia;

pub use language::CsLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use parser::{FragmentKind, ParseError, parse_fragment, parse_source};
pub use surgeon::{Edit, EditAction, NodePath};
pub use syntax_kind::CsSyntaxKind;
pub use tree::SyntaxTree;
pub use trivia::{Trivia, TriviaKind};

pub type SyntaxNode = rowan::SyntaxNode<CsLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<CsLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<CsLanguage>;
pub type GreenElement = rowan::NodeOrToken<rowan::GreenNode, rowan::GreenToken>;

pub use rowan::{GreenNode, GreenToken, NodeOrToken, TextRange, TextSize};
