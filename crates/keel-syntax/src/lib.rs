//! Lossless, immutable syntax tree with attached trivia and diagnostics.
//!
//! Green nodes are shared and position independent. Red handles add absolute
//! offsets and parent links on top of them while the tree is navigated.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;
mod builder;
mod green;
mod red;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod trivia;

/// Incremental builder for constructing a `GreenNode`.
pub use builder::Builder;
/// Position-independent tree storage.
pub use green::{GreenElement, GreenNode, GreenToken, GreenTrivia};
/// Navigable handles with offsets and parents.
pub use red::{ChildrenWithTokens, SyntaxElement, SyntaxNode, SyntaxToken};
pub use syntax::{NodeOrToken, PreorderWithTokens, WalkEventWithTokens, debug_tree};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Trivia pieces attached to tokens.
pub use trivia::{TriviaPiece, TriviaPieceKind};
