//! Shared tree vocabulary: the node-or-token sum and preorder walks.

use std::fmt::{self, Write as _};

use text_size::TextRange;

use crate::red::ChildrenWithTokens;
use crate::{SyntaxElement, SyntaxNode, SyntaxToken, TriviaPieceKind};

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for NodeOrToken<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOrToken::Node(node) => fmt::Display::fmt(node, f),
            NodeOrToken::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

/// Preorder traversal over nodes and tokens.
///
/// Walks with an explicit stack, so arbitrarily deep trees are fine.
#[derive(Clone)]
pub struct PreorderWithTokens {
    stack: Vec<(SyntaxNode, ChildrenWithTokens)>,
    root: Option<SyntaxNode>,
}

impl PreorderWithTokens {
    pub(crate) fn new(start: SyntaxNode) -> Self {
        Self { stack: Vec::with_capacity(32), root: Some(start) }
    }

    /// Skips the rest of the node entered last.
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl Iterator for PreorderWithTokens {
    type Item = WalkEventWithTokens;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root.clone(), root.children_with_tokens()));
            return Some(WalkEventWithTokens::EnterNode(root));
        };

        match active_node.next() {
            Some(SyntaxElement::Node(child)) => {
                self.stack.push((child.clone(), child.children_with_tokens()));
                Some(WalkEventWithTokens::EnterNode(child))
            }
            Some(SyntaxElement::Token(child)) => Some(WalkEventWithTokens::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop()?;
                Some(WalkEventWithTokens::LeaveNode(exited_node))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Debug)]
pub enum WalkEventWithTokens {
    EnterNode(SyntaxNode),
    LeaveNode(SyntaxNode),
    Token(SyntaxToken),
}

/// Indented dump of kinds, ranges and token text.
///
/// Missing tokens are marked, and text that recovery skipped is listed right
/// before the token that carries it as trivia.
pub fn debug_tree(root: &SyntaxNode) -> String {
    let mut out = String::new();
    let mut depth = 0usize;

    for event in root.preorder_with_tokens() {
        match event {
            WalkEventWithTokens::EnterNode(node) => {
                let indent = depth * 2;
                _ = writeln!(out, "{:indent$}{:?}@{:?}", "", node.kind(), node.text_range());
                depth += 1;
            }
            WalkEventWithTokens::LeaveNode(_) => depth -= 1,
            WalkEventWithTokens::Token(token) => {
                let mut offset = token.text_range().start();
                for piece in token.leading_trivia() {
                    if piece.kind == TriviaPieceKind::Skipped {
                        let range = TextRange::at(offset, piece.len) - token.text_range().start();
                        let text = &token.text()[range];
                        _ = writeln!(out, "{:indent$}skipped {text:?}", "", indent = depth * 2);
                    }
                    offset += piece.len;
                }

                let suffix = if token.is_missing() { " missing" } else { "" };
                _ = writeln!(
                    out,
                    "{:indent$}{:?}@{:?} {:?}{suffix}",
                    "",
                    token.kind(),
                    token.text_trimmed_range(),
                    token.text_trimmed(),
                    indent = depth * 2,
                );
            }
        }
    }

    debug_assert_eq!(depth, 0);
    out
}
