//! Cursor layer over green nodes: absolute offsets and parent links.

use std::fmt;
use std::iter::successors;

use keel_errors::Diagnostic;
use text_size::{TextRange, TextSize};
use triomphe::Arc;

use crate::syntax::{PreorderWithTokens, WalkEventWithTokens};
use crate::{GreenNode, GreenToken, NodeOrToken, SyntaxKind, TriviaPiece};

pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }
}

struct NodeData {
    parent: Option<SyntaxNode>,
    offset: TextSize,
    green: GreenNode,
}

#[derive(Clone)]
pub struct SyntaxNode {
    data: Arc<NodeData>,
}

impl SyntaxNode {
    pub fn new_root(green: GreenNode) -> Self {
        Self { data: Arc::new(NodeData { parent: None, offset: TextSize::new(0), green }) }
    }

    fn new_child(parent: Self, offset: TextSize, green: GreenNode) -> Self {
        Self { data: Arc::new(NodeData { parent: Some(parent), offset, green }) }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.data.offset, self.data.green.text_len())
    }

    pub fn parent(&self) -> Option<Self> {
        self.data.parent.clone()
    }

    pub fn ancestors(&self) -> impl Iterator<Item = Self> + use<> {
        successors(Some(self.clone()), Self::parent)
    }

    pub fn children_with_tokens(&self) -> ChildrenWithTokens {
        ChildrenWithTokens { parent: self.clone(), next: 0, offset: self.data.offset }
    }

    pub fn children(&self) -> impl Iterator<Item = Self> + use<> {
        self.children_with_tokens().filter_map(NodeOrToken::into_node)
    }

    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEventWithTokens::Token(token) => Some(token),
            _ => None,
        })
    }

    pub fn descendants(&self) -> impl Iterator<Item = Self> + use<> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEventWithTokens::EnterNode(node) => Some(node),
            _ => None,
        })
    }

    pub fn preorder_with_tokens(&self) -> PreorderWithTokens {
        PreorderWithTokens::new(self.clone())
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        self.tokens().next()
    }

    /// First token that is not a synthesized placeholder.
    pub fn first_real_token(&self) -> Option<SyntaxToken> {
        self.tokens().find(|token| !token.is_missing())
    }

    /// The range without the leading trivia of the first real token and the
    /// trailing trivia of the last one.
    pub fn trimmed_range(&self) -> TextRange {
        let mut tokens = self.tokens().filter(|token| !token.is_missing());
        let Some(first) = tokens.next() else {
            return TextRange::empty(self.text_range().start());
        };
        let last = tokens.last().unwrap_or_else(|| first.clone());

        TextRange::new(first.text_trimmed_range().start(), last.text_trimmed_range().end())
    }

    /// `true` if this node or a descendant carries a diagnostic or is missing.
    pub fn has_errors(&self) -> bool {
        self.data.green.has_errors()
    }

    /// Every diagnostic in this subtree, stably ordered by start offset.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if !self.data.green.contains_diagnostics() {
            return diagnostics;
        }

        for event in self.preorder_with_tokens() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    diagnostics.extend_from_slice(node.green().diagnostics());
                }
                WalkEventWithTokens::Token(token) => {
                    diagnostics.extend_from_slice(token.green().diagnostics());
                }
                WalkEventWithTokens::LeaveNode(_) => {}
            }
        }

        diagnostics.sort_by_key(|diagnostic| diagnostic.range().start());
        diagnostics
    }

    pub fn child_by_kind(&self, kind: SyntaxKind) -> Option<Self> {
        self.children().find(|child| child.kind() == kind)
    }

    pub fn token_by_kind(&self, kind: SyntaxKind) -> Option<SyntaxToken> {
        self.children_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|token| token.kind() == kind)
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.data.offset == other.data.offset && self.data.green.ptr_eq(&other.data.green)
    }
}

impl Eq for SyntaxNode {}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tokens().try_for_each(|token| f.write_str(token.text()))
    }
}

#[derive(Clone)]
pub struct ChildrenWithTokens {
    parent: SyntaxNode,
    next: usize,
    offset: TextSize,
}

impl Iterator for ChildrenWithTokens {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.parent.data.green.children().get(self.next)?;
        let offset = self.offset;

        self.next += 1;
        self.offset += child.text_len();

        Some(match child {
            NodeOrToken::Node(node) => {
                NodeOrToken::Node(SyntaxNode::new_child(self.parent.clone(), offset, node.clone()))
            }
            NodeOrToken::Token(token) => NodeOrToken::Token(SyntaxToken {
                parent: self.parent.clone(),
                offset,
                green: token.clone(),
            }),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.parent.data.green.children().len() - self.next;
        (len, Some(len))
    }
}

impl ExactSizeIterator for ChildrenWithTokens {}

#[derive(Clone)]
pub struct SyntaxToken {
    parent: SyntaxNode,
    offset: TextSize,
    green: GreenToken,
}

impl SyntaxToken {
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    pub fn green(&self) -> &GreenToken {
        &self.green
    }

    pub fn parent(&self) -> SyntaxNode {
        self.parent.clone()
    }

    /// Full text, leading and trailing trivia included.
    pub fn text(&self) -> &str {
        self.green.text()
    }

    pub fn text_trimmed(&self) -> &str {
        self.green.text_trimmed()
    }

    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.text_len())
    }

    pub fn text_trimmed_range(&self) -> TextRange {
        let range = self.text_range();
        TextRange::new(
            range.start() + self.green.leading().len(),
            range.end() - self.green.trailing().len(),
        )
    }

    pub fn leading_trivia(&self) -> &[TriviaPiece] {
        self.green.leading().pieces()
    }

    pub fn trailing_trivia(&self) -> &[TriviaPiece] {
        self.green.trailing().pieces()
    }

    pub fn is_missing(&self) -> bool {
        self.green.is_missing()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.green.diagnostics()
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.green == other.green && self.parent == other.parent
    }
}

impl Eq for SyntaxToken {}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.text_range(), self.text_trimmed())
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
