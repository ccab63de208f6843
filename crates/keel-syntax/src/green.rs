//! Position-independent, immutable tree storage.
//!
//! Green nodes know their width but not their offset; the red layer in
//! [`crate::SyntaxNode`] adds offsets and parent links on demand.

use std::fmt;

use keel_errors::Diagnostic;
use text_size::TextSize;
use triomphe::{Arc, ThinArc};

use crate::{NodeOrToken, SyntaxKind, TriviaPiece};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_len(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.text_len(),
            NodeOrToken::Token(token) => token.text_len(),
        }
    }

    fn flags(&self) -> Flags {
        match self {
            NodeOrToken::Node(node) => node.head().flags,
            NodeOrToken::Token(token) => token.data.flags,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
struct Flags(u8);

impl Flags {
    const CONTAINS_DIAGNOSTICS: Self = Self(1);
    const CONTAINS_MISSING: Self = Self(1 << 1);

    fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

#[derive(Debug, Eq, Hash, PartialEq)]
struct GreenNodeHead {
    kind: SyntaxKind,
    text_len: TextSize,
    flags: Flags,
    diagnostics: Box<[Diagnostic]>,
}

#[derive(Clone, Eq, Hash, PartialEq)]
pub struct GreenNode {
    ptr: ThinArc<GreenNodeHead, GreenElement>,
}

impl GreenNode {
    pub fn new(
        kind: SyntaxKind,
        children: Vec<GreenElement>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let mut flags = Flags::default();
        if !diagnostics.is_empty() {
            flags.insert(Flags::CONTAINS_DIAGNOSTICS);
        }

        let mut text_len = TextSize::new(0);
        for child in &children {
            text_len += child.text_len();
            flags.insert(child.flags());
        }

        let head = GreenNodeHead { kind, text_len, flags, diagnostics: diagnostics.into() };
        Self { ptr: ThinArc::from_header_and_iter(head, children.into_iter()) }
    }

    fn head(&self) -> &GreenNodeHead {
        &self.ptr.header.header
    }

    pub fn kind(&self) -> SyntaxKind {
        self.head().kind
    }

    pub fn text_len(&self) -> TextSize {
        self.head().text_len
    }

    pub fn children(&self) -> &[GreenElement] {
        &self.ptr.slice
    }

    /// Diagnostics attached to this node itself, not its descendants.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.head().diagnostics
    }

    pub fn contains_diagnostics(&self) -> bool {
        self.head().flags.contains(Flags::CONTAINS_DIAGNOSTICS)
    }

    pub fn contains_missing(&self) -> bool {
        self.head().flags.contains(Flags::CONTAINS_MISSING)
    }

    pub fn has_errors(&self) -> bool {
        self.contains_diagnostics() || self.contains_missing()
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.head(), other.head())
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("text_len", &self.text_len())
            .field("children", &self.children().len())
            .finish()
    }
}

#[derive(Debug, Eq, Hash, PartialEq)]
struct GreenTokenData {
    kind: SyntaxKind,
    flags: Flags,
    text: Box<str>,
    leading: GreenTrivia,
    trailing: GreenTrivia,
    diagnostics: Box<[Diagnostic]>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GreenToken {
    data: Arc<GreenTokenData>,
}

impl GreenToken {
    /// `text` is the full text, leading and trailing trivia included.
    pub fn new(
        kind: SyntaxKind,
        text: &str,
        leading: GreenTrivia,
        trailing: GreenTrivia,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        debug_assert!(leading.len() + trailing.len() <= TextSize::of(text));
        Self::alloc(kind, Flags::default(), text, leading, trailing, diagnostics)
    }

    /// A zero-width token standing in for one the input did not supply.
    pub fn missing(kind: SyntaxKind, diagnostics: Vec<Diagnostic>) -> Self {
        Self::alloc(
            kind,
            Flags::CONTAINS_MISSING,
            "",
            GreenTrivia::empty(),
            GreenTrivia::empty(),
            diagnostics,
        )
    }

    fn alloc(
        kind: SyntaxKind,
        mut flags: Flags,
        text: &str,
        leading: GreenTrivia,
        trailing: GreenTrivia,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        if !diagnostics.is_empty() {
            flags.insert(Flags::CONTAINS_DIAGNOSTICS);
        }

        let data = GreenTokenData {
            kind,
            flags,
            text: text.into(),
            leading,
            trailing,
            diagnostics: diagnostics.into(),
        };
        Self { data: Arc::new(data) }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    pub fn text(&self) -> &str {
        &self.data.text
    }

    pub fn text_len(&self) -> TextSize {
        TextSize::of(self.text())
    }

    pub fn text_trimmed(&self) -> &str {
        let start: usize = self.leading().len().into();
        let end: usize = (self.text_len() - self.trailing().len()).into();

        &self.text()[start..end]
    }

    pub fn leading(&self) -> &GreenTrivia {
        &self.data.leading
    }

    pub fn trailing(&self) -> &GreenTrivia {
        &self.data.trailing
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.data.diagnostics
    }

    pub fn is_missing(&self) -> bool {
        self.data.flags.contains(Flags::CONTAINS_MISSING)
    }

    pub fn has_errors(&self) -> bool {
        self.is_missing() || !self.diagnostics().is_empty()
    }
}

#[derive(Clone, Eq, Hash, PartialEq)]
pub struct GreenTrivia {
    ptr: Option<ThinArc<TextSize, TriviaPiece>>,
}

impl fmt::Debug for GreenTrivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenTrivia")
            .field("pieces", &self.pieces())
            .field("total_len", &self.len())
            .finish()
    }
}

impl GreenTrivia {
    pub fn new(pieces: &[TriviaPiece]) -> Self {
        if pieces.is_empty() {
            return Self::empty();
        }

        let total_len = pieces.iter().map(|piece| piece.len).sum();
        Self { ptr: Some(ThinArc::from_header_and_slice(total_len, pieces)) }
    }

    pub const fn empty() -> Self {
        Self { ptr: None }
    }

    pub fn len(&self) -> TextSize {
        match self.ptr {
            None => TextSize::new(0),
            Some(ref ptr) => ptr.header.header,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    pub fn pieces(&self) -> &[TriviaPiece] {
        match &self.ptr {
            None => &[],
            Some(ptr) => &ptr.slice,
        }
    }

    pub fn has_newline(&self) -> bool {
        self.pieces().iter().any(|piece| piece.is_newline())
    }
}

#[cfg(test)]
mod tests {
    use keel_errors::{ErrorCode, TextRange};

    use super::*;
    use crate::TriviaPieceKind;

    fn whitespace(len: u32) -> GreenTrivia {
        GreenTrivia::new(&[TriviaPiece::new(TriviaPieceKind::Whitespace, len.into())])
    }

    #[test]
    fn token_text() {
        let text = " \t class \t\t";
        let token =
            GreenToken::new(SyntaxKind::CLASS_KW, text, whitespace(3), whitespace(3), vec![]);

        assert_eq!(" \t class \t\t", token.text());
        assert_eq!("class", token.text_trimmed());
        assert!(!token.has_errors());
    }

    #[test]
    fn flags_propagate_to_ancestors() {
        let ident = GreenToken::missing(
            SyntaxKind::IDENT,
            vec![Diagnostic::new(ErrorCode::IdentifierExpected, TextRange::empty(5.into()))],
        );
        let keyword = GreenToken::new(
            SyntaxKind::CLASS_KW,
            "class",
            GreenTrivia::empty(),
            GreenTrivia::empty(),
            vec![],
        );

        let decl = GreenNode::new(
            SyntaxKind::CLASS_DECL,
            vec![NodeOrToken::Token(keyword.clone()), NodeOrToken::Token(ident)],
            vec![],
        );
        let root =
            GreenNode::new(SyntaxKind::COMPILATION_UNIT, vec![NodeOrToken::Node(decl)], vec![]);

        assert!(root.contains_missing());
        assert!(root.contains_diagnostics());
        assert_eq!(root.text_len(), TextSize::new(5));

        let clean =
            GreenNode::new(SyntaxKind::CLASS_DECL, vec![NodeOrToken::Token(keyword)], vec![]);
        assert!(!clean.has_errors());
    }
}
