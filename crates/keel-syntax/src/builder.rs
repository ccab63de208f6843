//! Incremental builder for the immutable syntax tree.

use keel_errors::Diagnostic;
use text_size::{TextRange, TextSize};

use crate::{
    GreenElement, GreenNode, GreenToken, GreenTrivia, NodeOrToken, SyntaxKind, TriviaPiece,
    TriviaPieceKind,
};

/// Builds a [`GreenNode`] from parser events.
///
/// Tokens are handed over by range. Every byte between the end of the
/// previous token and the end of the current one belongs to the current
/// token, so text dropped by recovery via [`Builder::skip`] resurfaces as
/// leading trivia of the next real token.
pub struct Builder<'t> {
    text: &'t str,
    offset: TextSize,
    parents: Vec<Parent>,
    children: Vec<GreenElement>,
    skipped: Vec<TriviaPiece>,
    pending: Vec<Diagnostic>,
}

struct Parent {
    kind: SyntaxKind,
    first_child: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Builder<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            offset: TextSize::new(0),
            parents: Vec::with_capacity(64),
            children: Vec::with_capacity(256),
            skipped: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push(Parent {
            kind,
            first_child: self.children.len(),
            diagnostics: Vec::new(),
        });
    }

    pub fn finish_node(&mut self) {
        let Some(Parent { kind, first_child, diagnostics }) = self.parents.pop() else {
            panic!("`finish_node` called without a matching `start_node`");
        };

        let children = self.children.drain(first_child..).collect();
        self.children.push(NodeOrToken::Node(GreenNode::new(kind, children, diagnostics)));
    }

    /// Attaches `diagnostic` to the innermost open node.
    pub fn node_diagnostic(&mut self, diagnostic: Diagnostic) {
        match self.parents.last_mut() {
            Some(parent) => parent.diagnostics.push(diagnostic),
            None => self.pending.push(diagnostic),
        }
    }

    /// Queues `diagnostic` for the next token, real or missing.
    pub fn diagnostic(&mut self, diagnostic: Diagnostic) {
        self.pending.push(diagnostic);
    }

    pub fn token(
        &mut self,
        kind: SyntaxKind,
        leading: &GreenTrivia,
        kind_range: TextRange,
        trailing: GreenTrivia,
    ) {
        let end = kind_range.end() + trailing.len();
        let text = &self.text[TextRange::new(self.offset, end)];

        let leading = if self.skipped.is_empty() {
            leading.clone()
        } else {
            self.skipped.extend_from_slice(leading.pieces());
            let leading = GreenTrivia::new(&self.skipped);
            self.skipped.clear();
            leading
        };
        debug_assert_eq!(kind_range.start() - self.offset, leading.len());

        let diagnostics = std::mem::take(&mut self.pending);
        let token = GreenToken::new(kind, text, leading, trailing, diagnostics);
        self.children.push(NodeOrToken::Token(token));
        self.offset = end;
    }

    pub fn missing(&mut self, kind: SyntaxKind, diagnostic: Option<Diagnostic>) {
        let mut diagnostics = std::mem::take(&mut self.pending);
        diagnostics.extend(diagnostic);
        self.children.push(NodeOrToken::Token(GreenToken::missing(kind, diagnostics)));
    }

    /// Turns a token into trivia of whatever real token comes next.
    pub fn skip(
        &mut self,
        leading: &GreenTrivia,
        kind_range: TextRange,
        trailing: &GreenTrivia,
        diagnostic: Option<Diagnostic>,
    ) {
        self.skipped.extend_from_slice(leading.pieces());
        self.skipped.push(TriviaPiece::new(TriviaPieceKind::Skipped, kind_range.len()));
        self.skipped.extend_from_slice(trailing.pieces());
        self.pending.extend(diagnostic);
    }

    pub fn finish(mut self) -> GreenNode {
        assert!(self.parents.is_empty(), "unfinished nodes at the end of the tree");
        debug_assert!(self.skipped.is_empty(), "skipped text must precede a real token");

        match (self.children.pop(), self.children.is_empty()) {
            (Some(NodeOrToken::Node(root)), true) => root,
            _ => panic!("the tree must have exactly one root node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use keel_errors::ErrorCode;

    use super::*;

    fn ws(len: u32) -> GreenTrivia {
        GreenTrivia::new(&[TriviaPiece::new(TriviaPieceKind::Whitespace, len.into())])
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn skipped_tokens_become_leading_trivia() {
        let text = "a ) b";
        let mut builder = Builder::new(text);
        builder.start_node(SyntaxKind::COMPILATION_UNIT);
        builder.token(SyntaxKind::IDENT, &GreenTrivia::empty(), range(0, 1), ws(1));
        builder.skip(
            &GreenTrivia::empty(),
            range(2, 3),
            &ws(1),
            Some(Diagnostic::new(ErrorCode::EOFExpected, range(2, 3))),
        );
        builder.token(SyntaxKind::IDENT, &GreenTrivia::empty(), range(4, 5), GreenTrivia::empty());
        builder.finish_node();
        let root = builder.finish();

        let NodeOrToken::Token(b) = &root.children()[1] else { panic!("expected a token") };
        assert_eq!(b.text(), ") b");
        assert_eq!(b.text_trimmed(), "b");
        assert_eq!(b.diagnostics().len(), 1);
        assert_eq!(b.leading().pieces()[0].kind, TriviaPieceKind::Skipped);
        assert_eq!(root.text_len(), TextSize::of(text));
    }

    #[test]
    fn missing_tokens_take_pending_diagnostics() {
        let mut builder = Builder::new("");
        builder.start_node(SyntaxKind::COMPILATION_UNIT);
        builder.diagnostic(Diagnostic::new(ErrorCode::SemicolonExpected, range(0, 0)));
        builder.missing(SyntaxKind::SEMICOLON, None);
        builder.finish_node();
        let root = builder.finish();

        assert!(root.contains_missing());
        assert!(root.contains_diagnostics());
    }
}
