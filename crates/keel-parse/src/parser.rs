use drop_bomb::DropBomb;
use keel_errors::{Diagnostic, ErrorCode};
use keel_syntax::SyntaxKind::{self, *};
use keel_syntax::{Builder, GreenNode, SyntaxSet};
use keel_tokenizer::{Token, Tokenizer};
use log::{debug, trace};
use text_size::{TextRange, TextSize};

use crate::options::{Feature, ParseOptions};

/// Event-emitting parser over a lazily filled token buffer.
///
/// Tokens are scanned on demand, so any amount of lookahead is possible, and
/// the position can be rewound for speculative decisions. Events are replayed
/// into a [`Builder`] once the grammar is done.
pub(crate) struct Parser<'t> {
    text: &'t str,
    options: &'t ParseOptions,
    tokenizer: Tokenizer<'t>,
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    depth: u32,
    fatal: Option<Diagnostic>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str, options: &'t ParseOptions) -> Self {
        Self {
            text,
            options,
            tokenizer: Tokenizer::new(text),
            tokens: Vec::with_capacity(text.len() / 4),
            pos: 0,
            events: Vec::with_capacity(text.len() / 2),
            depth: 0,
            fatal: None,
        }
    }

    fn raw(&mut self, index: usize) -> &Token {
        while self.tokens.len() <= index && self.tokens.last().is_none_or(|last| last.kind != EOF)
        {
            let token = self.tokenizer.next_token();
            self.tokens.push(token);
        }

        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }

    /// Kind of the token `n` positions ahead. Past the end, and after the
    /// nesting limit aborted the parse, this is `EOF`.
    pub(crate) fn nth(&mut self, n: usize) -> SyntaxKind {
        if self.fatal.is_some() {
            return EOF;
        }
        self.raw(self.pos + n).kind
    }

    pub(crate) fn current(&mut self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.nth(0) == kind
    }

    pub(crate) fn nth_at(&mut self, n: usize, kind: SyntaxKind) -> bool {
        self.nth(n) == kind
    }

    pub(crate) fn at_set(&mut self, set: &SyntaxSet) -> bool {
        set.contains(self.current())
    }

    pub(crate) fn nth_text(&mut self, n: usize) -> &'t str {
        if self.fatal.is_some() {
            return "";
        }
        let range = self.raw(self.pos + n).kind_range;
        &self.text[range]
    }

    /// `true` if the token `n` ahead is the identifier `text`, which is how
    /// contextual keywords are recognised.
    pub(crate) fn nth_contextual(&mut self, n: usize, text: &str) -> bool {
        self.nth_at(n, IDENT) && self.nth_text(n) == text
    }

    pub(crate) fn at_contextual(&mut self, text: &str) -> bool {
        self.nth_contextual(0, text)
    }

    pub(crate) fn nth_range(&mut self, n: usize) -> TextRange {
        self.raw(self.pos + n).kind_range
    }

    pub(crate) fn current_range(&mut self) -> TextRange {
        self.nth_range(0)
    }

    pub(crate) fn nth_preceded_by_newline(&mut self, n: usize) -> bool {
        self.raw(self.pos + n).preceded_by_newline
    }

    /// `true` if the tokens `n` and `n + 1` ahead touch without trivia.
    fn adjacent(&mut self, n: usize) -> bool {
        let first = self.raw(self.pos + n).kind_range.end();
        first == self.raw(self.pos + n + 1).kind_range.start()
    }

    /// The operator at the current position, putting `>>` and `>>=` back
    /// together. Returns the kind and the number of tokens it spans.
    pub(crate) fn current_op(&mut self) -> (SyntaxKind, u8) {
        match self.current() {
            GT if self.adjacent(0) => match self.nth(1) {
                GT => (SHR, 2),
                GTEQ => (SHR_EQ, 2),
                _ => (GT, 1),
            },
            kind => (kind, 1),
        }
    }

    /// Number of raw tokens consumed or skipped so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// End of the last consumed token's text.
    pub(crate) fn prev_end(&mut self) -> TextSize {
        match self.pos.checked_sub(1) {
            Some(previous) => self.raw(previous).kind_range.end(),
            None => TextSize::new(0),
        }
    }

    pub(crate) fn max_depth(&self) -> u32 {
        self.options.max_depth
    }

    pub(crate) fn advance(&mut self) {
        let kind = self.current();
        self.advance_as(kind, 1);
    }

    /// Consumes `n_raw` tokens as one token of `kind`.
    pub(crate) fn advance_as(&mut self, kind: SyntaxKind, n_raw: u8) {
        if self.current() == EOF {
            return;
        }

        self.pos += n_raw as usize;
        self.events.push(Event::Token { kind, n_raw });
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.advance();
        true
    }

    pub(crate) fn eat_contextual(&mut self, text: &str) -> bool {
        if !self.at_contextual(text) {
            return false;
        }
        self.advance();
        true
    }

    /// Consumes `kind`, or inserts a missing `kind` carrying the matching
    /// "expected" diagnostic without moving past the current token.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }

        let diagnostic = self.expected(kind);
        self.missing(kind, Some(diagnostic));
        false
    }

    /// The diagnostic for a missing `kind` at the current position.
    pub(crate) fn expected(&mut self, kind: SyntaxKind) -> Diagnostic {
        let range = self.expected_range();
        match kind {
            IDENT => Diagnostic::new(ErrorCode::IdentifierExpected, range),
            SEMICOLON => Diagnostic::new(ErrorCode::SemicolonExpected, range),
            RIGHT_PAREN => Diagnostic::new(ErrorCode::CloseParenExpected, range),
            LEFT_BRACE => Diagnostic::new(ErrorCode::LbraceExpected, range),
            RIGHT_BRACE => Diagnostic::new(ErrorCode::RbraceExpected, range),
            IN_KW => Diagnostic::new(ErrorCode::InExpected, range),
            _ => {
                let expected = kind.text().unwrap_or("");
                let found = self.nth_text(0);
                Diagnostic::with_args(ErrorCode::SyntaxError, range, [expected, found])
            }
        }
    }

    /// Where a diagnostic for something missing before the current token
    /// goes: right after the previous token if a line break separates the
    /// two, otherwise on the current token.
    pub(crate) fn expected_range(&mut self) -> TextRange {
        let token = self.raw(self.pos);
        let (preceded_by_newline, range) = (token.preceded_by_newline, token.kind_range);

        match self.pos.checked_sub(1) {
            Some(previous) if preceded_by_newline => {
                TextRange::empty(self.tokens[previous].kind_range.end())
            }
            _ => range,
        }
    }

    pub(crate) fn missing(&mut self, kind: SyntaxKind, diagnostic: Option<Diagnostic>) {
        let diagnostic = diagnostic.filter(|_| self.fatal.is_none());
        self.events.push(Event::Missing { kind, diagnostic });
    }

    /// Drops the current token from the grammar. Its text survives as
    /// skipped trivia of the next token.
    pub(crate) fn skip(&mut self, diagnostic: Option<Diagnostic>) {
        if self.at(EOF) {
            return;
        }

        let diagnostic = diagnostic.filter(|_| self.fatal.is_none());
        self.pos += 1;
        self.events.push(Event::Skip { diagnostic });
    }

    /// Queues `diagnostic` for the next token, real or missing.
    pub(crate) fn error(&mut self, diagnostic: Diagnostic) {
        if self.fatal.is_none() {
            self.events.push(Event::Error(diagnostic));
        }
    }

    /// Attaches `diagnostic` to the node completed next.
    pub(crate) fn node_error(&mut self, diagnostic: Diagnostic) {
        if self.fatal.is_none() {
            self.events.push(Event::NodeError(diagnostic));
        }
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, range: TextRange) {
        self.error(Diagnostic::new(code, range));
    }

    pub(crate) fn feature(&mut self, feature: Feature, range: TextRange) {
        if let Some(diagnostic) = self.options.check(feature, range) {
            self.error(diagnostic);
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint { pos: self.pos, events: self.events.len() }
    }

    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        trace!("rewinding from token {} to {}", self.pos, checkpoint.pos);
        self.pos = checkpoint.pos;
        self.events.truncate(checkpoint.events);
    }

    /// Runs `f` speculatively. Nothing it consumes or reports survives.
    pub(crate) fn lookahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let checkpoint = self.checkpoint();
        let result = f(self);
        self.rewind(checkpoint);
        result
    }

    /// Runs `f` one nesting level deeper. Returns `None` once the nesting
    /// limit is hit; from then on the input looks exhausted.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.fatal.is_some() {
            return None;
        }

        if self.depth >= self.options.max_depth {
            let range = self.current_range();
            debug!("nesting limit of {} reached at {range:?}", self.options.max_depth);
            self.fatal = Some(Diagnostic::new(ErrorCode::InsufficientStack, range));
            return None;
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        Some(result)
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.fatal.is_some()
    }

    /// Consumes the end of input. Whatever an aborted parse left unread
    /// becomes skipped trivia of the `EOF` token.
    pub(crate) fn finish_input(&mut self) {
        let mut skipped = 0usize;
        while self.raw(self.pos).kind != EOF {
            self.pos += 1;
            self.events.push(Event::Skip { diagnostic: None });
            skipped += 1;
        }
        if skipped > 0 {
            debug!("{skipped} tokens left unparsed after an abort");
        }

        if let Some(fatal) = self.fatal.clone() {
            self.events.push(Event::Error(fatal));
        }
        self.pos += 1;
        self.events.push(Event::Token { kind: EOF, n_raw: 1 });
    }

    pub(crate) fn build_tree(self) -> GreenNode {
        let Parser { text, tokens, mut events, .. } = self;
        let mut builder = Builder::new(text);
        let mut raw = tokens.iter();
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent } => {
                                if kind != TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => builder.finish_node(),
                Event::Token { kind, n_raw } => {
                    let Some(first) = raw.next() else { unreachable!("ran out of tokens") };
                    let last = raw.by_ref().take(n_raw as usize - 1).last().unwrap_or(first);
                    let range = TextRange::new(first.kind_range.start(), last.kind_range.end());
                    builder.token(kind, &first.leading, range, last.trailing.clone());
                }
                Event::Missing { kind, diagnostic } => builder.missing(kind, diagnostic),
                Event::Skip { diagnostic } => {
                    let Some(token) = raw.next() else { unreachable!("ran out of tokens") };
                    builder.skip(&token.leading, token.kind_range, &token.trailing, diagnostic);
                }
                Event::Error(diagnostic) => builder.diagnostic(diagnostic),
                Event::NodeError(diagnostic) => builder.node_diagnostic(diagnostic),
            }
        }

        builder.finish()
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Finish,
    Token { kind: SyntaxKind, n_raw: u8 },
    Missing { kind: SyntaxKind, diagnostic: Option<Diagnostic> },
    Skip { diagnostic: Option<Diagnostic> },
    Error(Diagnostic),
    NodeError(Diagnostic),
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: TOMBSTONE, forward_parent: None };
}

#[derive(Clone, Copy)]
pub(crate) struct Checkpoint {
    pos: usize,
    events: usize,
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Marker {
        Marker {
            position: pos,
            bomb: DropBomb::new("Marker must be either completed or abandoned"),
        }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position, kind)
    }

    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();

        let idx = self.position as usize;
        if idx == p.events.len() - 1 {
            p.events.pop();
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct CompletedMarker {
    pos: u32,
    kind: SyntaxKind,
}

impl CompletedMarker {
    fn new(pos: u32, kind: SyntaxKind) -> Self {
        CompletedMarker { pos, kind }
    }

    pub(crate) fn kind(self) -> SyntaxKind {
        self.kind
    }

    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
