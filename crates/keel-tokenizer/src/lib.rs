//! Lexer for the C-family surface syntax.
//!
//! Produces one token at a time together with its leading and trailing
//! trivia. Trailing trivia ends after the first line break, so every comment
//! or directive that starts a line is leading trivia of the token below it.

mod cursor;

use cursor::{Cursor, EOF_CHAR};
pub use keel_syntax::SyntaxKind;
use keel_syntax::SyntaxKind::*;
use keel_syntax::{GreenTrivia, TriviaPiece, TriviaPieceKind};
use text_size::{TextLen, TextRange, TextSize};

#[derive(Debug, Clone)]
pub struct Token {
    pub leading: GreenTrivia,
    pub kind: SyntaxKind,
    pub kind_range: TextRange,
    pub trailing: GreenTrivia,
    /// A line break separates this token from the one before it.
    pub preceded_by_newline: bool,
}

impl Token {
    pub const EOF: Self = Self {
        kind: EOF,
        kind_range: TextRange::empty(TextSize::new(0)),
        leading: GreenTrivia::empty(),
        trailing: GreenTrivia::empty(),
        preceded_by_newline: false,
    };

    /// Range including leading and trailing trivia.
    pub fn full_range(&self) -> TextRange {
        TextRange::new(
            self.kind_range.start() - self.leading.len(),
            self.kind_range.end() + self.trailing.len(),
        )
    }
}

pub struct Tokenizer<'t> {
    text: &'t str,
    cursor: Cursor<'t>,
    current: Token,
    trivia_pieces: Vec<TriviaPiece>,
    line_start: bool,
    newline_pending: bool,
}

impl<'t> Tokenizer<'t> {
    pub fn new(text: &'t str) -> Self {
        let mut tokenizer = Self {
            text,
            cursor: Cursor::new(text),
            current: Token::EOF,
            trivia_pieces: Vec::with_capacity(4),
            line_start: true,
            newline_pending: false,
        };
        tokenizer.next_token();
        tokenizer
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    fn offset(&self) -> TextSize {
        self.text.text_len() - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let len = self.cursor.pos_within_token();
        TextRange::at(self.offset() - len, len)
    }

    fn token_text(&self) -> &'t str {
        &self.text[self.range()]
    }

    /// Returns the current token and scans the next one. Past the end of the
    /// input this keeps returning `EOF`.
    pub fn next_token(&mut self) -> Token {
        self.trivia(false);
        let trailing_start = self.trivia_pieces.len();
        let (kind, kind_range) = self.syntax_kind();
        if kind != EOF {
            self.line_start = false;
            self.trivia(true);
        }

        let (leading, trailing) = self.trivia_pieces.split_at(trailing_start);
        let preceded_by_newline =
            self.newline_pending || leading.iter().any(|piece| piece.is_newline());
        let leading = GreenTrivia::new(leading);
        let trailing = GreenTrivia::new(trailing);
        self.newline_pending = trailing.has_newline();

        self.trivia_pieces.clear();
        let token = Token { leading, kind, kind_range, trailing, preceded_by_newline };
        std::mem::replace(&mut self.current, token)
    }

    fn trivia(&mut self, trailing: bool) {
        while !self.cursor.is_eof() {
            let kind = match self.cursor.peek() {
                '\n' => {
                    self.cursor.advance();
                    TriviaPieceKind::Newline
                }
                '\r' => {
                    self.cursor.advance();
                    self.cursor.eat('\n');
                    TriviaPieceKind::Newline
                }
                '/' if self.cursor.second() == '/' => {
                    self.cursor.advance_while(|c| !is_newline(c));
                    TriviaPieceKind::SingleLineComment
                }
                '/' if self.cursor.second() == '*' => {
                    self.block_comment();
                    TriviaPieceKind::MultiLineComment
                }
                '#' if self.line_start => {
                    self.cursor.advance_while(|c| !is_newline(c));
                    TriviaPieceKind::Directive
                }
                c if is_whitespace(c) => {
                    self.cursor.advance_while(is_whitespace);
                    TriviaPieceKind::Whitespace
                }
                _ => break,
            };

            self.trivia_pieces.push(TriviaPiece::new(kind, self.cursor.pos_within_token()));
            self.cursor.reset_pos_within_token();

            match kind {
                TriviaPieceKind::Newline if trailing => break,
                TriviaPieceKind::Newline => self.line_start = true,
                TriviaPieceKind::Whitespace => {}
                _ => self.line_start = false,
            }
        }
    }

    fn block_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();
        while !self.cursor.is_eof() {
            if self.cursor.peek() == '*' && self.cursor.second() == '/' {
                self.cursor.advance();
                self.cursor.advance();
                return;
            }
            self.cursor.advance();
        }
    }

    fn syntax_kind(&mut self) -> (SyntaxKind, TextRange) {
        if self.cursor.is_eof() {
            return (EOF, TextRange::empty(self.offset()));
        }

        let kind = match self.cursor.advance() {
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ';' => SEMICOLON,
            ',' => COMMA,
            '~' => TILDE,
            '.' if self.cursor.peek().is_ascii_digit() => self.real_fraction(),
            '.' => DOT,
            ':' => self.compound(':', COLON2, COLON),
            '?' if self.cursor.eat('?') => self.compound('=', QUESTION2_EQ, QUESTION2),
            '?' => QUESTION,
            '=' if self.cursor.eat('>') => FAT_ARROW,
            '=' => self.compound('=', EQ2, EQ),
            '!' => self.compound('=', NEQ, BANG),
            '+' if self.cursor.eat('+') => PLUS2,
            '+' => self.compound('=', PLUS_EQ, PLUS),
            '-' if self.cursor.eat('-') => MINUS2,
            '-' if self.cursor.eat('>') => THIN_ARROW,
            '-' => self.compound('=', MINUS_EQ, MINUS),
            '*' => self.compound('=', STAR_EQ, STAR),
            '/' => self.compound('=', SLASH_EQ, SLASH),
            '%' => self.compound('=', PERCENT_EQ, PERCENT),
            '^' => self.compound('=', CARET_EQ, CARET),
            '&' if self.cursor.eat('&') => AMP2,
            '&' => self.compound('=', AMP_EQ, AMP),
            '|' if self.cursor.eat('|') => PIPE2,
            '|' => self.compound('=', PIPE_EQ, PIPE),
            '<' if self.cursor.eat('<') => self.compound('=', SHL_EQ, SHL),
            '<' => self.compound('=', LTEQ, LT),
            // `>>` and `>>=` are put together by the parser.
            '>' => self.compound('=', GTEQ, GT),
            first_char @ '0'..='9' => self.number(first_char),
            '\'' => self.quoted('\''),
            '"' if self.cursor.peek() == '"' && self.cursor.second() == '"' => self.raw_string(),
            '"' => self.quoted('"'),
            '@' => match self.cursor.peek() {
                '"' => {
                    self.cursor.advance();
                    self.verbatim_string()
                }
                '$' if self.cursor.second() == '"' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.interpolated_string(true)
                }
                c if is_ident_start(c) => {
                    self.cursor.advance_while(is_ident_continue);
                    IDENT
                }
                _ => UNKNOWN,
            },
            '$' => {
                self.cursor.advance_while(|c| c == '$');
                let verbatim = self.cursor.eat('@');
                if self.cursor.eat('"') { self.interpolated_string(verbatim) } else { UNKNOWN }
            }
            c if is_ident_start(c) => {
                self.cursor.advance_while(is_ident_continue);
                SyntaxKind::from_keyword(self.token_text()).unwrap_or(IDENT)
            }
            _ => UNKNOWN,
        };

        let range = self.range();
        self.cursor.reset_pos_within_token();

        (kind, range)
    }

    fn compound(&mut self, next: char, long: SyntaxKind, short: SyntaxKind) -> SyntaxKind {
        if self.cursor.eat(next) { long } else { short }
    }

    fn number(&mut self, c: char) -> SyntaxKind {
        if c == '0' && matches!(self.cursor.peek(), 'x' | 'X') {
            self.cursor.advance();
            self.digits(true);
            self.integer_suffix();
            return INT_NUMBER;
        }
        if c == '0' && matches!(self.cursor.peek(), 'b' | 'B') {
            self.cursor.advance();
            self.digits(false);
            self.integer_suffix();
            return INT_NUMBER;
        }

        self.digits(false);

        if self.cursor.matches('.') && self.cursor.second().is_ascii_digit() {
            self.cursor.advance();
            return self.real_fraction();
        }

        if self.float_exponent() || self.real_suffix() {
            return FLOAT_NUMBER;
        }

        self.integer_suffix();
        INT_NUMBER
    }

    /// Scans the digits after the decimal point.
    fn real_fraction(&mut self) -> SyntaxKind {
        self.digits(false);
        self.float_exponent();
        self.real_suffix();
        FLOAT_NUMBER
    }

    fn digits(&mut self, allow_hex: bool) {
        loop {
            match self.cursor.peek() {
                '_' | '0'..='9' => {
                    self.cursor.advance();
                }
                'a'..='f' | 'A'..='F' if allow_hex => {
                    self.cursor.advance();
                }
                _ => return,
            }
        }
    }

    fn float_exponent(&mut self) -> bool {
        if !matches!(self.cursor.peek(), 'e' | 'E') {
            return false;
        }

        let has_digits = match self.cursor.second() {
            '+' | '-' => self.cursor.nth(2).is_ascii_digit(),
            c => c.is_ascii_digit(),
        };
        if !has_digits {
            return false;
        }

        self.cursor.advance();
        if !self.cursor.eat('+') {
            self.cursor.eat('-');
        }
        self.digits(false);
        true
    }

    fn real_suffix(&mut self) -> bool {
        let suffix = matches!(self.cursor.peek(), 'f' | 'F' | 'd' | 'D' | 'm' | 'M');
        if suffix {
            self.cursor.advance();
        }
        suffix
    }

    fn integer_suffix(&mut self) {
        self.cursor.advance_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    }

    /// A character or regular string literal. Stops at the end of the line
    /// when unterminated.
    fn quoted(&mut self, quote: char) -> SyntaxKind {
        while !self.cursor.is_eof() {
            match self.cursor.peek() {
                c if c == quote => {
                    self.cursor.advance();
                    break;
                }
                '\\' => {
                    self.cursor.advance();
                    if !is_newline(self.cursor.peek()) {
                        self.cursor.advance();
                    }
                }
                c if is_newline(c) => break,
                _ => {
                    self.cursor.advance();
                }
            }
        }

        if quote == '\'' { CHAR_LITERAL } else { STRING_LITERAL }
    }

    fn verbatim_string(&mut self) -> SyntaxKind {
        while !self.cursor.is_eof() {
            if self.cursor.advance() == '"' && !self.cursor.eat('"') {
                break;
            }
        }
        STRING_LITERAL
    }

    fn raw_string(&mut self) -> SyntaxKind {
        let mut quotes = 1;
        while self.cursor.eat('"') {
            quotes += 1;
        }

        let mut closing = 0;
        while !self.cursor.is_eof() && closing < quotes {
            if self.cursor.advance() == '"' {
                closing += 1;
            } else {
                closing = 0;
            }
        }
        STRING_LITERAL
    }

    /// Interpolated strings are kept as one token. Holes are tracked only to
    /// find the closing quote.
    fn interpolated_string(&mut self, verbatim: bool) -> SyntaxKind {
        let mut depth = 0u32;

        while !self.cursor.is_eof() {
            match self.cursor.peek() {
                '"' if depth == 0 => {
                    self.cursor.advance();
                    if !(verbatim && self.cursor.eat('"')) {
                        break;
                    }
                }
                '\\' if depth == 0 && !verbatim => {
                    self.cursor.advance();
                    if !is_newline(self.cursor.peek()) {
                        self.cursor.advance();
                    }
                }
                '{' => {
                    self.cursor.advance();
                    if !(depth == 0 && self.cursor.eat('{')) {
                        depth += 1;
                    }
                }
                '}' => {
                    self.cursor.advance();
                    if depth == 0 {
                        self.cursor.eat('}');
                    } else {
                        depth -= 1;
                    }
                }
                quote @ ('"' | '\'') => {
                    self.cursor.advance();
                    self.quoted(quote);
                }
                c if is_newline(c) && depth == 0 && !verbatim => break,
                _ => {
                    self.cursor.advance();
                }
            }
        }

        INTERPOLATED_STRING
    }
}

fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

fn is_whitespace(c: char) -> bool {
    c != EOF_CHAR && !is_newline(c) && c.is_whitespace()
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_text<'a>(token: &Token, text: &'a str) -> &'a str {
        &text[token.kind_range]
    }

    fn kinds(text: &str) -> Vec<(SyntaxKind, &str)> {
        let mut tokenizer = Tokenizer::new(text);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token();
            if token.kind == EOF {
                break tokens;
            }
            tokens.push((token.kind, token_text(&token, text)));
        }
    }

    #[test]
    fn test_integer_literals() {
        let inputs = ["123", "0", "0b1010", "0x1f", "0XFFul", "123_456", "42L", "7u"];

        for input in inputs {
            let mut tokenizer = Tokenizer::new(input);
            let kind = tokenizer.next_token().kind;
            assert_eq!(kind, INT_NUMBER, "Input: '{input}'");
            assert!(
                tokenizer.cursor.is_eof(),
                "Tokenizer did not consume all input for '{input}'"
            );
        }
    }

    #[test]
    fn test_float_literals() {
        let inputs = ["123.456", "0.0", "1e10", "1.0e-5", ".5", "2f", "3.5m", "1_000.25D"];

        for input in inputs {
            let mut tokenizer = Tokenizer::new(input);
            let kind = tokenizer.next_token().kind;
            assert_eq!(kind, FLOAT_NUMBER, "Input: '{input}'");
            assert!(
                tokenizer.cursor.is_eof(),
                "Tokenizer did not consume all input for '{input}'"
            );
        }
    }

    #[test]
    fn test_member_access_on_integer() {
        assert_eq!(kinds("1.ToString"), [(INT_NUMBER, "1"), (DOT, "."), (IDENT, "ToString")]);
    }

    #[test]
    fn test_keywords_and_contextual_keywords() {
        assert_eq!(
            kinds("public partial class record where"),
            [
                (PUBLIC_KW, "public"),
                (IDENT, "partial"),
                (CLASS_KW, "class"),
                (IDENT, "record"),
                (IDENT, "where"),
            ]
        );
    }

    #[test]
    fn test_verbatim_identifier() {
        assert_eq!(kinds("@class @foo"), [(IDENT, "@class"), (IDENT, "@foo")]);
    }

    #[test]
    fn test_greater_than_is_never_combined() {
        assert_eq!(
            kinds("a >> b >>= c >= d"),
            [
                (IDENT, "a"),
                (GT, ">"),
                (GT, ">"),
                (IDENT, "b"),
                (GT, ">"),
                (GTEQ, ">="),
                (IDENT, "c"),
                (GTEQ, ">="),
                (IDENT, "d"),
            ]
        );
    }

    #[test]
    fn test_compound_operators() {
        assert_eq!(
            kinds("a ?? b ??= c => d -> e :: f <<= g && h || i != j"),
            [
                (IDENT, "a"),
                (QUESTION2, "??"),
                (IDENT, "b"),
                (QUESTION2_EQ, "??="),
                (IDENT, "c"),
                (FAT_ARROW, "=>"),
                (IDENT, "d"),
                (THIN_ARROW, "->"),
                (IDENT, "e"),
                (COLON2, "::"),
                (IDENT, "f"),
                (SHL_EQ, "<<="),
                (IDENT, "g"),
                (AMP2, "&&"),
                (IDENT, "h"),
                (PIPE2, "||"),
                (IDENT, "i"),
                (NEQ, "!="),
                (IDENT, "j"),
            ]
        );
    }

    #[test]
    fn test_postfix_and_prefix_increments() {
        assert_eq!(
            kinds("x++ + ++y"),
            [(IDENT, "x"), (PLUS2, "++"), (PLUS, "+"), (PLUS2, "++"), (IDENT, "y")]
        );
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            kinds(r#""a\"b" @"c""d" 'x' '\'' """raw "text" """"#),
            [
                (STRING_LITERAL, r#""a\"b""#),
                (STRING_LITERAL, r#"@"c""d""#),
                (CHAR_LITERAL, "'x'"),
                (CHAR_LITERAL, r"'\''"),
                (STRING_LITERAL, r#""""raw "text" """"#),
            ]
        );
    }

    #[test]
    fn test_interpolated_strings() {
        assert_eq!(
            kinds(r#"$"a {b} {{c}} {d["e"]}" + $@"f{g}""#),
            [
                (INTERPOLATED_STRING, r#"$"a {b} {{c}} {d["e"]}""#),
                (PLUS, "+"),
                (INTERPOLATED_STRING, r#"$@"f{g}""#),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        let text = "\"abc\nx";
        assert_eq!(kinds(text), [(STRING_LITERAL, "\"abc"), (IDENT, "x")]);
    }

    #[test]
    fn test_unknown_characters() {
        assert_eq!(kinds("a ` b"), [(IDENT, "a"), (UNKNOWN, "`"), (IDENT, "b")]);
        assert_eq!(kinds("x # y"), [(IDENT, "x"), (UNKNOWN, "#"), (IDENT, "y")]);
    }

    #[test]
    fn test_trailing_trivia_stops_after_newline() {
        let text = "a // one\n  // two\n  b";
        let mut tokenizer = Tokenizer::new(text);

        let a = tokenizer.next_token();
        let kinds: Vec<_> = a.trailing.pieces().iter().map(|piece| piece.kind).collect();
        let expected = [
            TriviaPieceKind::Whitespace,
            TriviaPieceKind::SingleLineComment,
            TriviaPieceKind::Newline,
        ];
        assert_eq!(kinds, expected);
        assert!(!a.preceded_by_newline);

        let b = tokenizer.next_token();
        assert_eq!(token_text(&b, text), "b");
        assert_eq!(b.leading.pieces().len(), 4);
        assert!(b.preceded_by_newline);
        assert_eq!(a.full_range().end(), b.full_range().start());
    }

    #[test]
    fn test_directives_are_trivia_at_line_start() {
        let text = "#region A\n  #if DEBUG\nclass";
        let mut tokenizer = Tokenizer::new(text);

        let token = tokenizer.next_token();
        assert_eq!(token.kind, CLASS_KW);
        let directives = token
            .leading
            .pieces()
            .iter()
            .filter(|piece| piece.kind == TriviaPieceKind::Directive)
            .count();
        assert_eq!(directives, 2);
    }

    #[test]
    fn test_block_comments() {
        let text = "a /* x\n y */ b /* open";
        let mut tokenizer = Tokenizer::new(text);

        let a = tokenizer.next_token();
        assert_eq!(a.trailing.pieces()[1].kind, TriviaPieceKind::MultiLineComment);

        let b = tokenizer.next_token();
        assert_eq!(token_text(&b, text), "b");
        assert!(!b.preceded_by_newline);

        let eof = tokenizer.next_token();
        assert_eq!(eof.kind, EOF);
        assert_eq!(b.full_range().end(), TextSize::of(text));
    }

    #[test]
    fn test_tokens_cover_the_whole_text() {
        let text = "namespace N {\r\n  class C { int x = 1; } // done\n}\n\n";
        let mut tokenizer = Tokenizer::new(text);
        let mut end = TextSize::new(0);

        loop {
            let token = tokenizer.next_token();
            assert_eq!(token.full_range().start(), end);
            end = token.full_range().end();
            if token.kind == EOF {
                break;
            }
        }

        assert_eq!(end, TextSize::of(text));
    }

    #[test]
    fn test_eof_repeats() {
        let mut tokenizer = Tokenizer::new("x");
        assert_eq!(tokenizer.next_token().kind, IDENT);
        assert_eq!(tokenizer.next_token().kind, EOF);
        assert_eq!(tokenizer.next_token().kind, EOF);
        assert_eq!(tokenizer.peek().kind, EOF);
    }
}
