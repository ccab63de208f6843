//! Operator and conversion operator declarations.
//!
//! The operator token is checked against the number of parameters, which is
//! counted ahead of time so the diagnostic lands on the operator itself.

use keel_errors::{Diagnostic, ErrorCode, TextRange};
use keel_syntax::SyntaxKind::*;
use keel_syntax::SyntaxSet;

use super::types;
use super::{items, members};
use crate::parser::{Marker, Parser};

const UNARY: SyntaxSet =
    SyntaxSet::new([PLUS, MINUS, BANG, TILDE, PLUS2, MINUS2, TRUE_KW, FALSE_KW]);

const BINARY: SyntaxSet = SyntaxSet::new([
    PLUS, MINUS, STAR, SLASH, PERCENT, AMP, PIPE, CARET, SHL, SHR, EQ2, NEQ, GT, LT, GTEQ, LTEQ,
]);

/// `T operator op(...)`, with the return type still ahead.
pub(crate) fn operator_decl(p: &mut Parser<'_>, m: Marker) {
    types::ty_or_missing(p);
    p.expect(OPERATOR_KW);
    operator_token(p);
    items::param_list(p);
    members::method_body(p);
    m.complete(p, OPERATOR_DECL);
}

/// `implicit operator T(...)` and `explicit operator T(...)`.
pub(crate) fn conversion_operator(p: &mut Parser<'_>, m: Marker) {
    p.advance();
    p.expect(OPERATOR_KW);
    types::ty_or_missing(p);
    items::param_list(p);
    members::method_body(p);
    m.complete(p, CONVERSION_OPERATOR_DECL);
}

/// `T implicit operator (...)`: the conversion keyword after a return type.
/// The type is flagged as misplaced, `operator` as missing before the
/// keyword, and the keyword stands in for the operator token.
pub(crate) fn bad_conversion_operator(p: &mut Parser<'_>, m: Marker) {
    let start = p.current_range().start();
    types::ty_or_missing(p);
    let range = TextRange::new(start, p.prev_end());
    p.error(Diagnostic::with_args(ErrorCode::BadOperatorSyntax, range, ["+"]));

    let code = arity_code(count_params(p, 2));
    let diagnostic = p.expected(OPERATOR_KW);
    p.missing(OPERATOR_KW, Some(diagnostic));
    let range = p.current_range();
    p.error_at(code, range);
    p.advance();

    items::param_list(p);
    members::method_body(p);
    m.complete(p, OPERATOR_DECL);
}

fn arity_code(params: usize) -> ErrorCode {
    match params {
        1 => ErrorCode::OvlUnaryOperatorExpected,
        2 => ErrorCode::OvlBinaryOperatorExpected,
        _ => ErrorCode::OvlOperatorExpected,
    }
}

/// The operator after `operator`. An overloadable one only complains when it
/// cannot take the declared number of parameters. Any other token stands in
/// for it, and the diagnostic names the arity the parameters ask for.
fn operator_token(p: &mut Parser<'_>) {
    let (op, n_raw) = p.current_op();

    if UNARY.contains(op) || BINARY.contains(op) {
        let params = count_params(p, n_raw as usize);
        let code = match params {
            1 if !UNARY.contains(op) => Some(ErrorCode::OvlUnaryOperatorExpected),
            2 if !BINARY.contains(op) => Some(ErrorCode::OvlBinaryOperatorExpected),
            _ => None,
        };
        if let Some(code) = code {
            let range = p.current_range();
            p.error_at(code, range);
        }
        p.advance_as(op, n_raw);
        return;
    }

    if matches!(p.current(), LEFT_BRACE | RIGHT_BRACE | SEMICOLON | EOF) {
        let code = arity_code(count_params(p, 0));
        let diagnostic = Diagnostic::new(code, p.expected_range());
        p.missing(PLUS, Some(diagnostic));
        return;
    }

    let code = arity_code(count_params(p, 1));
    let range = p.current_range();
    p.error_at(code, range);
    p.advance();
}

/// Number of parameters in the list whose `(` is `n` tokens ahead, counted
/// by top-level commas. A list missing its `(` is counted from `n` itself.
fn count_params(p: &mut Parser<'_>, n: usize) -> usize {
    let start = if p.nth_at(n, LEFT_PAREN) { n + 1 } else { n };
    if matches!(p.nth(start), RIGHT_PAREN | EOF | LEFT_BRACE | SEMICOLON) {
        return 0;
    }

    let mut depth = 0usize;
    let mut commas = 0;
    let mut k = start;
    loop {
        match p.nth(k) {
            LEFT_PAREN | LEFT_BRACKET | LT => depth += 1,
            RIGHT_PAREN if depth == 0 => break,
            RIGHT_PAREN | RIGHT_BRACKET | GT => depth = depth.saturating_sub(1),
            COMMA if depth == 0 => commas += 1,
            EOF | LEFT_BRACE | SEMICOLON => break,
            _ => {}
        }
        k += 1;
    }
    commas + 1
}
