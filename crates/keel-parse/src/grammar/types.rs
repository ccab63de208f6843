use keel_errors::{Diagnostic, ErrorCode};
use keel_syntax::SyntaxKind::*;
use keel_syntax::SyntaxSet;

use super::{exprs, separated};
use crate::parser::{CompletedMarker, Parser};

pub(crate) const PREDEFINED_TYPES: SyntaxSet = SyntaxSet::new([
    BOOL_KW,
    BYTE_KW,
    CHAR_KW,
    DECIMAL_KW,
    DOUBLE_KW,
    FLOAT_KW,
    INT_KW,
    LONG_KW,
    OBJECT_KW,
    SBYTE_KW,
    SHORT_KW,
    STRING_KW,
    UINT_KW,
    ULONG_KW,
    USHORT_KW,
    VOID_KW,
]);

pub(crate) const TYPE_FIRST: SyntaxSet =
    PREDEFINED_TYPES.union(&SyntaxSet::new([IDENT, LEFT_PAREN]));

// Scanners. They only peek, and return the offset just past what they
// recognised.

/// Scans a type starting `n` tokens ahead.
pub(crate) fn scan_type(p: &mut Parser<'_>, n: usize) -> Option<usize> {
    scan_type_at(p, n, 0)
}

fn scan_type_at(p: &mut Parser<'_>, n: usize, depth: u32) -> Option<usize> {
    if depth > p.max_depth() {
        return None;
    }

    let mut n = match p.nth(n) {
        kind if kind.is_predefined_type() => n + 1,
        IDENT => scan_name(p, n, depth)?,
        LEFT_PAREN => scan_tuple_type(p, n, depth)?,
        _ => return None,
    };

    loop {
        match p.nth(n) {
            QUESTION | STAR => n += 1,
            LEFT_BRACKET => {
                let mut k = n + 1;
                while p.nth_at(k, COMMA) {
                    k += 1;
                }
                if !p.nth_at(k, RIGHT_BRACKET) {
                    break;
                }
                n = k + 1;
            }
            _ => break,
        }
    }

    Some(n)
}

fn scan_name(p: &mut Parser<'_>, n: usize, depth: u32) -> Option<usize> {
    let mut n = scan_simple_name_at(p, n, depth)?;
    if p.nth_at(n, COLON2) {
        n = scan_simple_name_at(p, n + 1, depth)?;
    }
    while p.nth_at(n, DOT) && p.nth_at(n + 1, IDENT) {
        n = scan_simple_name_at(p, n + 1, depth)?;
    }
    Some(n)
}

/// An identifier with optional type arguments.
pub(crate) fn scan_simple_name(p: &mut Parser<'_>, n: usize) -> Option<usize> {
    scan_simple_name_at(p, n, 0)
}

fn scan_simple_name_at(p: &mut Parser<'_>, n: usize, depth: u32) -> Option<usize> {
    if !p.nth_at(n, IDENT) {
        return None;
    }
    if p.nth_at(n + 1, LT) {
        if let Some(end) = scan_type_args_at(p, n + 1, depth) {
            return Some(end);
        }
    }
    Some(n + 1)
}

/// Scans `<T, U>` starting at the `<` found `n` tokens ahead.
pub(crate) fn scan_type_args(p: &mut Parser<'_>, n: usize) -> Option<usize> {
    scan_type_args_at(p, n, 0)
}

fn scan_type_args_at(p: &mut Parser<'_>, n: usize, depth: u32) -> Option<usize> {
    let mut k = n + 1;
    loop {
        k = scan_type_at(p, k, depth + 1)?;
        match p.nth(k) {
            COMMA => k += 1,
            GT => return Some(k + 1),
            _ => return None,
        }
    }
}

fn scan_tuple_type(p: &mut Parser<'_>, n: usize, depth: u32) -> Option<usize> {
    let mut k = n + 1;
    let mut elements = 0;
    loop {
        k = scan_type_at(p, k, depth + 1)?;
        if p.nth_at(k, IDENT) {
            k += 1;
        }
        elements += 1;

        match p.nth(k) {
            COMMA => k += 1,
            RIGHT_PAREN if elements >= 2 => return Some(k + 1),
            _ => return None,
        }
    }
}

// Parsers.

pub(crate) fn ty(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    ty_with(p, false)
}

pub(crate) fn ty_or_missing(p: &mut Parser<'_>) -> CompletedMarker {
    match ty(p) {
        Some(ty) => ty,
        None => missing_type(p),
    }
}

/// The type operand of `is` and `as`, where `?` is only a nullable suffix if
/// no expression follows it.
pub(crate) fn ty_in_expr(p: &mut Parser<'_>) -> CompletedMarker {
    match ty_with(p, true) {
        Some(ty) => ty,
        None => missing_type(p),
    }
}

pub(crate) fn missing_type(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    let diagnostic = Diagnostic::new(ErrorCode::TypeExpected, p.expected_range());
    p.missing(IDENT, Some(diagnostic));
    m.complete(p, IDENTIFIER_NAME)
}

fn ty_with(p: &mut Parser<'_>, in_expr: bool) -> Option<CompletedMarker> {
    if !p.at_set(&TYPE_FIRST) {
        return None;
    }

    p.nested(|p| {
        let mut ty = match p.current() {
            IDENT => name(p),
            LEFT_PAREN => tuple_type(p),
            _ => {
                let m = p.start();
                p.advance();
                m.complete(p, PREDEFINED_TYPE)
            }
        };

        loop {
            ty = match p.current() {
                QUESTION if !in_expr || !exprs::at_expr_start(p, 1) => {
                    let m = ty.precede(p);
                    p.advance();
                    m.complete(p, NULLABLE_TYPE)
                }
                STAR => {
                    let m = ty.precede(p);
                    p.advance();
                    m.complete(p, POINTER_TYPE)
                }
                LEFT_BRACKET if matches!(p.nth(1), RIGHT_BRACKET | COMMA) => {
                    let m = ty.precede(p);
                    while p.at(LEFT_BRACKET) && matches!(p.nth(1), RIGHT_BRACKET | COMMA) {
                        let rank = p.start();
                        p.advance();
                        while p.eat(COMMA) {}
                        p.expect(RIGHT_BRACKET);
                        rank.complete(p, ARRAY_RANK_SPECIFIER);
                    }
                    m.complete(p, ARRAY_TYPE)
                }
                _ => break ty,
            };
        }
    })
}

/// A possibly qualified name: `A`, `A<T>.B`, `global::A.B`.
pub(crate) fn name(p: &mut Parser<'_>) -> CompletedMarker {
    let mut name = simple_name(p);

    if p.at(COLON2) {
        let m = name.precede(p);
        p.advance();
        simple_name(p);
        name = m.complete(p, ALIAS_QUALIFIED_NAME);
    }

    while p.at(DOT) {
        let m = name.precede(p);
        p.advance();
        simple_name(p);
        name = m.complete(p, QUALIFIED_NAME);
    }

    name
}

pub(crate) fn simple_name(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.expect(IDENT);
    if p.at(LT) {
        type_arg_list(p);
        m.complete(p, GENERIC_NAME)
    } else {
        m.complete(p, IDENTIFIER_NAME)
    }
}

/// The `I.J.` prefix of an explicitly implemented member, `segments` names
/// long, trailing dot included.
pub(crate) fn explicit_interface(p: &mut Parser<'_>, segments: usize) {
    let mut name = simple_name(p);
    for _ in 1..segments {
        let m = name.precede(p);
        p.advance();
        simple_name(p);
        name = m.complete(p, QUALIFIED_NAME);
    }
    p.expect(DOT);
}

pub(crate) fn type_arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    separated(p, GT, false, &TYPE_FIRST, |p| {
        ty_or_missing(p);
    });
    p.expect(GT);
    m.complete(p, TYPE_ARG_LIST);
}

fn tuple_type(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();
    separated(p, RIGHT_PAREN, false, &TYPE_FIRST, |p| {
        let element = p.start();
        ty_or_missing(p);
        p.eat(IDENT);
        element.complete(p, TUPLE_ELEMENT);
    });
    p.expect(RIGHT_PAREN);
    m.complete(p, TUPLE_TYPE)
}
