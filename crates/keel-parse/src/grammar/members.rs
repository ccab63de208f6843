use keel_errors::{Diagnostic, ErrorCode};
use keel_syntax::SyntaxKind::*;

use super::accessors::{self, AccessorOwner};
use super::{ListContext, exprs, items, operators, stmts, types};
use crate::options::Feature;
use crate::parser::{Marker, Parser};

/// Parses one member of a compilation unit, namespace or type body.
///
/// Returns `false`, having consumed nothing, when the current token cannot
/// start a member; the caller then decides how to skip it.
pub(crate) fn member(p: &mut Parser<'_>, ctx: ListContext) -> bool {
    p.nested(|p| member_inner(p, ctx)).unwrap_or(false)
}

fn member_inner(p: &mut Parser<'_>, ctx: ListContext) -> bool {
    let start = p.position();
    let m = p.start();
    items::attribute_lists(p);
    items::modifiers(p);

    if items::at_type_decl(p) {
        items::type_decl(p, m);
        return true;
    }

    match p.current() {
        EVENT_KW => {
            event_decl(p, m);
            return true;
        }
        TILDE => {
            destructor(p, m);
            return true;
        }
        IMPLICIT_KW | EXPLICIT_KW => {
            operators::conversion_operator(p, m);
            return true;
        }
        OPERATOR_KW => {
            operators::operator_decl(p, m);
            return true;
        }
        IDENT if p.nth_at(1, LEFT_PAREN) && matches!(ctx, ListContext::Type(_)) => {
            constructor(p, m);
            return true;
        }
        _ => {}
    }

    if let Some(n) = types::scan_type(p, 0) {
        match p.nth(n) {
            OPERATOR_KW => operators::operator_decl(p, m),
            IMPLICIT_KW | EXPLICIT_KW if p.nth_at(n + 1, OPERATOR_KW) => {
                operators::bad_conversion_operator(p, m);
            }
            THIS_KW => indexer(p, m, 0),
            IDENT => {
                let (segments, k) = explicit_interface_segments(p, n);
                if p.nth_at(k, THIS_KW) {
                    indexer(p, m, segments);
                    return true;
                }
                match p.nth(k + 1) {
                    LEFT_PAREN | LT => method(p, m, segments),
                    LEFT_BRACE | FAT_ARROW => property(p, m, segments),
                    _ => field(p, m),
                }
            }
            EQ | COMMA => field(p, m),
            _ => {
                types::ty_or_missing(p);
                if !p.at(RIGHT_BRACE) && !p.at(EOF) {
                    let text = p.nth_text(0);
                    let range = p.current_range();
                    p.error(Diagnostic::with_args(ErrorCode::InvalidMemberDecl, range, [text]));
                }
                incomplete_member(p, m);
            }
        }
        return true;
    }

    if p.position() == start {
        m.abandon(p);
        return false;
    }

    incomplete_member(p, m);
    true
}

/// Attributes, modifiers or a type with nothing usable after them. The token
/// that stopped the member is left for the enclosing list to skip.
fn incomplete_member(p: &mut Parser<'_>, m: Marker) {
    if p.at(RIGHT_BRACE) {
        let range = p.current_range();
        p.error(Diagnostic::with_args(ErrorCode::InvalidMemberDecl, range, ["}"]));
    } else if p.at(EOF) {
        p.expect(IDENT);
    }
    m.complete(p, INCOMPLETE_MEMBER);
}

/// Counts the `I.J.` segments of an explicit interface prefix starting at
/// the name `n` tokens ahead. Returns the count and the offset of the member
/// name that follows them.
fn explicit_interface_segments(p: &mut Parser<'_>, n: usize) -> (usize, usize) {
    let mut segments = 0;
    let mut k = n;
    while let Some(end) = types::scan_simple_name(p, k) {
        if !(p.nth_at(end, DOT) && matches!(p.nth(end + 1), IDENT | THIS_KW)) {
            break;
        }
        segments += 1;
        k = end + 1;
    }
    (segments, k)
}

fn member_name(p: &mut Parser<'_>, segments: usize) {
    if segments > 0 {
        types::explicit_interface(p, segments);
    }
    p.expect(IDENT);
}

fn field(p: &mut Parser<'_>, m: Marker) {
    stmts::variable_decl(p);
    p.expect(SEMICOLON);
    m.complete(p, FIELD_DECL);
}

fn method(p: &mut Parser<'_>, m: Marker, segments: usize) {
    types::ty_or_missing(p);
    member_name(p, segments);

    let generic = p.at(LT);
    if generic {
        items::type_param_list(p);
    }
    items::param_list(p);
    items::constraint_clauses(p, generic, true);

    method_body(p);
    m.complete(p, METHOD_DECL);
}

/// A block, `=> expr;`, or just `;`.
pub(crate) fn method_body(p: &mut Parser<'_>) {
    match p.current() {
        LEFT_BRACE => {
            stmts::block(p);
        }
        FAT_ARROW => {
            exprs::arrow_expr_clause(p, Feature::ExpressionBodiedMethod);
            p.expect(SEMICOLON);
        }
        _ => {
            p.expect(SEMICOLON);
        }
    }
}

fn property(p: &mut Parser<'_>, m: Marker, segments: usize) {
    types::ty_or_missing(p);
    member_name(p, segments);
    property_body(p);
    m.complete(p, PROPERTY_DECL);
}

fn property_body(p: &mut Parser<'_>) {
    if p.at(FAT_ARROW) {
        exprs::arrow_expr_clause(p, Feature::ExpressionBodiedProperty);
        p.expect(SEMICOLON);
        return;
    }

    accessors::accessor_list(p, AccessorOwner::Property);
    if p.at(EQ) {
        let range = p.current_range();
        p.feature(Feature::AutoPropertyInitializer, range);
        exprs::equals_value_clause(p);
        p.expect(SEMICOLON);
    }
}

fn indexer(p: &mut Parser<'_>, m: Marker, segments: usize) {
    types::ty_or_missing(p);
    if segments > 0 {
        types::explicit_interface(p, segments);
    }
    p.expect(THIS_KW);
    items::bracketed_param_list(p);
    property_body(p);
    m.complete(p, INDEXER_DECL);
}

fn constructor(p: &mut Parser<'_>, m: Marker) {
    p.advance();
    items::param_list(p);

    if p.at(COLON) {
        let initializer = p.start();
        p.advance();
        if matches!(p.current(), THIS_KW | BASE_KW) {
            p.advance();
        } else {
            let diagnostic = Diagnostic::new(ErrorCode::ThisOrBaseExpected, p.expected_range());
            p.missing(THIS_KW, Some(diagnostic));
        }
        if p.at(LEFT_PAREN) {
            exprs::arg_list(p);
        }
        initializer.complete(p, CONSTRUCTOR_INITIALIZER);
    }

    method_body(p);
    m.complete(p, CONSTRUCTOR_DECL);
}

fn destructor(p: &mut Parser<'_>, m: Marker) {
    p.advance();
    p.expect(IDENT);
    items::param_list(p);
    method_body(p);
    m.complete(p, DESTRUCTOR_DECL);
}

/// `event T E;` declares event fields; `event T E { add {} remove {} }` and
/// explicit implementations carry accessors.
fn event_decl(p: &mut Parser<'_>, m: Marker) {
    p.advance();

    let n = types::scan_type(p, 0).unwrap_or(0);
    let (segments, k) = explicit_interface_segments(p, n);
    let has_accessors = segments > 0 || p.nth_at(k, LEFT_BRACE) || p.nth_at(k + 1, LEFT_BRACE);

    if has_accessors {
        types::ty_or_missing(p);
        member_name(p, segments);
        accessors::accessor_list(p, AccessorOwner::Event);
        m.complete(p, EVENT_DECL);
    } else {
        stmts::variable_decl(p);
        p.expect(SEMICOLON);
        m.complete(p, EVENT_FIELD_DECL);
    }
}
