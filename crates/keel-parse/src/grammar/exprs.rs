use keel_errors::{Diagnostic, ErrorCode};
use keel_syntax::SyntaxKind::{self, *};
use keel_syntax::SyntaxSet;
use text_size::TextRange;

use super::types::{self, PREDEFINED_TYPES};
use super::{items, separated, stmts};
use crate::options::Feature;
use crate::parser::{CompletedMarker, Parser};

pub(crate) const EXPR_FIRST: SyntaxSet = PREDEFINED_TYPES.union(&SyntaxSet::new([
    IDENT,
    INT_NUMBER,
    FLOAT_NUMBER,
    CHAR_LITERAL,
    STRING_LITERAL,
    INTERPOLATED_STRING,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    THIS_KW,
    BASE_KW,
    NEW_KW,
    TYPEOF_KW,
    SIZEOF_KW,
    DEFAULT_KW,
    CHECKED_KW,
    UNCHECKED_KW,
    DELEGATE_KW,
    THROW_KW,
    LEFT_PAREN,
    PLUS,
    MINUS,
    BANG,
    TILDE,
    PLUS2,
    MINUS2,
    AMP,
    STAR,
]));

const ARG_FIRST: SyntaxSet = EXPR_FIRST.union(&SyntaxSet::new([REF_KW, OUT_KW, IN_KW]));

const INITIALIZER_FIRST: SyntaxSet =
    EXPR_FIRST.union(&SyntaxSet::new([LEFT_BRACE, LEFT_BRACKET]));

/// Tokens after which `name<...>` in an expression is a generic name rather
/// than a comparison.
const TYPE_ARGS_FOLLOW: SyntaxSet = SyntaxSet::new([
    LEFT_PAREN,
    RIGHT_PAREN,
    RIGHT_BRACKET,
    RIGHT_BRACE,
    COLON,
    SEMICOLON,
    COMMA,
    DOT,
    QUESTION,
    EQ2,
    NEQ,
    PIPE,
    CARET,
    AMP2,
    PIPE2,
    AMP,
    LEFT_BRACKET,
    EOF,
]);

pub(crate) fn at_expr_start(p: &mut Parser<'_>, n: usize) -> bool {
    EXPR_FIRST.contains(p.nth(n))
}

/// Parses an expression. Where no operand can start, a missing identifier
/// stands in for it, and the operators that follow still apply.
pub(crate) fn expr(p: &mut Parser<'_>) -> CompletedMarker {
    match p.nested(assignment_expr) {
        Some(expr) => expr,
        None => missing_term(p),
    }
}

fn missing_term(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    let found = p.nth_text(0);
    let diagnostic =
        Diagnostic::with_args(ErrorCode::InvalidExprTerm, p.expected_range(), [found]);
    p.missing(IDENT, Some(diagnostic));
    m.complete(p, IDENTIFIER_NAME)
}

/// Assignment is right-associative. A chain is parsed in a loop, with the
/// outer assignments kept open until the last operand is in.
fn assignment_expr(p: &mut Parser<'_>) -> CompletedMarker {
    if let Some(lambda) = lambda_expr(p) {
        return lambda;
    }

    let mut rhs = conditional_expr(p);
    let mut open = Vec::new();
    loop {
        let (op, n_raw) = p.current_op();
        if !op.is_assignment_op() {
            break;
        }

        open.push(rhs.precede(p));
        p.advance_as(op, n_raw);
        rhs = match lambda_expr(p) {
            Some(lambda) => lambda,
            None => conditional_expr(p),
        };
    }

    while let Some(m) = open.pop() {
        rhs = m.complete(p, ASSIGNMENT_EXPR);
    }
    rhs
}

fn conditional_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let condition = binary_expr(p, 0);
    if !p.at(QUESTION) {
        return condition;
    }

    let m = condition.precede(p);
    p.advance();
    expr(p);
    p.expect(COLON);
    expr(p);
    m.complete(p, CONDITIONAL_EXPR)
}

fn binary_precedence(op: SyntaxKind) -> Option<u8> {
    let precedence = match op {
        QUESTION2 => 1,
        PIPE2 => 2,
        AMP2 => 3,
        PIPE => 4,
        CARET => 5,
        AMP => 6,
        EQ2 | NEQ => 7,
        LT | GT | LTEQ | GTEQ | IS_KW | AS_KW => 8,
        SHL | SHR => 9,
        PLUS | MINUS => 10,
        STAR | SLASH | PERCENT => 11,
        _ => return None,
    };
    Some(precedence)
}

fn binary_expr(p: &mut Parser<'_>, min_precedence: u8) -> CompletedMarker {
    let mut lhs = unary_expr(p);

    loop {
        let (op, n_raw) = p.current_op();
        let Some(precedence) = binary_precedence(op) else { break };
        if precedence < min_precedence {
            break;
        }

        let m = lhs.precede(p);
        p.advance_as(op, n_raw);

        lhs = match op {
            IS_KW => {
                types::ty_in_expr(p);
                m.complete(p, IS_EXPR)
            }
            AS_KW => {
                types::ty_in_expr(p);
                m.complete(p, AS_EXPR)
            }
            _ => {
                // `??` is right-associative.
                let next = if op == QUESTION2 { precedence } else { precedence + 1 };
                if p.nested(|p| binary_expr(p, next)).is_none() {
                    missing_term(p);
                }
                m.complete(p, BINARY_EXPR)
            }
        };
    }

    lhs
}

/// Prefix operators are collected in a loop and closed around the operand,
/// so a long run of them costs no nesting.
fn unary_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let mut prefixes = Vec::new();
    while matches!(p.current(), PLUS | MINUS | BANG | TILDE | PLUS2 | MINUS2 | AMP | STAR) {
        let m = p.start();
        p.advance();
        prefixes.push(m);
    }

    let mut operand = if prefixes.is_empty() {
        unary_operand(p)
    } else {
        match p.nested(unary_operand) {
            Some(operand) => operand,
            None => missing_term(p),
        }
    };
    while let Some(m) = prefixes.pop() {
        operand = m.complete(p, PREFIX_UNARY_EXPR);
    }
    operand
}

fn unary_operand(p: &mut Parser<'_>) -> CompletedMarker {
    match p.current() {
        LEFT_PAREN if at_cast(p) => {
            let m = p.start();
            p.advance();
            types::ty_or_missing(p);
            p.expect(RIGHT_PAREN);
            if p.nested(unary_expr).is_none() {
                missing_term(p);
            }
            m.complete(p, CAST_EXPR)
        }
        THROW_KW => {
            let m = p.start();
            p.advance();
            expr(p);
            m.complete(p, THROW_EXPR)
        }
        IDENT if p.at_contextual("await") && at_await_operand(p) => {
            let m = p.start();
            p.advance();
            if p.nested(unary_expr).is_none() {
                missing_term(p);
            }
            m.complete(p, AWAIT_EXPR)
        }
        _ => postfix_expr(p),
    }
}

fn at_await_operand(p: &mut Parser<'_>) -> bool {
    matches!(p.nth(1), IDENT | THIS_KW | BASE_KW | NEW_KW) || p.nth(1).is_literal()
}

/// `(T)x`: a parenthesised type followed by something that can only be an
/// operand. Predefined types are casts in front of any operand.
fn at_cast(p: &mut Parser<'_>) -> bool {
    let Some(n) = types::scan_type(p, 1) else { return false };
    if !p.nth_at(n, RIGHT_PAREN) {
        return false;
    }

    let after = p.nth(n + 1);
    if p.nth(1).is_predefined_type() {
        return EXPR_FIRST.contains(after) && after != THROW_KW;
    }

    after.is_literal()
        || matches!(
            after,
            IDENT
                | LEFT_PAREN
                | THIS_KW
                | BASE_KW
                | NEW_KW
                | BANG
                | TILDE
                | TYPEOF_KW
                | SIZEOF_KW
                | DEFAULT_KW
                | CHECKED_KW
                | UNCHECKED_KW
                | DELEGATE_KW
        )
        || PREDEFINED_TYPES.contains(after)
}

fn postfix_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let primary = primary_expr(p);
    postfix_ops(p, primary)
}

fn postfix_ops(p: &mut Parser<'_>, mut lhs: CompletedMarker) -> CompletedMarker {
    loop {
        lhs = match p.current() {
            DOT | THIN_ARROW => {
                let m = lhs.precede(p);
                p.advance();
                name_in_expr(p);
                m.complete(p, MEMBER_ACCESS_EXPR)
            }
            LEFT_PAREN => {
                let m = lhs.precede(p);
                arg_list(p);
                m.complete(p, INVOCATION_EXPR)
            }
            LEFT_BRACKET => {
                let m = lhs.precede(p);
                bracketed_args(p);
                m.complete(p, ELEMENT_ACCESS_EXPR)
            }
            PLUS2 | MINUS2 => {
                let m = lhs.precede(p);
                p.advance();
                m.complete(p, POSTFIX_UNARY_EXPR)
            }
            QUESTION if matches!(p.nth(1), DOT | LEFT_BRACKET) => {
                let m = lhs.precede(p);
                let range = p.current_range();
                p.feature(Feature::NullPropagatingOperator, range);
                p.advance();

                let binding = p.start();
                let binding = if p.at(DOT) {
                    p.advance();
                    name_in_expr(p);
                    binding.complete(p, MEMBER_BINDING_EXPR)
                } else {
                    bracketed_args(p);
                    binding.complete(p, ELEMENT_BINDING_EXPR)
                };
                if p.nested(|p| postfix_ops(p, binding)).is_none() {
                    missing_term(p);
                }
                m.complete(p, CONDITIONAL_ACCESS_EXPR)
            }
            _ => break lhs,
        };
    }
}

fn primary_expr(p: &mut Parser<'_>) -> CompletedMarker {
    match p.current() {
        INTERPOLATED_STRING => {
            let range = p.current_range();
            p.feature(Feature::InterpolatedStrings, range);
            literal(p)
        }
        kind if kind.is_literal() => literal(p),
        IDENT => {
            let name = name_in_expr(p);
            if !p.at(COLON2) {
                return name;
            }
            let m = name.precede(p);
            p.advance();
            name_in_expr(p);
            m.complete(p, ALIAS_QUALIFIED_NAME)
        }
        kind if kind.is_predefined_type() => {
            let m = p.start();
            p.advance();
            m.complete(p, PREDEFINED_TYPE)
        }
        THIS_KW => {
            let m = p.start();
            p.advance();
            m.complete(p, THIS_EXPR)
        }
        BASE_KW => {
            let m = p.start();
            p.advance();
            m.complete(p, BASE_EXPR)
        }
        LEFT_PAREN => paren_or_tuple_expr(p),
        NEW_KW => new_expr(p),
        TYPEOF_KW | SIZEOF_KW => {
            let kind = if p.at(TYPEOF_KW) { TYPEOF_EXPR } else { SIZEOF_EXPR };
            let m = p.start();
            p.advance();
            p.expect(LEFT_PAREN);
            types::ty_or_missing(p);
            p.expect(RIGHT_PAREN);
            m.complete(p, kind)
        }
        DEFAULT_KW => {
            let m = p.start();
            p.advance();
            if p.eat(LEFT_PAREN) {
                types::ty_or_missing(p);
                p.expect(RIGHT_PAREN);
            }
            m.complete(p, DEFAULT_EXPR)
        }
        CHECKED_KW | UNCHECKED_KW => {
            let m = p.start();
            p.advance();
            p.expect(LEFT_PAREN);
            expr(p);
            p.expect(RIGHT_PAREN);
            m.complete(p, CHECKED_EXPR)
        }
        DELEGATE_KW => {
            let m = p.start();
            p.advance();
            if p.at(LEFT_PAREN) {
                items::param_list(p);
            }
            stmts::block(p);
            m.complete(p, ANONYMOUS_METHOD_EXPR)
        }
        _ => missing_term(p),
    }
}

fn literal(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();
    m.complete(p, LITERAL_EXPR)
}

/// An identifier in an expression. `<` starts type arguments only if the
/// token after the matching `>` could not continue a comparison.
fn name_in_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.expect(IDENT);

    let generic = p.at(LT)
        && types::scan_type_args(p, 0).is_some_and(|end| TYPE_ARGS_FOLLOW.contains(p.nth(end)));
    if generic {
        types::type_arg_list(p);
        m.complete(p, GENERIC_NAME)
    } else {
        m.complete(p, IDENTIFIER_NAME)
    }
}

fn paren_or_tuple_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();

    if p.at(IDENT) && p.nth_at(1, COLON) {
        separated(p, RIGHT_PAREN, false, &ARG_FIRST, argument);
        p.expect(RIGHT_PAREN);
        return m.complete(p, TUPLE_EXPR);
    }

    let first = expr(p);
    if !p.at(COMMA) {
        p.expect(RIGHT_PAREN);
        return m.complete(p, PAREN_EXPR);
    }

    first.precede(p).complete(p, ARGUMENT);
    while p.eat(COMMA) {
        argument(p);
    }
    p.expect(RIGHT_PAREN);
    m.complete(p, TUPLE_EXPR)
}

fn new_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    let new_range = p.current_range();
    p.advance();

    match p.current() {
        LEFT_BRACE => {
            p.feature(Feature::AnonymousTypes, new_range);
            p.advance();
            separated(p, RIGHT_BRACE, true, &EXPR_FIRST, anonymous_member);
            p.expect(RIGHT_BRACE);
            m.complete(p, ANONYMOUS_OBJECT_CREATION_EXPR)
        }
        LEFT_BRACKET => {
            p.feature(Feature::ImplicitArray, new_range);
            p.advance();
            while p.eat(COMMA) {}
            p.expect(RIGHT_BRACKET);
            if p.at(LEFT_BRACE) {
                array_initializer(p);
            } else {
                p.expect(LEFT_BRACE);
            }
            m.complete(p, IMPLICIT_ARRAY_CREATION_EXPR)
        }
        _ => {
            let ty = types::ty_or_missing(p);
            if ty.kind() == ARRAY_TYPE || p.at(LEFT_BRACKET) {
                if p.at(LEFT_BRACKET) {
                    let array = ty.precede(p);
                    while p.at(LEFT_BRACKET) {
                        rank_with_sizes(p);
                    }
                    array.complete(p, ARRAY_TYPE);
                }
                if p.at(LEFT_BRACE) {
                    array_initializer(p);
                }
                return m.complete(p, ARRAY_CREATION_EXPR);
            }

            let has_args = p.at(LEFT_PAREN);
            if has_args {
                arg_list(p);
            }
            if p.at(LEFT_BRACE) {
                object_or_collection_initializer(p);
            } else if !has_args {
                p.expect(LEFT_PAREN);
            }
            m.complete(p, OBJECT_CREATION_EXPR)
        }
    }
}

/// `[n, m]` in an array creation; sizes may be left out.
fn rank_with_sizes(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    loop {
        if !matches!(p.current(), COMMA | RIGHT_BRACKET) {
            expr(p);
        }
        if !p.eat(COMMA) {
            break;
        }
    }
    p.expect(RIGHT_BRACKET);
    m.complete(p, ARRAY_RANK_SPECIFIER);
}

fn anonymous_member(p: &mut Parser<'_>) {
    let m = p.start();

    if p.at(IDENT) && p.nth_at(1, EQ) {
        name_equals(p);
        expr(p);
    } else {
        let start = p.current_range().start();
        let value = expr(p);
        if !matches!(value.kind(), IDENTIFIER_NAME | MEMBER_ACCESS_EXPR) {
            let end = p.prev_end().max(start);
            p.node_error(Diagnostic::new(
                ErrorCode::InvalidAnonymousTypeMemberDeclarator,
                TextRange::new(start, end),
            ));
        }
    }

    m.complete(p, ANONYMOUS_OBJECT_MEMBER_DECL);
}

pub(crate) fn name_equals(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    p.advance();
    m.complete(p, NAME_EQUALS);
}

/// `{ A = 1, B = { ... } }` or `{ 1, { 2, 3 } }` after `new T(...)`.
fn object_or_collection_initializer(p: &mut Parser<'_>) {
    let object = p.nth_at(1, RIGHT_BRACE)
        || p.nth_at(1, LEFT_BRACKET)
        || (p.nth_at(1, IDENT) && p.nth_at(2, EQ));
    let (kind, feature) = if object {
        (OBJECT_INITIALIZER, Feature::ObjectInitializer)
    } else {
        (COLLECTION_INITIALIZER, Feature::CollectionInitializer)
    };

    p.nested(|p| {
        let m = p.start();
        let range = p.current_range();
        p.feature(feature, range);
        p.advance();
        separated(p, RIGHT_BRACE, true, &INITIALIZER_FIRST, |p| {
            if object {
                member_initializer(p);
            } else {
                element_initializer(p);
            }
        });
        p.expect(RIGHT_BRACE);
        m.complete(p, kind);
    });
}

fn member_initializer(p: &mut Parser<'_>) {
    let target = match p.current() {
        IDENT if p.nth_at(1, EQ) => {
            let m = p.start();
            p.advance();
            m.complete(p, IDENTIFIER_NAME)
        }
        LEFT_BRACKET => {
            let m = p.start();
            bracketed_args(p);
            m.complete(p, ELEMENT_BINDING_EXPR)
        }
        _ => {
            expr(p);
            return;
        }
    };

    let m = target.precede(p);
    p.expect(EQ);
    if p.at(LEFT_BRACE) {
        object_or_collection_initializer(p);
    } else {
        expr(p);
    }
    m.complete(p, ASSIGNMENT_EXPR);
}

fn element_initializer(p: &mut Parser<'_>) {
    if !p.at(LEFT_BRACE) {
        expr(p);
        return;
    }

    p.nested(|p| {
        let m = p.start();
        p.advance();
        separated(p, RIGHT_BRACE, false, &EXPR_FIRST, |p| {
            expr(p);
        });
        p.expect(RIGHT_BRACE);
        m.complete(p, COMPLEX_ELEMENT_INITIALIZER);
    });
}

pub(crate) fn array_initializer(p: &mut Parser<'_>) {
    p.nested(|p| {
        let m = p.start();
        p.advance();
        separated(p, RIGHT_BRACE, true, &INITIALIZER_FIRST, |p| {
            if p.at(LEFT_BRACE) {
                array_initializer(p);
            } else {
                expr(p);
            }
        });
        p.expect(RIGHT_BRACE);
        m.complete(p, ARRAY_INITIALIZER);
    });
}

/// `= value` on a variable, field or parameter.
pub(crate) fn equals_value_clause(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    if p.at(LEFT_BRACE) {
        array_initializer(p);
    } else {
        expr(p);
    }
    m.complete(p, EQUALS_VALUE_CLAUSE);
}

pub(crate) fn arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    separated(p, RIGHT_PAREN, false, &ARG_FIRST, argument);
    p.expect(RIGHT_PAREN);
    m.complete(p, ARG_LIST);
}

pub(crate) fn bracketed_args(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    separated(p, RIGHT_BRACKET, false, &ARG_FIRST, argument);
    p.expect(RIGHT_BRACKET);
    m.complete(p, BRACKETED_ARGS);
}

/// `x(1)` after a declarator name. The arguments are kept as a bracketed list
/// with both brackets missing.
pub(crate) fn declarator_ctor_args(p: &mut Parser<'_>) {
    let m = p.start();
    let start = p.current_range().start();
    let diagnostic = p.expected(LEFT_BRACKET);
    p.missing(LEFT_BRACKET, Some(diagnostic));
    separated(p, RIGHT_BRACKET, false, &ARG_FIRST, argument);
    p.expect(RIGHT_BRACKET);

    let range = TextRange::new(start, p.prev_end());
    p.node_error(Diagnostic::new(ErrorCode::BadVarDecl, range));
    m.complete(p, BRACKETED_ARGS);
}

fn argument(p: &mut Parser<'_>) {
    let m = p.start();

    if p.at(IDENT) && p.nth_at(1, COLON) {
        let range = p.current_range();
        p.feature(Feature::NamedArgument, range);
        let name = p.start();
        p.advance();
        p.advance();
        name.complete(p, NAME_COLON);
    }

    let by_ref = p.eat(REF_KW) || p.eat(OUT_KW) || p.eat(IN_KW);
    let declaration = by_ref
        && types::scan_type(p, 0)
            .is_some_and(|n| p.nth_at(n, IDENT) && matches!(p.nth(n + 1), COMMA | RIGHT_PAREN));

    if declaration {
        let decl = p.start();
        types::ty_or_missing(p);
        p.advance();
        decl.complete(p, DECLARATION_EXPR);
    } else {
        expr(p);
    }

    m.complete(p, ARGUMENT);
}

/// `=> body` of a lambda or member.
pub(crate) fn arrow_expr_clause(p: &mut Parser<'_>, feature: Feature) {
    let m = p.start();
    let range = p.current_range();
    p.feature(feature, range);
    p.advance();
    expr(p);
    m.complete(p, ARROW_EXPR_CLAUSE);
}

fn lambda_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let is_async = p.at_contextual("async")
        && ((p.nth_at(1, IDENT) && p.nth_at(2, FAT_ARROW))
            || (p.nth_at(1, LEFT_PAREN) && at_paren_lambda(p, 1)));
    let n = usize::from(is_async);

    let kind = if p.nth_at(n, IDENT) && p.nth_at(n + 1, FAT_ARROW) {
        SIMPLE_LAMBDA_EXPR
    } else if p.nth_at(n, LEFT_PAREN) && at_paren_lambda(p, n) {
        PAREN_LAMBDA_EXPR
    } else {
        return None;
    };

    let m = p.start();
    if is_async {
        p.advance();
    }

    if kind == SIMPLE_LAMBDA_EXPR {
        let param = p.start();
        p.advance();
        param.complete(p, PARAM);
    } else {
        lambda_params(p);
    }

    let range = p.current_range();
    p.feature(Feature::Lambda, range);
    p.expect(FAT_ARROW);

    if p.at(LEFT_BRACE) {
        stmts::block(p);
    } else {
        expr(p);
    }
    Some(m.complete(p, kind))
}

/// `true` if the parenthesis `n` tokens ahead closes right before `=>`.
fn at_paren_lambda(p: &mut Parser<'_>, n: usize) -> bool {
    let mut depth = 0usize;
    let mut k = n;
    loop {
        match p.nth(k) {
            LEFT_PAREN => depth += 1,
            RIGHT_PAREN => {
                depth -= 1;
                if depth == 0 {
                    return p.nth_at(k + 1, FAT_ARROW);
                }
            }
            EOF | SEMICOLON | LEFT_BRACE | RIGHT_BRACE => return false,
            _ => {}
        }
        k += 1;
    }
}

fn lambda_params(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    separated(p, RIGHT_PAREN, false, &ARG_FIRST, |p| {
        let param = p.start();
        while matches!(p.current(), REF_KW | OUT_KW | IN_KW) {
            p.advance();
        }
        let untyped = p.at(IDENT) && matches!(p.nth(1), COMMA | RIGHT_PAREN);
        if !untyped && !matches!(p.current(), COMMA | RIGHT_PAREN) {
            types::ty_or_missing(p);
        }
        p.expect(IDENT);
        param.complete(p, PARAM);
    });
    p.expect(RIGHT_PAREN);
    m.complete(p, PARAM_LIST);
}
