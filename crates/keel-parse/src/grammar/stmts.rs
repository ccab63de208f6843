use keel_errors::{Diagnostic, ErrorCode};
use keel_syntax::SyntaxKind::*;
use keel_syntax::SyntaxSet;

use super::exprs::{self, EXPR_FIRST};
use super::{at_member_keyword, items, skip_run, types};
use crate::options::Feature;
use crate::parser::{CompletedMarker, Parser};

const STMT_FIRST: SyntaxSet = EXPR_FIRST.union(&SyntaxSet::new([
    LEFT_BRACE,
    SEMICOLON,
    IF_KW,
    WHILE_KW,
    DO_KW,
    FOR_KW,
    FOREACH_KW,
    BREAK_KW,
    CONTINUE_KW,
    RETURN_KW,
    GOTO_KW,
    TRY_KW,
    SWITCH_KW,
    LOCK_KW,
    USING_KW,
    CONST_KW,
]));

pub(crate) fn at_stmt_start(p: &mut Parser<'_>) -> bool {
    p.at_set(&STMT_FIRST)
}

pub(crate) fn block(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    if !p.expect(LEFT_BRACE) {
        p.missing(RIGHT_BRACE, None);
        return m.complete(p, BLOCK);
    }

    statements(p, |_| false);
    p.expect(RIGHT_BRACE);
    m.complete(p, BLOCK)
}

/// A block whose `{` is missing, reported with `diagnostic`.
pub(crate) fn unopened_block(p: &mut Parser<'_>, diagnostic: Diagnostic) -> CompletedMarker {
    let m = p.start();
    p.missing(LEFT_BRACE, Some(diagnostic));
    statements(p, |_| false);
    p.expect(RIGHT_BRACE);
    m.complete(p, BLOCK)
}

/// Statements up to `}`, end of input, or a token accepted by `end`.
fn statements(p: &mut Parser<'_>, end: impl Fn(&mut Parser<'_>) -> bool) {
    loop {
        if p.at(RIGHT_BRACE) || p.at(EOF) || end(p) || at_member_keyword(p) {
            break;
        }

        if at_stmt_start(p) {
            stmt(p);
            continue;
        }

        let diagnostic = Diagnostic::new(ErrorCode::RbraceExpected, p.expected_range());
        skip_run(p, diagnostic, |p| {
            at_stmt_start(p) || p.at(RIGHT_BRACE) || end(p) || at_member_keyword(p)
        });
    }
}

pub(crate) fn stmt(p: &mut Parser<'_>) {
    p.nested(stmt_inner);
}

/// The body of `if`, `while` and friends. Something that cannot start a
/// statement becomes an expression statement with a missing operand.
fn embedded_stmt(p: &mut Parser<'_>) {
    if at_stmt_start(p) {
        stmt(p);
    } else {
        expr_stmt(p);
    }
}

fn stmt_inner(p: &mut Parser<'_>) {
    match p.current() {
        LEFT_BRACE => {
            block(p);
        }
        SEMICOLON => {
            let m = p.start();
            p.advance();
            m.complete(p, EMPTY_STMT);
        }
        IF_KW => if_stmt(p),
        WHILE_KW => {
            let m = p.start();
            p.advance();
            paren_condition(p);
            embedded_stmt(p);
            m.complete(p, WHILE_STMT);
        }
        DO_KW => {
            let m = p.start();
            p.advance();
            embedded_stmt(p);
            p.expect(WHILE_KW);
            paren_condition(p);
            p.expect(SEMICOLON);
            m.complete(p, DO_STMT);
        }
        FOR_KW => for_stmt(p),
        FOREACH_KW => foreach_stmt(p),
        BREAK_KW | CONTINUE_KW => {
            let kind = if p.at(BREAK_KW) { BREAK_STMT } else { CONTINUE_STMT };
            let m = p.start();
            p.advance();
            p.expect(SEMICOLON);
            m.complete(p, kind);
        }
        RETURN_KW | THROW_KW => {
            let kind = if p.at(RETURN_KW) { RETURN_STMT } else { THROW_STMT };
            let m = p.start();
            p.advance();
            if !p.at(SEMICOLON) {
                exprs::expr(p);
            }
            p.expect(SEMICOLON);
            m.complete(p, kind);
        }
        GOTO_KW => goto_stmt(p),
        TRY_KW => try_stmt(p),
        SWITCH_KW => switch_stmt(p),
        LOCK_KW => {
            let m = p.start();
            p.advance();
            paren_condition(p);
            embedded_stmt(p);
            m.complete(p, LOCK_STMT);
        }
        USING_KW if p.nth_at(1, LEFT_PAREN) => using_stmt(p),
        USING_KW | CONST_KW => {
            let m = p.start();
            p.advance();
            variable_decl(p);
            p.expect(SEMICOLON);
            m.complete(p, LOCAL_DECL_STMT);
        }
        CHECKED_KW | UNCHECKED_KW if p.nth_at(1, LEFT_BRACE) => {
            let m = p.start();
            p.advance();
            block(p);
            m.complete(p, CHECKED_STMT);
        }
        IDENT if p.at_contextual("yield") && matches!(p.nth(1), RETURN_KW | BREAK_KW) => {
            let kind = if p.nth_at(1, RETURN_KW) { YIELD_RETURN_STMT } else { YIELD_BREAK_STMT };
            let m = p.start();
            p.advance();
            p.advance();
            if kind == YIELD_RETURN_STMT {
                exprs::expr(p);
            }
            p.expect(SEMICOLON);
            m.complete(p, kind);
        }
        IDENT if p.nth_at(1, COLON) => {
            let m = p.start();
            p.advance();
            p.advance();
            embedded_stmt(p);
            m.complete(p, LABELED_STMT);
        }
        _ => match local_decl_kind(p) {
            Some(LocalDecl::Function) => local_function(p),
            Some(LocalDecl::Variables) => {
                let m = p.start();
                variable_decl(p);
                p.expect(SEMICOLON);
                m.complete(p, LOCAL_DECL_STMT);
            }
            None => expr_stmt(p),
        },
    }
}

fn expr_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    exprs::expr(p);
    p.expect(SEMICOLON);
    m.complete(p, EXPR_STMT);
}

enum LocalDecl {
    Variables,
    Function,
}

/// A type followed by an identifier starts a declaration. After a nullable
/// `T?` the identifier must also be followed by `=`, `,` or `;`, since
/// `a ? b : c` looks the same up to `b`.
fn local_decl_kind(p: &mut Parser<'_>) -> Option<LocalDecl> {
    if p.at_contextual("await") && p.nth_at(1, IDENT) {
        return None;
    }

    let n = types::scan_type(p, 0)?;
    if !p.nth_at(n, IDENT) {
        return None;
    }

    match p.nth(n + 1) {
        LEFT_PAREN | LT => Some(LocalDecl::Function),
        EQ | COMMA | SEMICOLON => Some(LocalDecl::Variables),
        _ if p.nth_at(n - 1, QUESTION) => None,
        _ => Some(LocalDecl::Variables),
    }
}

/// `T a = 1, b` with the type and every declarator.
pub(crate) fn variable_decl(p: &mut Parser<'_>) {
    let m = p.start();
    types::ty_or_missing(p);
    variable_declarators(p);
    m.complete(p, VARIABLE_DECL);
}

pub(crate) fn variable_declarators(p: &mut Parser<'_>) {
    loop {
        let m = p.start();
        p.expect(IDENT);
        if p.at(LEFT_BRACKET) {
            exprs::bracketed_args(p);
        } else if p.at(LEFT_PAREN) {
            exprs::declarator_ctor_args(p);
        }
        if p.at(EQ) {
            exprs::equals_value_clause(p);
        }
        m.complete(p, VARIABLE_DECLARATOR);

        if !p.eat(COMMA) {
            break;
        }
    }
}

fn local_function(p: &mut Parser<'_>) {
    let m = p.start();
    types::ty_or_missing(p);

    let range = p.current_range();
    p.feature(Feature::LocalFunctions, range);
    p.advance();

    let has_type_params = p.at(LT);
    if has_type_params {
        items::type_param_list(p);
    }
    items::param_list(p);
    items::constraint_clauses(p, has_type_params, true);

    match p.current() {
        LEFT_BRACE => {
            block(p);
        }
        FAT_ARROW => {
            exprs::arrow_expr_clause(p, Feature::ExpressionBodiedMethod);
            p.expect(SEMICOLON);
        }
        _ => {
            p.expect(SEMICOLON);
        }
    }
    m.complete(p, LOCAL_FUNCTION_STMT);
}

/// `( expr )` after `if`, `while`, `lock` and `switch`.
fn paren_condition(p: &mut Parser<'_>) {
    p.expect(LEFT_PAREN);
    exprs::expr(p);
    p.expect(RIGHT_PAREN);
}

fn if_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    paren_condition(p);
    embedded_stmt(p);

    if p.at(ELSE_KW) {
        let clause = p.start();
        p.advance();
        embedded_stmt(p);
        clause.complete(p, ELSE_CLAUSE);
    }
    m.complete(p, IF_STMT);
}

fn for_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    p.expect(LEFT_PAREN);

    if !p.at(SEMICOLON) {
        if matches!(local_decl_kind(p), Some(LocalDecl::Variables)) {
            variable_decl(p);
        } else {
            expr_list(p);
        }
    }
    p.expect(SEMICOLON);

    if !p.at(SEMICOLON) {
        exprs::expr(p);
    }
    p.expect(SEMICOLON);

    if !p.at(RIGHT_PAREN) {
        expr_list(p);
    }
    p.expect(RIGHT_PAREN);

    embedded_stmt(p);
    m.complete(p, FOR_STMT);
}

fn expr_list(p: &mut Parser<'_>) {
    loop {
        exprs::expr(p);
        if !p.eat(COMMA) {
            break;
        }
    }
}

/// `foreach (T x in xs)`. A missing variable name after a type is reported
/// twice: as a missing identifier and as a malformed declaration.
fn foreach_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    p.expect(LEFT_PAREN);

    // Without a type the missing type already explains the bad declaration.
    let typed = types::ty(p).is_some();
    if !typed {
        types::missing_type(p);
    }
    if !p.eat(IDENT) {
        let range = p.current_range();
        p.expect(IDENT);
        if typed {
            p.error_at(ErrorCode::BadForeachDecl, range);
        }
    }

    p.expect(IN_KW);
    exprs::expr(p);
    p.expect(RIGHT_PAREN);

    embedded_stmt(p);
    m.complete(p, FOREACH_STMT);
}

fn goto_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    match p.current() {
        CASE_KW => {
            p.advance();
            exprs::expr(p);
        }
        DEFAULT_KW => p.advance(),
        _ => {
            p.expect(IDENT);
        }
    }
    p.expect(SEMICOLON);
    m.complete(p, GOTO_STMT);
}

fn try_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    block(p);

    let mut catches = 0;
    let mut after_general = false;
    while p.at(CATCH_KW) {
        if after_general {
            let range = p.current_range();
            p.error_at(ErrorCode::TooManyCatches, range);
        }
        after_general |= catch_clause(p);
        catches += 1;
    }

    if p.at(FINALLY_KW) {
        let clause = p.start();
        p.advance();
        block(p);
        clause.complete(p, FINALLY_CLAUSE);
    } else if catches == 0 {
        let clause = p.start();
        let diagnostic = Diagnostic::new(ErrorCode::ExpectedEndTry, p.expected_range());
        p.missing(FINALLY_KW, Some(diagnostic));
        clause.complete(p, FINALLY_CLAUSE);
    }

    m.complete(p, TRY_STMT);
}

/// Returns `true` for a general catch, one without a declaration.
fn catch_clause(p: &mut Parser<'_>) -> bool {
    let m = p.start();
    p.advance();

    let general = !p.at(LEFT_PAREN);
    if !general {
        let decl = p.start();
        p.advance();
        types::ty_or_missing(p);
        p.eat(IDENT);
        p.expect(RIGHT_PAREN);
        decl.complete(p, CATCH_DECL);
    }

    if p.at_contextual("when") {
        let filter = p.start();
        let range = p.current_range();
        p.feature(Feature::ExceptionFilter, range);
        p.advance();
        paren_condition(p);
        filter.complete(p, CATCH_FILTER);
    }

    block(p);
    m.complete(p, CATCH_CLAUSE);
    general
}

fn at_switch_label(p: &mut Parser<'_>) -> bool {
    p.at(CASE_KW) || (p.at(DEFAULT_KW) && p.nth_at(1, COLON))
}

fn switch_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    paren_condition(p);

    if p.expect(LEFT_BRACE) {
        loop {
            if p.at(RIGHT_BRACE) || p.at(EOF) || at_member_keyword(p) {
                break;
            }

            if at_switch_label(p) {
                switch_section(p);
                continue;
            }

            let diagnostic = Diagnostic::new(ErrorCode::RbraceExpected, p.expected_range());
            skip_run(p, diagnostic, |p| {
                at_switch_label(p) || p.at(RIGHT_BRACE) || at_member_keyword(p)
            });
        }
        p.expect(RIGHT_BRACE);
    }
    m.complete(p, SWITCH_STMT);
}

fn switch_section(p: &mut Parser<'_>) {
    let m = p.start();

    while at_switch_label(p) {
        let label = p.start();
        let kind = if p.at(CASE_KW) {
            p.advance();
            exprs::expr(p);
            CASE_LABEL
        } else {
            p.advance();
            DEFAULT_LABEL
        };
        p.expect(COLON);
        label.complete(p, kind);
    }

    while at_stmt_start(p) && !at_switch_label(p) {
        stmt(p);
    }
    m.complete(p, SWITCH_SECTION);
}

fn using_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    p.advance();

    if matches!(local_decl_kind(p), Some(LocalDecl::Variables)) {
        variable_decl(p);
    } else {
        exprs::expr(p);
    }
    p.expect(RIGHT_PAREN);

    embedded_stmt(p);
    m.complete(p, USING_STMT);
}
