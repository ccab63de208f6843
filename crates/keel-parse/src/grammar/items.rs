use keel_errors::{Diagnostic, ErrorCode};
use keel_syntax::SyntaxKind::{self, *};
use keel_syntax::SyntaxSet;

use super::exprs::{self, EXPR_FIRST};
use super::types::{self, TYPE_FIRST};
use super::{ListContext, at_list_terminator, members, separated, skip_run};
use crate::options::Feature;
use crate::parser::{Marker, Parser};

const MODIFIERS: SyntaxSet = SyntaxSet::new([
    PUBLIC_KW,
    PRIVATE_KW,
    PROTECTED_KW,
    INTERNAL_KW,
    STATIC_KW,
    ABSTRACT_KW,
    SEALED_KW,
    READONLY_KW,
    UNSAFE_KW,
    NEW_KW,
    VIRTUAL_KW,
    OVERRIDE_KW,
    EXTERN_KW,
    VOLATILE_KW,
    CONST_KW,
    FIXED_KW,
]);

const CONTEXTUAL_MODIFIERS: [&str; 4] = ["partial", "async", "file", "required"];

const TYPE_KEYWORDS: SyntaxSet =
    SyntaxSet::new([CLASS_KW, STRUCT_KW, INTERFACE_KW, ENUM_KW, DELEGATE_KW]);

const PARAM_FIRST: SyntaxSet = TYPE_FIRST.union(&SyntaxSet::new([
    LEFT_BRACKET,
    REF_KW,
    OUT_KW,
    IN_KW,
    PARAMS_KW,
    THIS_KW,
    READONLY_KW,
]));

const TYPE_PARAM_FIRST: SyntaxSet = SyntaxSet::new([IDENT, IN_KW, OUT_KW, LEFT_BRACKET]);

pub(crate) fn compilation_unit(p: &mut Parser<'_>) {
    let m = p.start();
    namespace_members(p, ListContext::CompilationUnit);
    p.finish_input();
    m.complete(p, COMPILATION_UNIT);
}

fn namespace_members(p: &mut Parser<'_>, ctx: ListContext) {
    let in_namespace = ctx == ListContext::Namespace;

    loop {
        match p.current() {
            EOF => break,
            RIGHT_BRACE if in_namespace => break,
            USING_KW => using_directive(p),
            IDENT if p.at_contextual("global") && p.nth_at(1, USING_KW) => using_directive(p),
            NAMESPACE_KW => namespace_decl(p),
            _ => {
                if members::member(p, ctx) {
                    continue;
                }

                let code =
                    if in_namespace { ErrorCode::RbraceExpected } else { ErrorCode::EOFExpected };
                let diagnostic = Diagnostic::new(code, p.current_range());
                // A stray `}` always gets its own diagnostic.
                skip_run(p, diagnostic, |p| at_namespace_member_start(p) || p.at(RIGHT_BRACE));
            }
        }
    }
}

fn at_namespace_member_start(p: &mut Parser<'_>) -> bool {
    matches!(p.current(), USING_KW | NAMESPACE_KW | LEFT_BRACKET | EVENT_KW)
        || p.at_set(&TYPE_KEYWORDS)
        || p.at_set(&TYPE_FIRST)
        || modifier_at(p, 0)
}

fn using_directive(p: &mut Parser<'_>) {
    let m = p.start();
    if p.at_contextual("global") {
        let range = p.current_range();
        p.feature(Feature::GlobalUsingDirective, range);
        p.advance();
    }

    p.advance();
    p.eat(STATIC_KW);
    if p.at(IDENT) && p.nth_at(1, EQ) {
        exprs::name_equals(p);
    }
    types::ty_or_missing(p);
    p.expect(SEMICOLON);
    m.complete(p, USING_DIRECTIVE);
}

fn namespace_decl(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    if p.at(IDENT) {
        types::name(p);
    } else {
        p.expect(IDENT);
    }

    if p.at(SEMICOLON) {
        let range = p.current_range();
        p.feature(Feature::FileScopedNamespace, range);
        p.advance();
        namespace_members(p, ListContext::CompilationUnit);
        m.complete(p, FILE_SCOPED_NAMESPACE_DECL);
        return;
    }

    p.expect(LEFT_BRACE);
    namespace_members(p, ListContext::Namespace);
    p.expect(RIGHT_BRACE);
    p.eat(SEMICOLON);
    m.complete(p, NAMESPACE_DECL);
}

// Modifiers.

/// `true` if the token `n` ahead is used as a modifier. Contextual modifiers
/// are identifiers, so they only count when a declaration can follow them.
pub(crate) fn modifier_at(p: &mut Parser<'_>, n: usize) -> bool {
    match p.nth(n) {
        REF_KW => {
            matches!(p.nth(n + 1), STRUCT_KW | READONLY_KW) || p.nth_contextual(n + 1, "partial")
        }
        IDENT => {
            CONTEXTUAL_MODIFIERS.contains(&p.nth_text(n)) && declaration_follows(p, n + 1)
        }
        kind => MODIFIERS.contains(kind),
    }
}

fn declaration_follows(p: &mut Parser<'_>, n: usize) -> bool {
    match p.nth(n) {
        kind if kind.is_keyword() => true,
        IDENT => !matches!(
            p.nth(n + 1),
            SEMICOLON | EQ | COMMA | LEFT_PAREN | FAT_ARROW | LEFT_BRACE | RIGHT_BRACE
        ),
        _ => false,
    }
}

/// Number of modifier tokens starting `n` tokens ahead.
pub(crate) fn scan_modifiers(p: &mut Parser<'_>, n: usize) -> usize {
    let mut k = n;
    while modifier_at(p, k) {
        k += 1;
    }
    k - n
}

/// Consumes a run of modifiers, reporting repeats and conflicting
/// accessibility. Returns how many there were.
pub(crate) fn modifiers(p: &mut Parser<'_>) -> usize {
    let mut seen: Vec<&str> = Vec::new();
    let mut accessibility = None;
    let mut combined = false;

    while modifier_at(p, 0) {
        let kind = p.current();
        let text = p.nth_text(0);
        let range = p.current_range();

        if seen.contains(&text) {
            p.error(Diagnostic::with_args(ErrorCode::DuplicateModifier, range, [text]));
        } else if kind.is_accessibility() {
            match accessibility {
                None => accessibility = Some(kind),
                Some(first) if !combined && compatible_accessibility(first, kind) => {
                    combined = true;
                }
                Some(_) => p.error_at(ErrorCode::BadMemberProtection, range),
            }
        }
        seen.push(text);

        match text {
            "partial" if at_type_keyword(p, 1) => p.feature(Feature::PartialTypes, range),
            "file" => p.feature(Feature::FileTypes, range),
            "required" => p.feature(Feature::RequiredMembers, range),
            _ => {}
        }

        p.advance();
    }

    seen.len()
}

fn compatible_accessibility(first: SyntaxKind, second: SyntaxKind) -> bool {
    matches!(
        (first, second),
        (PROTECTED_KW, INTERNAL_KW)
            | (INTERNAL_KW, PROTECTED_KW)
            | (PRIVATE_KW, PROTECTED_KW)
            | (PROTECTED_KW, PRIVATE_KW)
    )
}

fn at_type_keyword(p: &mut Parser<'_>, n: usize) -> bool {
    TYPE_KEYWORDS.contains(p.nth(n)) || at_record(p, n)
}

// Attributes.

pub(crate) fn attribute_lists(p: &mut Parser<'_>) -> bool {
    let mut any = false;
    while p.at(LEFT_BRACKET) {
        attribute_list(p);
        any = true;
    }
    any
}

fn attribute_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    if (p.at(IDENT) || p.current().is_keyword()) && p.nth_at(1, COLON) {
        let target = p.start();
        p.advance();
        p.advance();
        target.complete(p, ATTRIBUTE_TARGET);
    }

    separated(p, RIGHT_BRACKET, true, &SyntaxSet::new([IDENT]), |p| {
        let attribute = p.start();
        types::name(p);
        if p.at(LEFT_PAREN) {
            attribute_args(p);
        }
        attribute.complete(p, ATTRIBUTE);
    });
    p.expect(RIGHT_BRACKET);
    m.complete(p, ATTRIBUTE_LIST);
}

fn attribute_args(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    separated(p, RIGHT_PAREN, false, &EXPR_FIRST, |p| {
        let arg = p.start();
        if p.at(IDENT) && p.nth_at(1, EQ) {
            exprs::name_equals(p);
        } else if p.at(IDENT) && p.nth_at(1, COLON) {
            let name = p.start();
            p.advance();
            p.advance();
            name.complete(p, NAME_COLON);
        }
        exprs::expr(p);
        arg.complete(p, ATTRIBUTE_ARG);
    });
    p.expect(RIGHT_PAREN);
    m.complete(p, ATTRIBUTE_ARG_LIST);
}

// Type declarations.

/// `record` used as a declaration keyword `n` tokens ahead.
fn at_record(p: &mut Parser<'_>, n: usize) -> bool {
    if !p.nth_contextual(n, "record") {
        return false;
    }
    match p.nth(n + 1) {
        CLASS_KW | STRUCT_KW => true,
        IDENT => {
            matches!(p.nth(n + 2), LEFT_BRACE | LEFT_PAREN | LT | COLON | SEMICOLON)
                || p.nth_contextual(n + 2, "where")
        }
        _ => false,
    }
}

pub(crate) fn at_type_decl(p: &mut Parser<'_>) -> bool {
    at_type_keyword(p, 0)
}

/// Parses a type declaration whose attributes and modifiers are already
/// inside `m`.
pub(crate) fn type_decl(p: &mut Parser<'_>, m: Marker) {
    match p.current() {
        ENUM_KW => enum_decl(p, m),
        DELEGATE_KW => delegate_decl(p, m),
        _ => class_like_decl(p, m),
    }
}

fn class_like_decl(p: &mut Parser<'_>, m: Marker) {
    let kind = match p.current() {
        CLASS_KW => CLASS_DECL,
        STRUCT_KW => STRUCT_DECL,
        INTERFACE_KW => INTERFACE_DECL,
        _ => {
            let range = p.current_range();
            p.feature(Feature::Records, range);
            p.advance();
            if p.at(STRUCT_KW) {
                let range = p.current_range();
                p.feature(Feature::RecordStructs, range);
                RECORD_STRUCT_DECL
            } else {
                RECORD_DECL
            }
        }
    };
    if matches!(p.current(), CLASS_KW | STRUCT_KW | INTERFACE_KW) {
        p.advance();
    }

    let named = type_name(p);

    let generic = p.at(LT);
    if generic {
        type_param_list(p);
    }

    let mut has_params = false;
    if p.at(LEFT_PAREN) {
        if matches!(kind, CLASS_DECL | STRUCT_DECL | INTERFACE_DECL) {
            let range = p.current_range();
            p.feature(Feature::PrimaryConstructors, range);
        }
        param_list(p);
        has_params = true;
    }

    if p.at(COLON) {
        base_list(p, has_params || matches!(kind, RECORD_DECL | RECORD_STRUCT_DECL));
    }

    constraint_clauses(p, generic, named);

    match p.current() {
        LEFT_BRACE => {
            member_list(p, kind);
            p.eat(SEMICOLON);
        }
        SEMICOLON => p.advance(),
        _ => {
            p.expect(LEFT_BRACE);
            p.expect(RIGHT_BRACE);
        }
    }
    m.complete(p, kind);
}

/// The declared name. A contextual keyword that starts the next declaration
/// is left alone, so `class partial class C` keeps its second class.
fn type_name(p: &mut Parser<'_>) -> bool {
    let starts_declaration = (p.at_contextual("partial")
        || p.at_contextual("file")
        || p.at_contextual("record"))
        && p.nth(1).is_keyword();

    if p.at(IDENT) && !starts_declaration {
        p.advance();
        return true;
    }

    p.expect(IDENT);
    false
}

fn member_list(p: &mut Parser<'_>, kind: SyntaxKind) {
    p.advance();

    loop {
        if p.at(RIGHT_BRACE) || p.at(EOF) {
            break;
        }

        if members::member(p, ListContext::Type(kind)) {
            continue;
        }

        let text = p.nth_text(0);
        let range = p.current_range();
        let diagnostic = Diagnostic::with_args(ErrorCode::InvalidMemberDecl, range, [text]);
        skip_run(p, diagnostic, |p| at_member_start(p) || p.at(RIGHT_BRACE));
    }

    p.expect(RIGHT_BRACE);
}

fn at_member_start(p: &mut Parser<'_>) -> bool {
    at_namespace_member_start(p)
        || matches!(p.current(), TILDE | OPERATOR_KW | IMPLICIT_KW | EXPLICIT_KW)
}

/// `: Base(args), IFoo`. Only the first base type of a declaration with a
/// parameter list may pass arguments.
fn base_list(p: &mut Parser<'_>, primary: bool) {
    let m = p.start();
    p.advance();

    let mut first = true;
    loop {
        let base = p.start();
        types::ty_or_missing(p);
        if first && primary && p.at(LEFT_PAREN) {
            exprs::arg_list(p);
            base.complete(p, PRIMARY_CTOR_BASE_TYPE);
        } else {
            base.complete(p, SIMPLE_BASE_TYPE);
        }
        first = false;

        if !p.eat(COMMA) {
            break;
        }
    }
    m.complete(p, BASE_LIST);
}

fn enum_decl(p: &mut Parser<'_>, m: Marker) {
    p.advance();
    type_name(p);

    if p.at(COLON) {
        base_list(p, false);
    }

    match p.current() {
        LEFT_BRACE => {
            p.advance();
            separated(p, RIGHT_BRACE, true, &SyntaxSet::new([IDENT, LEFT_BRACKET]), |p| {
                let member = p.start();
                attribute_lists(p);
                p.expect(IDENT);
                if p.at(EQ) {
                    exprs::equals_value_clause(p);
                }
                member.complete(p, ENUM_MEMBER_DECL);
            });
            p.expect(RIGHT_BRACE);
            p.eat(SEMICOLON);
        }
        SEMICOLON => p.advance(),
        _ => {
            p.expect(LEFT_BRACE);
            p.expect(RIGHT_BRACE);
        }
    }
    m.complete(p, ENUM_DECL);
}

fn delegate_decl(p: &mut Parser<'_>, m: Marker) {
    p.advance();
    types::ty_or_missing(p);
    let named = type_name(p);

    let generic = p.at(LT);
    if generic {
        type_param_list(p);
    }
    param_list(p);
    constraint_clauses(p, generic, named);
    p.expect(SEMICOLON);
    m.complete(p, DELEGATE_DECL);
}

pub(crate) fn type_param_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    if p.at(GT) {
        let param = p.start();
        p.expect(IDENT);
        param.complete(p, TYPE_PARAM);
    }
    separated(p, GT, false, &TYPE_PARAM_FIRST, |p| {
        let param = p.start();
        attribute_lists(p);
        if matches!(p.current(), IN_KW | OUT_KW) {
            p.advance();
        }
        p.expect(IDENT);
        param.complete(p, TYPE_PARAM);
    });
    p.expect(GT);
    m.complete(p, TYPE_PARAM_LIST);
}

/// Zero or more `where T : ...` clauses. Only a named declaration without
/// type parameters complains about them, and only once.
pub(crate) fn constraint_clauses(p: &mut Parser<'_>, generic: bool, named: bool) {
    let mut reported = false;
    while p.at_contextual("where") && p.nth_at(1, IDENT) {
        if !generic && named && !reported {
            let range = p.current_range();
            p.error_at(ErrorCode::ConstraintOnlyAllowedOnGenericDecl, range);
            reported = true;
        }
        constraint_clause(p);
    }
}

fn constraint_clause(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    let name = p.start();
    p.advance();
    name.complete(p, IDENTIFIER_NAME);
    p.expect(COLON);

    let mut first = true;
    loop {
        let constraint = p.start();
        match p.current() {
            CLASS_KW | STRUCT_KW => {
                if !first {
                    let range = p.current_range();
                    p.error_at(ErrorCode::TypeConstraintsMustBeUniqueAndFirst, range);
                }
                p.advance();
                p.eat(QUESTION);
                constraint.complete(p, CLASS_OR_STRUCT_CONSTRAINT);
            }
            NEW_KW => {
                p.advance();
                p.expect(LEFT_PAREN);
                p.expect(RIGHT_PAREN);
                constraint.complete(p, CONSTRUCTOR_CONSTRAINT);
            }
            _ => {
                types::ty_or_missing(p);
                constraint.complete(p, TYPE_CONSTRAINT);
            }
        }
        first = false;

        if !p.eat(COMMA) {
            break;
        }
    }
    m.complete(p, CONSTRAINT_CLAUSE);
}

// Parameters.

pub(crate) fn param_list(p: &mut Parser<'_>) {
    params(p, LEFT_PAREN, RIGHT_PAREN, PARAM_LIST);
}

pub(crate) fn bracketed_param_list(p: &mut Parser<'_>) {
    params(p, LEFT_BRACKET, RIGHT_BRACKET, BRACKETED_PARAM_LIST);
}

fn params(p: &mut Parser<'_>, bra: SyntaxKind, ket: SyntaxKind, kind: SyntaxKind) {
    let m = p.start();
    if !p.expect(bra) && !p.at(ket) && at_list_terminator(p) {
        p.missing(ket, None);
        m.complete(p, kind);
        return;
    }

    if !(p.at(ket) || p.at(COMMA) || p.at_set(&PARAM_FIRST) || at_list_terminator(p)) {
        let range = p.current_range();
        let diagnostic = if p.current().is_keyword() {
            let text = p.nth_text(0);
            Diagnostic::with_args(ErrorCode::IdentifierExpectedKW, range, ["", text])
        } else {
            Diagnostic::new(ErrorCode::IdentifierExpected, range)
        };
        // A `(` in the junk is not taken for a tuple type.
        skip_run(p, diagnostic, |p| {
            let at_param = p.at_set(&PARAM_FIRST) && !p.at(LEFT_PAREN);
            p.at(COMMA) || p.at(ket) || at_param || at_list_terminator(p)
        });
    }

    separated(p, ket, false, &PARAM_FIRST, param);
    p.expect(ket);
    m.complete(p, kind);
}

fn param(p: &mut Parser<'_>) {
    let m = p.start();
    attribute_lists(p);
    while matches!(p.current(), REF_KW | OUT_KW | IN_KW | PARAMS_KW | THIS_KW | READONLY_KW) {
        p.advance();
    }

    types::ty_or_missing(p);
    p.expect(IDENT);

    if p.at(EQ) {
        let range = p.current_range();
        p.feature(Feature::OptionalParameter, range);
        exprs::equals_value_clause(p);
    }
    m.complete(p, PARAM);
}
