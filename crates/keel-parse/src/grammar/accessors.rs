use keel_errors::{Diagnostic, ErrorCode};
use keel_syntax::SyntaxKind::{self, *};

use super::{at_member_keyword, exprs, items, stmts};
use crate::options::Feature;
use crate::parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessorOwner {
    Property,
    Event,
}

impl AccessorOwner {
    fn expected(self) -> ErrorCode {
        match self {
            Self::Property => ErrorCode::GetOrSetExpected,
            Self::Event => ErrorCode::AddOrRemoveExpected,
        }
    }

    fn accessor_kind(self, text: &str) -> SyntaxKind {
        match (self, text) {
            (Self::Property, "get") => GET_ACCESSOR,
            (Self::Property, "set") => SET_ACCESSOR,
            (Self::Property, "init") => INIT_ACCESSOR,
            (Self::Event, "add") => ADD_ACCESSOR,
            (Self::Event, "remove") => REMOVE_ACCESSOR,
            _ => UNKNOWN_ACCESSOR,
        }
    }
}

pub(crate) fn accessor_list(p: &mut Parser<'_>, owner: AccessorOwner) {
    let m = p.start();
    if !p.expect(LEFT_BRACE) {
        p.missing(RIGHT_BRACE, None);
        m.complete(p, ACCESSOR_LIST);
        return;
    }

    let mut seen = Vec::new();
    loop {
        if p.at(RIGHT_BRACE) || p.at(EOF) {
            break;
        }
        if at_accessor_start(p) {
            accessor(p, owner, &mut seen);
            continue;
        }
        if at_member_keyword(p) {
            break;
        }

        let range = p.current_range();
        p.skip(Some(Diagnostic::new(owner.expected(), range)));
    }

    p.expect(RIGHT_BRACE);
    m.complete(p, ACCESSOR_LIST);
}

/// An identifier, possibly behind attributes or modifiers. After modifiers
/// the identifier must look like an accessor, so that a member following a
/// forgotten `}` is not taken for one. Modifiers right before `}` still
/// start an accessor with its name missing.
fn at_accessor_start(p: &mut Parser<'_>) -> bool {
    if p.at(LEFT_BRACKET) {
        return true;
    }

    let n = items::scan_modifiers(p, 0);
    if n > 0 && p.nth_at(n, RIGHT_BRACE) {
        return true;
    }
    if !p.nth_at(n, IDENT) {
        return false;
    }
    n == 0
        || matches!(p.nth_text(n), "get" | "set" | "init" | "add" | "remove")
        || matches!(p.nth(n + 1), LEFT_BRACE | SEMICOLON | FAT_ARROW)
}

fn accessor(p: &mut Parser<'_>, owner: AccessorOwner, seen: &mut Vec<SyntaxKind>) {
    let m = p.start();
    items::attribute_lists(p);

    if owner == AccessorOwner::Event && items::modifier_at(p, 0) {
        let range = p.current_range();
        p.error_at(ErrorCode::NoModifiersOnAccessor, range);
    }
    items::modifiers(p);

    let kind = if p.at(IDENT) {
        let kind = owner.accessor_kind(p.nth_text(0));
        let range = p.current_range();

        // `set` and `init` share a slot.
        let slot = if kind == INIT_ACCESSOR { SET_ACCESSOR } else { kind };
        if kind == UNKNOWN_ACCESSOR {
            p.error_at(owner.expected(), range);
        } else if seen.contains(&slot) {
            p.error_at(ErrorCode::DuplicateAccessor, range);
        } else {
            seen.push(slot);
        }

        if kind == INIT_ACCESSOR {
            p.feature(Feature::InitOnlySetters, range);
        }
        p.advance();
        kind
    } else {
        let diagnostic = Diagnostic::new(owner.expected(), p.current_range());
        p.missing(IDENT, Some(diagnostic));
        UNKNOWN_ACCESSOR
    };

    match p.current() {
        LEFT_BRACE => {
            stmts::block(p);
        }
        FAT_ARROW => {
            exprs::arrow_expr_clause(p, Feature::ExpressionBodiedProperty);
            p.expect(SEMICOLON);
        }
        SEMICOLON => {
            if owner == AccessorOwner::Event {
                let range = p.current_range();
                p.error_at(ErrorCode::AddRemoveMustHaveBody, range);
            }
            p.advance();
        }
        _ if kind == UNKNOWN_ACCESSOR => {}
        _ if owner == AccessorOwner::Event => {
            p.expect(LEFT_BRACE);
        }
        _ => missing_body(p),
    }
    m.complete(p, kind);
}

/// `get return x;`: statements after the accessor name become its body, which
/// then needs its own `}`. Anything else only misses the `;`.
fn missing_body(p: &mut Parser<'_>) {
    let diagnostic = Diagnostic::new(ErrorCode::SemiOrLBraceExpected, p.expected_range());
    if stmts::at_stmt_start(p) && !at_accessor_start(p) && !at_member_keyword(p) {
        stmts::unopened_block(p, diagnostic);
    } else {
        p.missing(SEMICOLON, Some(diagnostic));
    }
}
