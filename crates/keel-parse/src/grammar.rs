use keel_errors::{Diagnostic, ErrorCode};
use keel_syntax::SyntaxKind::{self, *};
use keel_syntax::SyntaxSet;
use log::debug;

use crate::parser::Parser;

mod accessors;
mod exprs;
pub(crate) mod items;
mod members;
mod operators;
mod stmts;
mod types;

/// The list a member is being parsed in. Passed down by value; nested lists
/// build their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListContext {
    CompilationUnit,
    Namespace,
    /// The body of a type declaration of the given kind.
    Type(SyntaxKind),
}

/// Keywords that only ever start a member. Statement lists end in front of
/// them, so a forgotten `}` does not swallow the rest of the type.
const MEMBER_KEYWORDS: SyntaxSet = SyntaxSet::new([
    PUBLIC_KW,
    PRIVATE_KW,
    PROTECTED_KW,
    INTERNAL_KW,
    CLASS_KW,
    STRUCT_KW,
    INTERFACE_KW,
    ENUM_KW,
    NAMESPACE_KW,
    EVENT_KW,
    OVERRIDE_KW,
    VIRTUAL_KW,
    ABSTRACT_KW,
    SEALED_KW,
]);

pub(crate) fn at_member_keyword(p: &mut Parser<'_>) -> bool {
    p.at_set(&MEMBER_KEYWORDS)
}

/// Tokens that end any separated list, whatever its closing token.
const LIST_TERMINATORS: SyntaxSet = SyntaxSet::new([
    LEFT_BRACE,
    RIGHT_BRACE,
    SEMICOLON,
    FAT_ARROW,
    RIGHT_PAREN,
    RIGHT_BRACKET,
    EOF,
]);

pub(crate) fn at_list_terminator(p: &mut Parser<'_>) -> bool {
    p.at_set(&LIST_TERMINATORS) || at_member_keyword(p)
}

/// Parses `element (, element)*` up to `ket`, which is left for the caller.
///
/// `element` runs wherever an element belongs, including right after a comma
/// with nothing before `ket`, and must insert a missing element if it finds
/// none. A missing comma is inserted when the next token is in `first_set`.
/// Any other token is skipped as a bad separator together with everything up
/// to the next comma, `ket` or list terminator.
pub(crate) fn separated(
    p: &mut Parser<'_>,
    ket: SyntaxKind,
    trailing_comma: bool,
    first_set: &SyntaxSet,
    mut element: impl FnMut(&mut Parser<'_>),
) {
    if p.at(ket) || p.at(EOF) {
        return;
    }

    loop {
        element(p);

        if p.eat(COMMA) {
            if trailing_comma && p.at(ket) {
                break;
            }
            continue;
        }

        if p.at(ket) || p.at(EOF) {
            break;
        }

        if p.at_set(first_set) {
            p.expect(COMMA);
            continue;
        }
        if at_list_terminator(p) {
            break;
        }

        let range = p.current_range();
        let diagnostic = Diagnostic::with_args(ErrorCode::SyntaxError, range, [",", ""]);
        skip_run(p, diagnostic, |p| p.at(COMMA) || p.at(ket) || at_list_terminator(p));
        if !p.eat(COMMA) {
            break;
        }
    }
}

/// Skips the current token with `diagnostic`, then every following token up
/// to one accepted by `stop`.
pub(crate) fn skip_run(
    p: &mut Parser<'_>,
    diagnostic: Diagnostic,
    stop: impl Fn(&mut Parser<'_>) -> bool,
) {
    let start = p.position();
    p.skip(Some(diagnostic));
    while !p.at(EOF) && !stop(p) {
        p.skip(None);
    }

    let skipped = p.position() - start;
    if skipped > 1 {
        debug!("skipped a run of {skipped} tokens");
    }
}
