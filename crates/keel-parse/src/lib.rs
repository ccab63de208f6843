//! Error-recovering parser for a C#-like language.
//!
//! [`parse_text`] never fails: malformed input still yields a complete tree
//! covering every byte of the text, with missing tokens filled in and
//! diagnostics attached where recovery happened.

use keel_errors::Diagnostic;
use keel_syntax::{GreenNode, SyntaxNode};

mod grammar;
mod options;
mod parser;
#[cfg(test)]
mod tests;

pub use options::{Feature, LanguageVersion, OptionsError, ParseOptions};

/// The result of parsing one source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parse {
    green: GreenNode,
}

impl Parse {
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn syntax_node(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Every diagnostic in the tree, ordered by position.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.syntax_node().diagnostics()
    }

    pub fn has_errors(&self) -> bool {
        self.green.has_errors()
    }

    pub fn debug_tree(&self) -> String {
        keel_syntax::debug_tree(&self.syntax_node())
    }
}

pub fn parse_text(text: &str, options: &ParseOptions) -> Parse {
    let mut parser = parser::Parser::new(text, options);
    grammar::items::compilation_unit(&mut parser);
    if parser.is_aborted() {
        log::debug!("parse of {} bytes aborted at the nesting limit", text.len());
    }
    Parse { green: parser.build_tree() }
}
