//! Incremental front end over source files.
//!
//! A [`File`] is a salsa input; parsing and diagnostics are memoized against
//! its text and options, so editing one file only reparses that file.

use camino::Utf8PathBuf;
use keel_errors::{Diagnostic, ErrorCode};
use keel_parse::{Parse, ParseOptions};
pub use ::line_index::LineIndex;

#[salsa::input(debug)]
pub struct File {
    #[returns(ref)]
    pub path: Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
    #[returns(ref)]
    pub options: ParseOptions,
}

#[salsa::tracked(returns(ref))]
pub fn parse(db: &dyn salsa::Database, file: File) -> Parse {
    keel_parse::parse_text(file.text(db), file.options(db))
}

#[salsa::tracked(returns(ref), no_eq)]
pub fn line_index(db: &dyn salsa::Database, file: File) -> LineIndex {
    LineIndex::new(file.text(db))
}

/// A diagnostic resolved to a 1-based line and byte column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineDiagnostic {
    pub code: ErrorCode,
    pub line: u32,
    pub column: u32,
    pub args: Vec<String>,
    pub message: String,
}

impl LineDiagnostic {
    fn new(index: &LineIndex, diagnostic: &Diagnostic) -> Self {
        let position = index.line_col(diagnostic.range().start());
        Self {
            code: diagnostic.code(),
            line: position.line + 1,
            column: position.col + 1,
            args: diagnostic.args().map(str::to_owned).collect(),
            message: diagnostic.message(),
        }
    }
}

#[salsa::tracked(returns(ref))]
pub fn diagnostics(db: &dyn salsa::Database, file: File) -> Vec<LineDiagnostic> {
    let index = line_index(db, file);
    parse(db, file).diagnostics().iter().map(|d| LineDiagnostic::new(index, d)).collect()
}

#[salsa::db]
#[derive(Default, Clone)]
pub struct Database {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for Database {}
