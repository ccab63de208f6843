use keel_db::{Database, File, LineDiagnostic, diagnostics, line_index, parse};
use keel_errors::{ErrorCode, TextSize};
use keel_parse::{LanguageVersion, ParseOptions};
use salsa::Setter;

#[derive(Debug, PartialEq, Eq)]
struct ExpectedDiag {
    line: u32,
    message: String,
}

/// `//~ ERROR text` marks a diagnostic expected on that line.
fn parse_expectations(fixture: &str) -> Vec<ExpectedDiag> {
    let mut expected = Vec::new();

    for (idx, line) in fixture.lines().enumerate() {
        let Some((_, comment)) = line.split_once("//~") else {
            continue;
        };
        let comment = comment.trim();
        let comment = comment.strip_prefix("ERROR").unwrap_or(comment).trim();
        if comment.is_empty() {
            continue;
        }
        expected.push(ExpectedDiag { line: idx as u32 + 1, message: comment.to_owned() });
    }

    expected
}

#[track_caller]
fn check(fixture: &str) {
    let db = Database::default();
    let file = File::new(&db, "check.cs".into(), fixture.to_owned(), ParseOptions::default());

    let mut actual = diagnostics(&db, file).clone();
    let expected = parse_expectations(fixture);

    assert_eq!(
        expected.len(),
        actual.len(),
        "expected {} diagnostic(s), got {}\nexpected: {expected:#?}\nactual: {actual:#?}",
        expected.len(),
        actual.len(),
    );

    for expected_diag in expected {
        let Some(pos) = actual.iter().position(|diag| {
            diag.line == expected_diag.line && diag.message.contains(&expected_diag.message)
        }) else {
            panic!(
                "missing diagnostic on line {} containing `{}`\nactual: {actual:#?}",
                expected_diag.line, expected_diag.message
            );
        };
        actual.remove(pos);
    }

    assert!(actual.is_empty(), "unexpected diagnostics:\n{actual:#?}");
}

#[test]
fn well_formed_file_is_clean() {
    check(
        r#"
namespace Demo
{
    public class Counter
    {
        private int count;
        public int Count => count;
        public void Increment() { count++; }
    }
}
"#,
    );
}

#[test]
fn diagnostics_land_on_their_lines() {
    check(
        r#"
class //~ ERROR Identifier expected
{
    void M()
    {
        int x = 1 //~ ERROR ; expected
    }
}
"#,
    );
}

#[test]
fn misplaced_statement_in_type_body() {
    check(
        r#"
class C
{
    return; //~ ERROR Invalid token 'return'
}
"#,
    );
}

#[test]
fn positions_are_one_based() {
    let db = Database::default();
    let text = "class C\n{\n  int x\n}";
    let file = File::new(&db, "pos.cs".into(), text.to_owned(), ParseOptions::default());

    let diagnostics = diagnostics(&db, file);
    assert_eq!(
        diagnostics.as_slice(),
        [LineDiagnostic {
            code: ErrorCode::SemicolonExpected,
            line: 3,
            column: 8,
            args: Vec::new(),
            message: "; expected".to_owned(),
        }]
    );

    let position = line_index(&db, file).line_col(TextSize::new(3));
    assert_eq!((position.line, position.col), (0, 3));
}

#[test]
fn edits_invalidate_the_parse() {
    let mut db = Database::default();
    let file = File::new(&db, "edit.cs".into(), "class {}".to_owned(), ParseOptions::default());

    assert!(parse(&db, file).has_errors());
    assert_eq!(diagnostics(&db, file).len(), 1);

    file.set_text(&mut db).to("class C {}".to_owned());
    assert!(!parse(&db, file).has_errors());
    assert!(diagnostics(&db, file).is_empty());
}

#[test]
fn options_are_an_input() {
    let mut db = Database::default();
    let text = "class C { int P => 1; }".to_owned();
    let file = File::new(&db, "options.cs".into(), text, ParseOptions::default());
    assert!(diagnostics(&db, file).is_empty());

    let old = ParseOptions::default().with_version(LanguageVersion::V5);
    file.set_options(&mut db).to(old);

    let diagnostics = diagnostics(&db, file);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::FeatureNotAvailableInVersion);
    assert_eq!(diagnostics[0].args, ["expression-bodied property", "5", "6"]);
}

#[test]
fn parse_is_memoized() {
    let db = Database::default();
    let file = File::new(&db, "memo.cs".into(), "class C {}".to_owned(), ParseOptions::default());

    let first = parse(&db, file);
    let second = parse(&db, file);
    assert!(std::ptr::eq(first, second));
}
