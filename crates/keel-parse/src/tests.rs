use std::fs;
use std::path::{Path, PathBuf};

use expect_test::{Expect, expect, expect_file};
use keel_errors::{Diagnostic, ErrorCode, TextSize};
use keel_syntax::SyntaxKind;
use line_index::{LineCol, LineIndex};

use crate::{Feature, LanguageVersion, ParseOptions, parse_text};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "cs" {
                    let expected = path.with_extension("diagnostics");
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

/// 1-based line and column of `offset`.
fn line_col(text: &str, offset: TextSize) -> (u32, u32) {
    position(&LineIndex::new(text), offset)
}

fn position(index: &LineIndex, offset: TextSize) -> (u32, u32) {
    let LineCol { line, col } = index.line_col(offset);
    (line + 1, col + 1)
}

fn render(text: &str, diagnostics: &[Diagnostic]) -> String {
    let index = LineIndex::new(text);
    diagnostics
        .iter()
        .map(|diagnostic| {
            let (line, column) = position(&index, diagnostic.range().start());
            format!("({line},{column}): {diagnostic}\n")
        })
        .collect()
}

#[test]
fn parse() {
    let options = ParseOptions::default();

    for case in TestCase::list() {
        let parse = parse_text(&case.text, &options);
        assert_eq!(
            parse.syntax_node().text_range().len(),
            TextSize::of(case.text.as_str()),
            "{} does not cover its input",
            case.input.display()
        );

        let actual = render(&case.text, &parse.diagnostics());
        expect_file![&case.expected].assert_eq(&actual);
    }
}

fn check_with(text: &str, options: &ParseOptions, expect: Expect) {
    let parse = parse_text(text, options);
    let diagnostics = render(text, &parse.diagnostics());
    let actual = format!("{}Errors:\n{diagnostics}", parse.debug_tree());
    expect.assert_eq(&actual);
}

fn check(text: &str, expect: Expect) {
    check_with(text, &ParseOptions::default(), expect);
}

#[test]
fn empty_class() {
    check(
        "class C {}",
        expect![[r#"
            COMPILATION_UNIT@0..10
              CLASS_DECL@0..10
                CLASS_KW@0..5 "class"
                IDENT@6..7 "C"
                LEFT_BRACE@8..9 "{"
                RIGHT_BRACE@9..10 "}"
              EOF@10..10 ""
            Errors:
        "#]],
    );
}

#[test]
fn missing_class_name() {
    check(
        "class {}",
        expect![[r#"
            COMPILATION_UNIT@0..8
              CLASS_DECL@0..8
                CLASS_KW@0..5 "class"
                IDENT@6..6 "" missing
                LEFT_BRACE@6..7 "{"
                RIGHT_BRACE@7..8 "}"
              EOF@8..8 ""
            Errors:
            (1,7): error CS1001: Identifier expected
        "#]],
    );
}

#[test]
fn skipped_member_token() {
    check(
        "class C { ) }",
        expect![[r#"
            COMPILATION_UNIT@0..13
              CLASS_DECL@0..13
                CLASS_KW@0..5 "class"
                IDENT@6..7 "C"
                LEFT_BRACE@8..9 "{"
                skipped ")"
                RIGHT_BRACE@12..13 "}"
              EOF@13..13 ""
            Errors:
            (1,11): error CS1519: Invalid token ')' in class, record, struct, or interface member declaration
        "#]],
    );
}

#[test]
fn feature_below_language_version() {
    let options = ParseOptions::default().with_version(LanguageVersion::V5);
    let parse = parse_text("class C { int P => 1; }", &options);
    let diagnostics = parse.diagnostics();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), ErrorCode::FeatureNotAvailableInVersion);
    assert_eq!(
        diagnostics[0].args().collect::<Vec<_>>(),
        ["expression-bodied property", "5", "6"]
    );
    assert_eq!(line_col("class C { int P => 1; }", diagnostics[0].range().start()), (1, 17));

    let parse = parse_text("class C { int P => 1; }", &ParseOptions::default());
    assert!(!parse.has_errors());
}

#[test]
fn experimental_feature() {
    let text = "class C { void M() { int F() => 1; } }";

    let parse = parse_text(text, &ParseOptions::default());
    let diagnostics = parse.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), ErrorCode::FeatureIsExperimental);
    assert_eq!(line_col(text, diagnostics[0].range().start()), (1, 26));

    let options = ParseOptions::default().with_experimental(Feature::LocalFunctions);
    assert!(parse_text(text, &options).diagnostics().is_empty());
}

#[test]
fn gated_tree_matches_enabled_tree() {
    let text = "record R(int X);";
    let old = parse_text(text, &ParseOptions::default().with_version(LanguageVersion::V8));
    let new = parse_text(text, &ParseOptions::default());

    assert_eq!(old.diagnostics().len(), 1);
    assert!(new.diagnostics().is_empty());

    let kinds = |parse: &crate::Parse| {
        parse.syntax_node().descendants().map(|node| node.kind()).collect::<Vec<_>>()
    };
    assert_eq!(kinds(&old), kinds(&new));
}

#[test]
fn depth_limit_is_fatal() {
    let text = format!("class C {{ int x = {}1{}; }}", "(".repeat(50), ")".repeat(50));
    let options = ParseOptions::default().with_max_depth(16);
    let parse = parse_text(&text, &options);
    let diagnostics = parse.diagnostics();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), ErrorCode::InsufficientStack);
    assert_eq!(parse.syntax_node().text_range().len(), TextSize::of(text.as_str()));

    assert!(parse_text(&text, &ParseOptions::default()).diagnostics().is_empty());
}

#[test]
fn line_col_is_one_based() {
    let text = "ab\ncd";
    assert_eq!(line_col(text, TextSize::new(0)), (1, 1));
    assert_eq!(line_col(text, TextSize::new(2)), (1, 3));
    assert_eq!(line_col(text, TextSize::new(3)), (2, 1));
    assert_eq!(line_col(text, TextSize::new(5)), (2, 3));
}

#[test]
fn missing_class_name_keeps_base_list() {
    check(
        "public class : \n{ }",
        expect![[r#"
            COMPILATION_UNIT@0..19
              CLASS_DECL@0..19
                PUBLIC_KW@0..6 "public"
                CLASS_KW@7..12 "class"
                IDENT@13..13 "" missing
                BASE_LIST@13..16
                  COLON@13..14 ":"
                  SIMPLE_BASE_TYPE@16..16
                    IDENTIFIER_NAME@16..16
                      IDENT@16..16 "" missing
                LEFT_BRACE@16..17 "{"
                RIGHT_BRACE@18..19 "}"
              EOF@19..19 ""
            Errors:
            (1,14): error CS1001: Identifier expected
            (1,15): error CS1031: Type expected
        "#]],
    );
}

#[test]
fn missing_enum_name_keeps_members() {
    check(
        "public enum\n{ A, B, C = 1 }",
        expect![[r#"
            COMPILATION_UNIT@0..27
              ENUM_DECL@0..27
                PUBLIC_KW@0..6 "public"
                ENUM_KW@7..11 "enum"
                IDENT@12..12 "" missing
                LEFT_BRACE@12..13 "{"
                ENUM_MEMBER_DECL@14..15
                  IDENT@14..15 "A"
                COMMA@15..16 ","
                ENUM_MEMBER_DECL@17..18
                  IDENT@17..18 "B"
                COMMA@18..19 ","
                ENUM_MEMBER_DECL@20..26
                  IDENT@20..21 "C"
                  EQUALS_VALUE_CLAUSE@22..26
                    EQ@22..23 "="
                    LITERAL_EXPR@24..26
                      INT_NUMBER@24..25 "1"
                RIGHT_BRACE@26..27 "}"
              EOF@27..27 ""
            Errors:
            (1,12): error CS1001: Identifier expected
        "#]],
    );
}

#[test]
fn untyped_foreach_keeps_statement() {
    let text = "class C { void M() { foreach (x in myarray) { } } }";
    let parse = parse_text(text, &ParseOptions::default());

    let codes = parse.diagnostics().iter().map(Diagnostic::code).collect::<Vec<_>>();
    assert_eq!(codes, [ErrorCode::IdentifierExpected, ErrorCode::BadForeachDecl]);
    assert_eq!(line_col(text, parse.diagnostics()[1].range().start()), (1, 33));

    let foreach = parse
        .syntax_node()
        .descendants()
        .find(|node| node.kind() == SyntaxKind::FOREACH_STMT)
        .expect("foreach statement");
    let children = foreach.children().map(|node| node.kind()).collect::<Vec<_>>();
    assert_eq!(
        children,
        [SyntaxKind::IDENTIFIER_NAME, SyntaxKind::IDENTIFIER_NAME, SyntaxKind::BLOCK]
    );
    let in_kw = foreach.token_by_kind(SyntaxKind::IN_KW).expect("in keyword");
    assert!(!in_kw.is_missing());
}

#[test]
fn bad_parameter_skips_to_list_end() {
    let text = "class C { void M(int a, 5) { } void N() { } }";
    let parse = parse_text(text, &ParseOptions::default());

    let diagnostics = parse.diagnostics();
    let codes = diagnostics.iter().map(Diagnostic::code).collect::<Vec<_>>();
    assert_eq!(
        codes,
        [ErrorCode::TypeExpected, ErrorCode::IdentifierExpected, ErrorCode::SyntaxError]
    );
    for diagnostic in &diagnostics {
        assert_eq!(line_col(text, diagnostic.range().start()), (1, 25));
    }

    let class = parse.syntax_node().children().next().expect("class");
    let methods = class.children().filter(|node| node.kind() == SyntaxKind::METHOD_DECL);
    assert_eq!(methods.count(), 2);
}

#[test]
fn long_assignment_and_prefix_chains_parse() {
    let text = format!("class C {{ void M() {{ {}1; }} }}", "a = ".repeat(300));
    let parse = parse_text(&text, &ParseOptions::default());
    assert!(parse.diagnostics().is_empty());
    let nodes = parse.syntax_node().descendants();
    let assignments = nodes.filter(|node| node.kind() == SyntaxKind::ASSIGNMENT_EXPR);
    assert_eq!(assignments.count(), 300);

    let text = format!("class C {{ int x = {}1; }}", "- ".repeat(300));
    let parse = parse_text(&text, &ParseOptions::default());
    assert!(parse.diagnostics().is_empty());
}
