use std::fs;
use std::path::Path;
use std::thread;

use keel_errors::{ErrorCode, TextRange};
use keel_parse::{Parse, ParseOptions, parse_text};
use keel_syntax::SyntaxNode;

const SNIPPETS: &[&str] = &[
    "",
    "}",
    "class",
    "namespace N { class C : B<int>, I where T : new() { } }",
    "class C { void M() { if (a < b) x = y ? z : w; else { foreach (var i in xs) ; } } }",
    "class C { int P { get; set; } = 1; event E e; int this[int i] { get => i; } }",
    "class C { void M() { var f = (int a, int b) => a + b; var o = new { A = 1, 2 }; } }",
    "class C { void M() { try { } catch (E e) when (true) { } finally { } } }",
    "class C { void M() { switch (x) { case 1: break; default: return; } } }",
    "struct S { public static S operator +(S a, S b) => a; }",
    "public partial record struct R(int X) : I;",
    "class C { void M() { int[] a = new int[] { 1, 2 }; a[0]++; goto L; L: ; } }",
    "class { void M( { int x = ; } ",
    "enum E { A = 1, B, , }",
    "interface I { int M<T>() where T : class, struct; }",
];

fn samples() -> Vec<String> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");
    let mut samples = SNIPPETS.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();
    let mut files = fs::read_dir(dir)
        .expect("test_data is readable")
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "cs"))
        .collect::<Vec<_>>();
    files.sort();
    for path in files {
        samples.push(fs::read_to_string(path).expect("test case is readable"));
    }
    samples
}

fn full_text(node: &SyntaxNode) -> String {
    node.tokens().map(|token| token.text().to_owned()).collect()
}

fn assert_invariants(text: &str, parse: &Parse) {
    let root = parse.syntax_node();
    assert_eq!(full_text(&root), text, "text does not round-trip");
    assert_eq!(usize::from(root.text_range().end()), text.len());

    let diagnostics = parse.diagnostics();
    assert!(
        diagnostics.windows(2).all(|pair| pair[0].range().start() <= pair[1].range().start()),
        "diagnostics are not ordered: {text:?}"
    );

    for node in root.descendants() {
        let expected = !node.diagnostics().is_empty() || node.tokens().any(|t| t.is_missing());
        assert_eq!(node.has_errors(), expected, "{:?} in {text:?}", node.kind());
    }
}

#[test]
fn samples_round_trip() {
    let options = ParseOptions::default();
    for text in samples() {
        let parse = parse_text(&text, &options);
        assert_invariants(&text, &parse);
    }
}

#[test]
fn reparse_is_stable() {
    let options = ParseOptions::default();
    for text in samples() {
        let first = parse_text(&text, &options);
        let second = parse_text(&full_text(&first.syntax_node()), &options);

        assert_eq!(first.debug_tree(), second.debug_tree());
        assert_eq!(first.diagnostics(), second.diagnostics());
        assert_eq!(first, second);
    }
}

#[test]
fn every_prefix_parses() {
    let options = ParseOptions::default();
    for text in SNIPPETS {
        for end in (0..=text.len()).filter(|&end| text.is_char_boundary(end)) {
            let prefix = &text[..end];
            assert_invariants(prefix, &parse_text(prefix, &options));
        }
    }
}

#[test]
fn every_token_deletion_parses() {
    let options = ParseOptions::default();
    for text in SNIPPETS {
        let tokens = parse_text(text, &options)
            .syntax_node()
            .tokens()
            .filter(|token| !token.is_missing())
            .map(|token| token.text_trimmed_range())
            .filter(|range| !range.is_empty())
            .collect::<Vec<TextRange>>();

        for range in tokens {
            let mut mutated = (*text).to_owned();
            mutated.replace_range(std::ops::Range::<usize>::from(range), "");
            let parse = parse_text(&mutated, &options);
            assert_invariants(&mutated, &parse);
        }
    }
}

#[test]
fn malformed_input_has_errors() {
    let options = ParseOptions::default();
    for text in ["class {", "class C { int }", "namespace", "class C { void M() { x = ; } }"] {
        let parse = parse_text(text, &options);
        assert!(parse.has_errors(), "{text:?}");
        assert!(!parse.diagnostics().is_empty(), "{text:?}");
    }
}

#[test]
fn parallel_parses_agree() {
    let texts = samples();
    let options = ParseOptions::default();
    let expected = texts.iter().map(|text| parse_text(text, &options)).collect::<Vec<_>>();

    thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    texts.iter().map(|text| parse_text(text, &options)).collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            let parses = handle.join().expect("parser thread panicked");
            assert_eq!(parses, expected);
        }
    });
}

#[test]
fn deeply_nested_initializers_abort_once() {
    const LEVELS: usize = 5000;

    let handle = thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(|| {
            let text = format!(
                "class C {{ C c = {}null{}; }}",
                "new C { c = ".repeat(LEVELS),
                " }".repeat(LEVELS)
            );
            let parse = parse_text(&text, &ParseOptions::default());
            assert_invariants(&text, &parse);
            parse.diagnostics()
        })
        .expect("thread spawns");

    let diagnostics = handle.join().expect("parser thread panicked");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), ErrorCode::InsufficientStack);
}
