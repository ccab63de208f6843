use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use keel_db::{Database, File, diagnostics, parse};
use keel_errors::Renderer;
use keel_parse::{Feature, LanguageVersion, ParseOptions};
use keel_syntax::SyntaxKind::{self, *};
use keel_syntax::ast::{AstNode, CompilationUnit, Member};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(version, about = "Parse C#-like sources and report syntax errors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    #[command(flatten)]
    options: OptionsArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Report the syntax errors of every file.
    Check {
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
        /// One line per diagnostic instead of annotated snippets.
        #[arg(long)]
        brief: bool,
    },
    /// Print the syntax tree.
    Tree { path: Utf8PathBuf },
    /// Print the declared namespaces, types and members.
    Outline { path: Utf8PathBuf },
}

#[derive(Args)]
struct OptionsArgs {
    /// `1` through `12`, `latest` or `preview`.
    #[arg(long, global = true, default_value_t = LanguageVersion::LATEST)]
    lang_version: LanguageVersion,
    /// Enable an experimental feature, e.g. `local-functions`.
    #[arg(long = "feature", global = true)]
    features: Vec<Feature>,
    #[arg(long, global = true, default_value_t = ParseOptions::DEFAULT_MAX_DEPTH)]
    max_depth: u32,
}

impl OptionsArgs {
    fn into_parse_options(self) -> ParseOptions {
        let options = ParseOptions::default()
            .with_version(self.lang_version)
            .with_max_depth(self.max_depth);
        self.features.into_iter().fold(options, ParseOptions::with_experimental)
    }
}

fn load(db: &Database, path: Utf8PathBuf, options: &ParseOptions) -> anyhow::Result<File> {
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read `{path}`"))?;
    Ok(File::new(db, path, text, options.clone()))
}

fn check(db: &Database, files: &[File], brief: bool) -> usize {
    let renderer = Renderer::styled();
    let mut errors = 0;

    for &file in files {
        let path = file.path(db).as_str();
        if brief {
            let found = diagnostics(db, file);
            for diagnostic in found {
                let (line, column) = (diagnostic.line, diagnostic.column);
                eprintln!(
                    "{path}({line},{column}): error {}: {}",
                    diagnostic.code, diagnostic.message
                );
            }
            errors += found.len();
            continue;
        }

        let text = file.text(db);
        let found = parse(db, file).diagnostics();
        for diagnostic in &found {
            eprintln!("{}", diagnostic.render(&renderer, path, text));
        }
        errors += found.len();
    }
    errors
}

fn kind_label(kind: SyntaxKind) -> &'static str {
    match kind {
        ENUM_MEMBER_DECL => "enum member",
        FIELD_DECL => "field",
        EVENT_FIELD_DECL | EVENT_DECL => "event",
        PROPERTY_DECL => "property",
        INDEXER_DECL => "indexer",
        METHOD_DECL => "method",
        CONSTRUCTOR_DECL => "constructor",
        DESTRUCTOR_DECL => "destructor",
        OPERATOR_DECL | CONVERSION_OPERATOR_DECL => "operator",
        _ => "incomplete member",
    }
}

fn print_outline(member: &Member, depth: usize) {
    let kind = match member {
        Member::Namespace(_) => "namespace".to_owned(),
        Member::Type(ty) => {
            ty.keyword().map(|keyword| keyword.text_trimmed().to_owned()).unwrap_or_default()
        }
        Member::Other(node) => kind_label(node.kind()).to_owned(),
    };
    println!("{:indent$}{kind} {}", "", member.label(), indent = depth * 2);

    for child in member.members() {
        print_outline(&child, depth + 1);
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let options = cli.options.into_parse_options();
    let db = Database::default();

    match cli.command {
        Command::Check { paths, brief } => {
            let files = paths
                .into_iter()
                .map(|path| load(&db, path, &options))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let errors = check(&db, &files, brief);
            if errors == 0 {
                return Ok(ExitCode::SUCCESS);
            }
            eprintln!("{errors} error(s) in {} file(s)", files.len());
            Ok(ExitCode::FAILURE)
        }
        Command::Tree { path } => {
            let file = load(&db, path, &options)?;
            print!("{}", parse(&db, file).debug_tree());
            Ok(ExitCode::SUCCESS)
        }
        Command::Outline { path } => {
            let file = load(&db, path, &options)?;
            let root = CompilationUnit::cast(parse(&db, file).syntax_node())
                .context("parser produced no compilation unit")?;
            for member in root.members() {
                print_outline(&member, 0);
            }
            log::debug!("outlined `{}`", file.path(&db));
            Ok(ExitCode::SUCCESS)
        }
    }
}
