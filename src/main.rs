//! CLI tool to check Flui sources and generate Dart views from them.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use flui_rs::{
    Diagnostic, GeneratorOptions, Lexer, ParserOptions, SourceBuffer, pascal_case_to_snake,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "flui",
    version,
    about = "Check Flui widget trees and generate Dart views from them."
)]
struct Cli {
    #[command(flatten)]
    flags: ParseFlags,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ParseFlags {
    /// Enable every strictness switch.
    #[arg(long, global = true)]
    strict: bool,
    /// Require `:` after attribute names and element headers.
    #[arg(long, global = true)]
    enforce_colons: bool,
}

impl ParseFlags {
    const fn options(&self) -> ParserOptions {
        if self.strict {
            return ParserOptions::strict();
        }
        ParserOptions {
            enforce_strict_indentation: false,
            enforce_colons: self.enforce_colons,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that source files parse without errors.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the token stream and lexer diagnostics as JSON.
    Tokens { file: PathBuf },
    /// Print the syntax tree as JSON.
    Ast { file: PathBuf },
    /// Generate the view and view-model Dart files.
    Build {
        file: PathBuf,
        /// Directory to write the generated files into.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Indent generated code with two spaces instead of tabs.
        #[arg(long)]
        spaces: bool,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let options = cli.flags.options();

    let ok = match &cli.command {
        Command::Check { files } => check(files, options),
        Command::Tokens { file } => tokens(file),
        Command::Ast { file } => ast(file, options),
        Command::Build {
            file,
            out_dir,
            spaces,
        } => {
            let generator = if *spaces {
                GeneratorOptions::spaces()
            } else {
                GeneratorOptions::tabs()
            };
            build(file, out_dir, options, &generator)
        }
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FLUI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &Path) -> Option<SourceBuffer> {
    match fs::read_to_string(path) {
        Ok(text) => Some(SourceBuffer::new(text)),
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            None
        }
    }
}

fn print_diagnostics<'a>(path: &Path, diagnostics: impl IntoIterator<Item = &'a Diagnostic>) {
    for d in diagnostics {
        eprintln!(
            "{}:{}:{}: {}: {}",
            path.display(),
            d.span.start.line,
            d.span.start.column,
            d.severity,
            d.message
        );
        for line in &d.source_lines {
            eprintln!("    {line}");
        }
    }
}

fn print_json(value: &impl Serialize) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(e) => {
            eprintln!("error: {e}");
            false
        }
    }
}

fn check(files: &[PathBuf], options: ParserOptions) -> bool {
    let mut ok = true;

    for path in files {
        let Some(source) = read_source(path) else {
            ok = false;
            continue;
        };

        let result = flui_rs::compile(&source, options);
        print_diagnostics(path, &result.diagnostics);

        match &result.document {
            Ok(doc) if !result.has_errors() => {
                eprintln!(
                    "{}: valid ({:?} {}, view model {})",
                    path.display(),
                    doc.kind,
                    doc.view_class_name(),
                    doc.view_model_class_name()
                );
            }
            _ => ok = false,
        }
    }

    ok
}

#[derive(Serialize)]
struct TokenDump<'a> {
    tokens: &'a [flui_rs::Token],
    diagnostics: &'a flui_rs::DiagnosticSink,
}

fn tokens(path: &Path) -> bool {
    let Some(source) = read_source(path) else {
        return false;
    };

    let mut lexer = Lexer::new();
    let tokens: Vec<_> = lexer.tokenize(&source).collect();
    let diagnostics = lexer.take_diagnostics();

    print_json(&TokenDump {
        tokens: &tokens,
        diagnostics: &diagnostics,
    }) && !diagnostics.has_errors()
}

fn ast(path: &Path, options: ParserOptions) -> bool {
    let Some(source) = read_source(path) else {
        return false;
    };

    let mut lexer = Lexer::new();
    let tokens: Vec<_> = lexer.tokenize(&source).collect();
    print_diagnostics(path, lexer.diagnostics());

    let mut parser = flui_rs::Parser::new(options);
    let document = parser.parse(&source, &tokens);
    print_diagnostics(path, parser.diagnostics());

    match document {
        Ok(doc) => print_json(&doc) && !lexer.diagnostics().has_errors(),
        Err(_) => false,
    }
}

fn build(path: &Path, out_dir: &Path, options: ParserOptions, generator: &GeneratorOptions) -> bool {
    let Some(source) = read_source(path) else {
        return false;
    };

    let result = flui_rs::compile(&source, options);
    print_diagnostics(path, &result.diagnostics);
    if result.has_errors() {
        return false;
    }
    let Ok(doc) = &result.document else {
        return false;
    };

    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("{}: {e}", out_dir.display());
        return false;
    }

    write_output(out_dir, doc.view_class_name(), &flui_rs::generate_view(doc, generator))
        && write_output(
            out_dir,
            doc.view_model_class_name(),
            &flui_rs::generate_view_model(doc, generator),
        )
}

fn write_output(out_dir: &Path, class_name: &str, contents: &str) -> bool {
    let target = out_dir.join(format!("{}.dart", pascal_case_to_snake(class_name)));
    match fs::write(&target, contents) {
        Ok(()) => {
            eprintln!("wrote {}", target.display());
            true
        }
        Err(e) => {
            eprintln!("{}: {e}", target.display());
            false
        }
    }
}

