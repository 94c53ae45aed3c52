//! The Rill compiler driver.
//!
//! Thin collaborator over the core crates: reads a file, runs the
//! requested slice of the pipeline, and renders the diagnostics the
//! core appended to the document. The library crates never abort; the
//! single fatal path (an unreadable file) lives here.

use std::path::PathBuf;
use std::process::ExitCode;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use rill_common::db::{Database, DocumentId};
use rill_common::diagnostic::Severity;
use rill_common::span::byte_range;
use rill_desugar::ast::AstArena;
use rill_desugar::display::Displayer;
use rill_desugar::Desugarer;
use rill_parser::nodes::item::Definition;
use rill_typeck::Analysis;

#[derive(Parser)]
#[command(name = "rillc", version, about = "The Rill compiler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lex, parse, desugar, and type-check a file, reporting diagnostics
    Check {
        path: PathBuf,
        /// Emit diagnostics as JSON, one object per line
        #[arg(long)]
        json: bool,
    },
    /// Lex and parse only
    Parse {
        path: PathBuf,
        /// Emit diagnostics as JSON, one object per line
        #[arg(long)]
        json: bool,
    },
    /// Dump the desugared tree
    Ast { path: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Check { path, json } => run_check(&path, json),
        Command::Parse { path, json } => run_parse(&path, json),
        Command::Ast { path } => run_ast(&path),
    }
}

/// Read a source file into the database. The one deliberate fatal exit:
/// everything downstream reports through diagnostics instead.
fn load(db: &mut Database, path: &PathBuf) -> Result<DocumentId, ExitCode> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(db.add_document(path.display().to_string(), text)),
        Err(error) => {
            eprintln!("error: cannot open {}: {error}", path.display());
            Err(ExitCode::FAILURE)
        }
    }
}

fn run_check(path: &PathBuf, json: bool) -> ExitCode {
    let mut db = Database::new();
    let document = match load(&mut db, path) {
        Ok(document) => document,
        Err(code) => return code,
    };

    let mut analysis = Analysis::new();
    analysis.check_document(&mut db, document);

    report(&db, document, json);
    exit_code(&db, document)
}

fn run_parse(path: &PathBuf, json: bool) -> ExitCode {
    let mut db = Database::new();
    let document = match load(&mut db, path) {
        Ok(document) => document,
        Err(code) => return code,
    };

    rill_parser::parse_document(&mut db, document);

    report(&db, document, json);
    exit_code(&db, document)
}

fn run_ast(path: &PathBuf) -> ExitCode {
    let mut db = Database::new();
    let document = match load(&mut db, path) {
        Ok(document) => document,
        Err(code) => return code,
    };

    let parse = rill_parser::parse_document(&mut db, document);
    let text = db.document(document).text.clone();
    let mut arena = AstArena::new();
    let mut desugarer = Desugarer::new(&mut db.interner, &mut arena, document, &text);

    enum Dumped {
        Function(rill_desugar::ast::Function),
        Enumeration(rill_desugar::ast::Enumeration),
        Alias(rill_desugar::ast::Alias),
        Concept(rill_desugar::ast::Concept),
        Implementation(rill_desugar::ast::Implementation),
    }

    let mut dumped = Vec::new();
    for definition in parse.source_file().definitions() {
        match definition {
            Definition::Fn(def) => dumped.push(Dumped::Function(desugarer.desugar_function(&def))),
            Definition::Struct(def) => {
                dumped.push(Dumped::Enumeration(desugarer.desugar_struct(&def)))
            }
            Definition::Enum(def) => dumped.push(Dumped::Enumeration(desugarer.desugar_enum(&def))),
            Definition::Alias(def) => dumped.push(Dumped::Alias(desugarer.desugar_alias(&def))),
            Definition::Concept(def) => {
                dumped.push(Dumped::Concept(desugarer.desugar_concept(&def)))
            }
            Definition::Impl(def) => {
                dumped.push(Dumped::Implementation(desugarer.desugar_implementation(&def)))
            }
            Definition::Module(_) | Definition::Import(_) => {}
        }
    }
    let diagnostics = desugarer.take_diagnostics();
    drop(desugarer);
    db.document_mut(document).diagnostics.extend(diagnostics);

    let displayer = Displayer::new(&arena, &db.interner);
    for definition in &dumped {
        let line = match definition {
            Dumped::Function(def) => displayer.function(def),
            Dumped::Enumeration(def) => displayer.enumeration(def),
            Dumped::Alias(def) => displayer.alias(def),
            Dumped::Concept(def) => displayer.concept(def),
            Dumped::Implementation(def) => displayer.implementation(def),
        };
        println!("{line}");
    }

    report(&db, document, false);
    exit_code(&db, document)
}

fn exit_code(db: &Database, document: DocumentId) -> ExitCode {
    if db.document(document).has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Render every diagnostic on the document, in source order.
fn report(db: &Database, document: DocumentId, json: bool) {
    let doc = db.document(document);
    let mut diagnostics = doc.diagnostics.clone();
    diagnostics.sort_by_key(|diagnostic| diagnostic.range.start);

    if json {
        for diagnostic in &diagnostics {
            match serde_json::to_string(diagnostic) {
                Ok(line) => println!("{line}"),
                Err(error) => eprintln!("error: cannot serialize diagnostic: {error}"),
            }
        }
        return;
    }

    for diagnostic in &diagnostics {
        let (kind, color) = match diagnostic.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
            Severity::Hint | Severity::Information => (ReportKind::Advice, Color::Blue),
        };
        let span = byte_range(&doc.text, diagnostic.range);

        let mut builder = Report::build(kind, span.clone())
            .with_message(&diagnostic.message)
            .with_label(
                Label::new(span)
                    .with_message(&diagnostic.message)
                    .with_color(color),
            );
        let mut notes = Vec::new();
        for note in &diagnostic.related {
            // Related ranges in other documents only contribute text.
            let related_doc = db.document(note.location.document);
            if related_doc.path == doc.path {
                let related_span = byte_range(&related_doc.text, note.location.range);
                builder.add_label(
                    Label::new(related_span)
                        .with_message(&note.message)
                        .with_color(Color::Cyan),
                );
            } else {
                notes.push(format!("{} (in {})", note.message, related_doc.path));
            }
        }
        if !notes.is_empty() {
            builder = builder.with_note(notes.join("\n"));
        }

        let _ = builder.finish().eprint(Source::from(doc.text.as_str()));
    }
}
