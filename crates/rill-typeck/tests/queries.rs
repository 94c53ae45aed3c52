//! Language-query surface tests: outlines, go-to-definition, hover, and
//! the sink invariants they rely on.

use rill_common::db::Database;
use rill_common::span::Position;
use rill_typeck::Analysis;

fn check(source: &str) -> (Database, Analysis, rill_common::db::DocumentId) {
    let mut db = Database::new();
    let document = db.test_document(source);
    let mut analysis = Analysis::new();
    analysis.check_document(&mut db, document);
    (db, analysis, document)
}

#[test]
fn document_symbols_list_definitions_in_order() {
    let source = "
        struct Point = x: I32, y: I32
        fn origin(): Point = Point { x = 0, y = 0 }
        module geometry { fn zero(): I32 = 0 }
    ";
    let (db, analysis, document) = check(source);
    let symbols = analysis.document_symbols(&db, document);
    let names: Vec<_> = symbols
        .iter()
        .map(|symbol| (symbol.kind, symbol.name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("struct", "Point"),
            ("function", "origin"),
            ("module", "geometry"),
            ("function", "zero"),
        ]
    );
}

#[test]
fn definition_jumps_to_the_declaration() {
    //                     0123456789012345678901234567890123456789
    let source = "fn g(): I32 = 0 fn f(): I32 = g()";
    let (db, analysis, document) = check(source);

    // The `g` in `g()` sits at column 30.
    let target = analysis
        .definition(&db, document, Position::new(0, 30))
        .expect("the call resolves to a definition");
    assert_eq!(target.document, document);
    assert_eq!(target.range.start, Position::new(0, 3));
}

#[test]
fn hover_describes_the_symbol() {
    let source = "fn g(): I32 = 0 fn f(): I32 = g()";
    let (db, analysis, document) = check(source);
    let hover = analysis.hover(&db, document, Position::new(0, 30));
    assert_eq!(hover.as_deref(), Some("fn g"));
}

#[test]
fn reference_and_symbol_sinks_stay_aligned() {
    // hover() indexes the symbol table with the reference index, so the
    // two sinks must grow in lockstep.
    let source = "
        module m { fn g(): I32 = 0 }
        fn f(): I32 = m::g()
    ";
    let (db, analysis, document) = check(source);
    let references = db.document(document).references.len();
    let symbols = analysis.documents[&document].symbols.len();
    assert_eq!(references, symbols);
    assert!(references >= 2, "module and function usages are recorded");
}

#[test]
fn semantic_tokens_are_upgraded_by_resolution() {
    let source = "fn g(): I32 = 0 fn f(): I32 = g()";
    let (db, _, document) = check(source);
    let upgraded = db
        .document(document)
        .semantic_tokens
        .iter()
        .any(|token| token.kind == rill_common::db::SemanticTokenKind::Function);
    assert!(upgraded, "the resolver reclassifies resolved function names");
}
