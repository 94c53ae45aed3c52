//! Desugaring tests: parse, desugar, render, and compare against the
//! canonical textual form.

use rill_common::db::Database;
use rill_desugar::ast::AstArena;
use rill_desugar::display::Displayer;
use rill_desugar::Desugarer;
use rill_parser::nodes::item::Definition;

enum Desugared {
    Function(rill_desugar::ast::Function),
    Enumeration(rill_desugar::ast::Enumeration),
    Alias(rill_desugar::ast::Alias),
    Concept(rill_desugar::ast::Concept),
    Implementation(rill_desugar::ast::Implementation),
}

/// Parse and desugar `source`, rendering every definition back to text.
fn desugar(source: &str) -> String {
    let mut db = Database::new();
    let id = db.test_document(source);
    let parse = rill_parser::parse(source);
    let mut arena = AstArena::new();
    let mut desugarer = Desugarer::new(&mut db.interner, &mut arena, id, source);

    let mut definitions = Vec::new();
    for definition in parse.source_file().definitions() {
        match definition {
            Definition::Fn(def) => {
                definitions.push(Desugared::Function(desugarer.desugar_function(&def)));
            }
            Definition::Struct(def) => {
                definitions.push(Desugared::Enumeration(desugarer.desugar_struct(&def)));
            }
            Definition::Enum(def) => {
                definitions.push(Desugared::Enumeration(desugarer.desugar_enum(&def)));
            }
            Definition::Alias(def) => {
                definitions.push(Desugared::Alias(desugarer.desugar_alias(&def)));
            }
            Definition::Concept(def) => {
                definitions.push(Desugared::Concept(desugarer.desugar_concept(&def)));
            }
            Definition::Impl(def) => {
                definitions.push(Desugared::Implementation(desugarer.desugar_implementation(&def)));
            }
            Definition::Module(_) | Definition::Import(_) => {}
        }
    }

    let displayer = Displayer::new(&arena, &db.interner);
    definitions
        .iter()
        .map(|definition| match definition {
            Desugared::Function(def) => displayer.function(def),
            Desugared::Enumeration(def) => displayer.enumeration(def),
            Desugared::Alias(def) => displayer.alias(def),
            Desugared::Concept(def) => displayer.concept(def),
            Desugared::Implementation(def) => displayer.implementation(def),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[track_caller]
fn assert_simple_desugar(source: &str) {
    assert_eq!(desugar(source), source);
}

#[test]
fn block_expression() {
    assert_eq!(desugar("fn f() {}"), "fn f() { () }");
    assert_eq!(desugar("fn f() { 5 }"), "fn f() { 5 }");
    assert_eq!(desugar("fn f() { 5; }"), "fn f() { 5; () }");
    assert_eq!(desugar("fn f() { 5; 10 }"), "fn f() { 5; 10 }");
    assert_eq!(desugar("fn f() { 5; 10; }"), "fn f() { 5; 10; () }");
}

#[test]
fn function_body_normalization() {
    assert_eq!(desugar("fn f() { 5 }"), "fn f() { 5 }");
    assert_eq!(desugar("fn f() = 5"), "fn f() { 5 }");
    assert_eq!(desugar("fn f() = { 5 }"), "fn f() { 5 }");
}

#[test]
fn operator_precedence() {
    assert_eq!(
        desugar("fn f() { (a * b + c) + (d + e * f) }"),
        "fn f() { (((a * b) + c) + (d + (e * f))) }"
    );
    assert_eq!(
        desugar("fn f() { a <$> b && c <= d ?= e + f / g }"),
        "fn f() { (a <$> (b && (c <= (d ?= (e + (f / g)))))) }"
    );
    assert_eq!(
        desugar("fn f() { a / b + c ?= d <= e && f <$> g }"),
        "fn f() { ((((((a / b) + c) ?= d) <= e) && f) <$> g) }"
    );
    assert_eq!(desugar("fn f() { a + b && c }"), "fn f() { ((a + b) && c) }");
    assert_eq!(
        desugar("fn f() { a %% c % d ?= e }"),
        "fn f() { (a %% ((c % d) ?= e)) }"
    );
    assert_eq!(
        desugar("fn f() { a + b + c + d }"),
        "fn f() { (((a + b) + c) + d) }"
    );
    assert_eq!(
        desugar("fn f() { a := b + c * d }"),
        "fn f() { (a := (b + (c * d))) }"
    );
    assert_eq!(
        desugar("fn f() { a * b + c * d }"),
        "fn f() { ((a * b) + (c * d)) }"
    );
}

#[test]
fn while_loop_expression() {
    assert_eq!(
        desugar("fn f() { while x { y } }"),
        "fn f() { loop { if x { y } else break () } }"
    );
    assert_eq!(
        desugar("fn f() { while let x = y { z } }"),
        "fn f() { loop { match y { immut x -> { z } _ -> break () } } }"
    );
}

#[test]
fn conditional_expression() {
    assert_eq!(desugar("fn f() { if x { y } }"), "fn f() { if x { y } else () }");
    assert_eq!(
        desugar("fn f() { if x { y } else { z } }"),
        "fn f() { if x { y } else { z } }"
    );
    assert_eq!(
        desugar("fn f() { if a { b } elif c { d } else { e } }"),
        "fn f() { if a { b } else if c { d } else { e } }"
    );
    assert_eq!(
        desugar("fn f() { if let x = y { z } }"),
        "fn f() { match y { immut x -> { z } _ -> () } }"
    );
    assert_eq!(
        desugar("fn f() { if let a = b { c } else { d } }"),
        "fn f() { match b { immut a -> { c } _ -> { d } } }"
    );
}

#[test]
fn discard_expression() {
    assert_eq!(desugar("fn f() { discard x; }"), "fn f() { { let _ = x; () }; () }");
}

#[test]
fn implicit_tuple_binding() {
    assert_eq!(
        desugar("fn f() { let a, b = x; }"),
        "fn f() { let (immut a, immut b) = x; () }"
    );
}

#[test]
fn match_case_tuple_sugar() {
    assert_eq!(
        desugar("fn f() { match x { a, b -> a } }"),
        "fn f() { match x { (immut a, immut b) -> a } }"
    );
}

#[test]
fn parens_are_erased() {
    assert_eq!(desugar("fn f() { (5) }"), "fn f() { 5 }");
    assert_eq!(desugar("fn f() { ((x)) }"), "fn f() { x }");
    assert_eq!(desugar("fn f() { (5, 3) }"), "fn f() { (5, 3) }");
}

#[test]
fn struct_definition() {
    assert_simple_desugar("struct S = a: I32, b: Float");
    assert_simple_desugar("struct S[A, B] = a: A, b: B");
}

#[test]
fn enum_definition() {
    assert_simple_desugar("enum E = aaa | bbb(I32) | ccc(Float, Char)");
    assert_simple_desugar("enum Option[T] = none | some(T)");
}

#[test]
fn alias_definition() {
    assert_simple_desugar("alias T = U");
    assert_simple_desugar("alias A[B] = (B, B)");
}

#[test]
fn desugaring_canonical_forms_is_identity() {
    // Already-canonical constructs pass through structurally unchanged.
    assert_simple_desugar("fn f() { loop { if x { y } else { break () } } }");
    assert_simple_desugar("fn f() { match y { immut x -> { z } _ -> 0 } }");
    assert_simple_desugar("fn f() { let immut x = 5; x }");
}

#[test]
fn method_calls_survive_desugaring() {
    assert_eq!(desugar("fn f() { a.b(c) }"), "fn f() { a.b(c) }");
    assert_eq!(desugar("fn f() { a.b[I32](c) }"), "fn f() { a.b[I32](c) }");
}

#[test]
fn for_loop_reports_unsupported() {
    let mut db = Database::new();
    let source = "fn f() { for x in xs {} }";
    let id = db.test_document(source);
    let parse = rill_parser::parse(source);
    assert!(parse.ok(), "for loops must parse: {:?}", parse.errors());

    let mut arena = AstArena::new();
    let mut desugarer = Desugarer::new(&mut db.interner, &mut arena, id, source);
    for definition in parse.source_file().definitions() {
        if let Definition::Fn(def) = definition {
            desugarer.desugar_function(&def);
        }
    }
    let diagnostics = desugarer.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("for loops are not supported"));
}

#[test]
fn ranges_are_preserved() {
    let mut db = Database::new();
    let source = "fn f() { while x { y } }";
    let id = db.test_document(source);
    let parse = rill_parser::parse(source);
    let mut arena = AstArena::new();
    let mut desugarer = Desugarer::new(&mut db.interner, &mut arena, id, source);
    let mut functions = Vec::new();
    for definition in parse.source_file().definitions() {
        if let Definition::Fn(def) = definition {
            functions.push(desugarer.desugar_function(&def));
        }
    }
    // The loop produced for `while` spans the original while construct:
    // columns 9..22 on line 0.
    let body = &functions[0].body;
    let block = arena.expression(*body);
    let rill_desugar::ast::ExpressionKind::Block { result, .. } = &block.kind else {
        panic!("function body must be a block");
    };
    let loop_range = arena.expression(*result).range;
    assert_eq!(loop_range.start, rill_common::span::Position::new(0, 9));
    assert_eq!(loop_range.stop, rill_common::span::Position::new(0, 22));
}
