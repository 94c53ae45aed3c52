//! End-to-end inference tests: parse, desugar, collect, resolve, and
//! inspect the diagnostics left on the document.

use rill_common::db::Database;
use rill_common::diagnostic::Severity;
use rill_typeck::Analysis;

fn check(source: &str) -> (Database, Analysis, rill_common::db::DocumentId) {
    let mut db = Database::new();
    let document = db.test_document(source);
    let mut analysis = Analysis::new();
    analysis.check_document(&mut db, document);
    (db, analysis, document)
}

fn error_messages(db: &Database, document: rill_common::db::DocumentId) -> Vec<String> {
    db.document(document)
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == Severity::Error)
        .map(|diagnostic| diagnostic.message.clone())
        .collect()
}

fn warning_messages(db: &Database, document: rill_common::db::DocumentId) -> Vec<String> {
    db.document(document)
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == Severity::Warning)
        .map(|diagnostic| diagnostic.message.clone())
        .collect()
}

#[track_caller]
fn assert_clean(source: &str) {
    let (db, _, document) = check(source);
    assert_eq!(
        error_messages(&db, document),
        Vec::<String>::new(),
        "expected no errors for {source:?}"
    );
}

#[test]
fn literal_types() {
    assert_clean("fn f(): I32 = 5");
    assert_clean("fn f(): Float = 5.0");
    assert_clean("fn f(): Bool = true");
    assert_clean("fn f(): String = \"hello\"");
    assert_clean("fn f(): Char = 'x'");
    assert_clean("fn f(): () = ()");
}

#[test]
fn integer_literals_take_their_context_type() {
    assert_clean("fn f(): U8 = 255");
    assert_clean("fn f(): I64 = 5");
    assert_clean("fn g(x: I16): I16 = x fn f(): I16 = g(3)");
}

#[test]
fn unconstrained_integer_requires_annotation() {
    let (db, _, document) = check("fn f(): () { let x = 0; discard x; }");
    let errors = error_messages(&db, document);
    assert!(
        errors.iter().any(|message| message.contains("type annotation required")),
        "got: {errors:?}"
    );
}

#[test]
fn conditionals_unify_branches() {
    assert_clean("fn f(c: Bool): I32 = if c { 1 } else { 2 }");

    let (db, _, document) = check("fn f(c: Bool): I32 = if c { 1 } else { \"x\" }");
    assert!(!error_messages(&db, document).is_empty());

    let (db, _, document) = check("fn f(): I32 = if \"nope\" { 1 } else { 2 }");
    let errors = error_messages(&db, document);
    assert!(
        errors.iter().any(|message| message.contains("expected Bool, found String")),
        "got: {errors:?}"
    );
}

#[test]
fn type_mismatch_reports_expected_and_found() {
    let (db, _, document) = check("fn f(): I32 = \"hello\"");
    let errors = error_messages(&db, document);
    assert!(
        errors
            .iter()
            .any(|message| message.contains("expected I32, found String")),
        "got: {errors:?}"
    );
}

#[test]
fn while_loops_type_as_unit() {
    assert_clean("fn f(mut c: Bool): () { while c { discard c; } }");
}

#[test]
fn loops_take_the_common_break_type() {
    assert_clean("fn f(): I32 = loop { break 5 }");
    let (db, _, document) = check("fn f(): I32 = loop { if true { break 5 } else { break \"x\" } }");
    assert!(!error_messages(&db, document).is_empty());
}

#[test]
fn break_outside_loop_is_an_error() {
    let (db, _, document) = check("fn f(): () { break; }");
    let errors = error_messages(&db, document);
    assert!(
        errors.iter().any(|message| message.contains("`break` outside of a loop")),
        "got: {errors:?}"
    );
}

#[test]
fn unused_binding_warns_once() {
    // Exactly one warning: `x` is unused, `_y` is underscore-exempt.
    let (db, _, document) = check("fn f(): I32 { let x: I32 = 0; let _y: I32 = 0; 0 }");
    assert_eq!(error_messages(&db, document), Vec::<String>::new());
    let warnings = warning_messages(&db, document);
    assert_eq!(warnings.len(), 1, "got: {warnings:?}");
    assert!(warnings[0].contains("unused variable `x`"));
}

#[test]
fn used_bindings_do_not_warn() {
    let (db, _, document) = check("fn f(): I32 { let x: I32 = 1; x }");
    assert_eq!(warning_messages(&db, document), Vec::<String>::new());
}

#[test]
fn shadowed_unused_binding_warns() {
    let (db, _, document) = check("fn f(): I32 { let x: I32 = 1; let x: I32 = 2; x }");
    let warnings = warning_messages(&db, document);
    assert_eq!(warnings.len(), 1, "got: {warnings:?}");
}

#[test]
fn blocks_scope_their_bindings() {
    assert_clean("fn f(): I32 { let x: I32 = 1; discard { let y: I32 = 2; x + y }; x }");

    let (db, _, document) = check("fn f(): I32 { discard { let y: I32 = 2; y }; y }");
    let errors = error_messages(&db, document);
    assert!(
        errors.iter().any(|message| message.contains("`y` is not defined here")),
        "got: {errors:?}"
    );
}

#[test]
fn module_paths_resolve() {
    // `m::g` resolves to the function collected inside `m`.
    let source = "module m { fn g(): I32 = 0 } fn f(): I32 = m::g()";
    let (db, _, document) = check(source);
    assert_eq!(error_messages(&db, document), Vec::<String>::new());

    // The reference sink records the resolved usage: `g` is defined at
    // column 14 of the source line.
    let references = &db.document(document).references;
    assert!(
        references.iter().any(|reference| reference.target.range.start.column == 14),
        "expected a reference to `g`'s definition, got {references:?}"
    );
}

#[test]
fn functions_may_recurse() {
    assert_clean("fn f(n: I32): I32 = if true { n } else { f(n) }");
}

#[test]
fn mutually_recursive_functions_resolve() {
    assert_clean("fn f(n: I32): I32 = g(n) fn g(n: I32): I32 = f(n)");
}

#[test]
fn generic_enum_round_trip() {
    let source = "
        enum Option[T] = none | some(T)
        fn unwrap_or(o: Option[I32], d: I32): I32 {
            match o { Option::some(x) -> x Option::none -> d }
        }
    ";
    assert_clean(source);
}

#[test]
fn abbreviated_constructor_patterns_use_the_matched_type() {
    let source = "
        enum Option[T] = none | some(T)
        fn unwrap_or(o: Option[I32], d: I32): I32 {
            match o { ::some(x) -> x ::none -> d }
        }
    ";
    assert_clean(source);
}

#[test]
fn constructor_calls_build_enum_values() {
    let source = "
        enum Option[T] = none | some(T)
        fn f(): Option[I32] = Option::some(5)
    ";
    assert_clean(source);
}

#[test]
fn struct_fields_and_initializers() {
    let source = "
        struct Point = x: I32, y: I32
        fn get_x(p: Point): I32 = p.x
        fn make(): Point = Point { x = 1, y = 2 }
    ";
    assert_clean(source);
}

#[test]
fn generic_struct_field_access_substitutes_arguments() {
    let source = "
        struct Box[T] = value: T
        fn unbox(b: Box[I32]): I32 = b.value
    ";
    assert_clean(source);
}

#[test]
fn method_calls_resolve_through_impl_blocks() {
    let source = "
        struct Counter = count: I32
        impl Counter {
            fn get(self): I32 = self.count
        }
        fn f(c: Counter): I32 = c.get()
    ";
    assert_clean(source);
}

#[test]
fn generic_impl_methods_instantiate() {
    let source = "
        struct Box[T] = value: T
        impl[T] Box[T] {
            fn get(self): T = self.value
        }
        fn f(b: Box[I32]): I32 = b.get()
    ";
    assert_clean(source);
}

#[test]
fn typeof_types_resolve_their_expression() {
    assert_clean("fn g(): I32 = 0 fn f(): typeof(g()) = g()");
}

#[test]
fn tuples_and_tuple_fields() {
    assert_clean("fn f(): I32 { let p: (I32, Bool) = (1, true); p.0 }");

    let (db, _, document) = check("fn f(): I32 { let p: (I32, Bool) = (1, true); p.5 }");
    let errors = error_messages(&db, document);
    assert!(
        errors.iter().any(|message| message.contains("no field 5")),
        "got: {errors:?}"
    );
}

#[test]
fn arrays_and_indexing() {
    assert_clean("fn f(): I32 { let xs: [I32; 3] = [1; 2; 3]; xs.[0] }");
}

#[test]
fn references_carry_their_mutability() {
    assert_clean("fn f(x: &mut I32): &mut I32 = x");

    let (db, _, document) = check("fn f(x: &I32): &mut I32 = x");
    let errors = error_messages(&db, document);
    assert!(
        errors.iter().any(|message| message.contains("mutability mismatch")),
        "got: {errors:?}"
    );
}

#[test]
fn casts_are_unchecked_conversions() {
    assert_clean("fn f(x: I32): I64 = x as I64");
}

#[test]
fn ascriptions_pin_the_type() {
    assert_clean("fn f(): I32 = 5: I32");

    let (db, _, document) = check("fn f(): I32 = \"x\": I32");
    assert!(!error_messages(&db, document).is_empty());
}

#[test]
fn sizeof_is_u64() {
    assert_clean("fn f(): U64 = sizeof(I32)");
}

#[test]
fn alias_substitutes_target() {
    assert_clean("alias Pair = (I32, I32) fn f(): Pair = (1, 2)");
    assert_clean("alias Twice[T] = (T, T) fn f(): Twice[I32] = (1, 2)");
}

#[test]
fn import_hook_resolves_cross_document_symbols() {
    struct TestImporter {
        library: rill_common::db::DocumentId,
    }
    impl rill_typeck::ImportResolver for TestImporter {
        fn resolve(
            &mut self,
            _db: &mut Database,
            segments: &[String],
        ) -> Option<rill_common::db::DocumentId> {
            (segments == ["lib"]).then_some(self.library)
        }
    }

    let mut db = Database::new();
    let library = db.add_document("lib.rl", "fn helper(): I32 = 7");
    let main = db.add_document("main.rl", "import lib fn f(): I32 = lib::helper()");

    let mut analysis = Analysis::with_importer(Box::new(TestImporter { library }));
    analysis.check_document(&mut db, main);

    assert_eq!(error_messages(&db, library), Vec::<String>::new());
    assert_eq!(error_messages(&db, main), Vec::<String>::new());
}
