//! Diagnostic-focused scenarios: resolution errors, cycles, duplicates,
//! and method lookup failures.

use rill_common::db::Database;
use rill_common::diagnostic::{Diagnostic, Severity};
use rill_typeck::Analysis;

fn check(source: &str) -> Vec<Diagnostic> {
    let mut db = Database::new();
    let document = db.test_document(source);
    let mut analysis = Analysis::new();
    analysis.check_document(&mut db, document);
    db.document(document).diagnostics.clone()
}

fn errors(source: &str) -> Vec<String> {
    check(source)
        .into_iter()
        .filter(|diagnostic| diagnostic.severity == Severity::Error)
        .map(|diagnostic| diagnostic.message)
        .collect()
}

#[track_caller]
fn assert_error_containing(source: &str, needle: &str) {
    let errors = errors(source);
    assert!(
        errors.iter().any(|message| message.contains(needle)),
        "expected an error containing {needle:?}, got {errors:?}"
    );
}

#[test]
fn name_not_in_scope() {
    assert_error_containing("fn f(): I32 = y", "`y` is not defined here");
    assert_error_containing("fn f(): Missing = 0", "`Missing` is not defined here");
}

#[test]
fn duplicate_definitions_in_one_environment() {
    let diagnostics = check("fn f(): () = () fn f(): () = ()");
    let duplicate = diagnostics
        .iter()
        .find(|diagnostic| diagnostic.message.contains("duplicate definition of `f`"))
        .expect("expected a duplicate-definition error");
    // The error points back at the first definition.
    assert_eq!(duplicate.related.len(), 1);
    assert_eq!(duplicate.related[0].message, "first defined here");

    assert_error_containing(
        "struct S = a: I32 struct S = b: I32",
        "duplicate definition of `S`",
    );
}

#[test]
fn shadowing_in_scopes_is_allowed() {
    let messages = errors("fn f(): I32 { let x: I32 = 1; let x: I32 = x + 1; x }");
    assert_eq!(messages, Vec::<String>::new());
}

#[test]
fn cyclic_alias_reports_and_poisons() {
    assert_error_containing("alias A = B alias B = A", "cyclic type alias");
}

#[test]
fn unresolved_import_without_hook() {
    assert_error_containing("import nowhere", "no import resolver is configured");
}

#[test]
fn ambiguous_method_names_both_candidates() {
    let source = "
        struct T = v: I32
        impl T { fn m(self): I32 = 1 }
        impl T { fn m(self): I32 = 2 }
        fn f(t: T): I32 = t.m()
    ";
    let diagnostics = check(source);
    let ambiguity = diagnostics
        .iter()
        .find(|diagnostic| diagnostic.message.contains("ambiguous method `m`"))
        .expect("expected an ambiguity error");
    assert_eq!(ambiguity.related.len(), 2, "both candidates are named");
}

#[test]
fn missing_method_reports_receiver_type() {
    let source = "
        struct T = v: I32
        fn f(t: T): I32 = t.missing()
    ";
    assert_error_containing(source, "no method `missing` found for type T");
}

#[test]
fn method_lookup_ignores_non_matching_self_types() {
    let source = "
        struct A = x: I32
        struct B = y: I32
        impl A { fn which(self): I32 = 1 }
        impl B { fn which(self): I32 = 2 }
        fn f(a: A): I32 = a.which()
    ";
    let messages = errors(source);
    assert_eq!(messages, Vec::<String>::new(), "exactly one impl matches");
}

#[test]
fn struct_initializer_field_errors() {
    assert_error_containing(
        "struct P = x: I32, y: I32 fn f(): P = P { x = 1 }",
        "missing field `y`",
    );
    assert_error_containing(
        "struct P = x: I32 fn f(): P = P { x = 1, z = 2 }",
        "no field `z` on `P`",
    );
    assert_error_containing(
        "struct P = x: I32 fn f(): P = P { x = 1, x = 2 }",
        "initialized twice",
    );
}

#[test]
fn field_access_on_non_struct() {
    assert_error_containing(
        "enum E = a | b fn f(e: E): I32 = e.x",
        "`E` is not a struct",
    );
    assert_error_containing("fn f(x: I32): I32 = x.y", "no field `y` on type I32");
}

#[test]
fn calling_a_non_function() {
    assert_error_containing("fn f(x: I32): I32 = x(1)", "cannot call a value of type I32");
}

#[test]
fn wrong_arity_reports_counts() {
    assert_error_containing(
        "fn g(a: I32, b: I32): I32 = a fn f(): I32 = g(1)",
        "expected 2, found 1",
    );
}

#[test]
fn type_namespace_and_value_namespace_are_distinct() {
    assert_error_containing(
        "struct S = a: I32 fn f(): I32 = S",
        "`S` is a type and cannot be used as a value",
    );
    assert_error_containing(
        "module m { fn g(): () = () } fn f(): () = m",
        "`m` is a module and cannot be used as a value",
    );
}

#[test]
fn concepts_are_not_types() {
    assert_error_containing(
        "concept Show { fn show(self): String } fn f(x: Show): () = ()",
        "`Show` is a concept",
    );
}

#[test]
fn unknown_operator() {
    assert_error_containing("fn f(a: I32, b: I32): I32 = a <$> b", "unknown operator `<$>`");
}

#[test]
fn mutability_parameters_resolve_in_scope() {
    let messages = errors("fn f[m: mut](x: &m I32): &m I32 = x");
    assert_eq!(messages, Vec::<String>::new());

    assert_error_containing(
        "fn f(x: &q I32): () = ()",
        "no mutability binding named `q` in scope",
    );
}

#[test]
fn errors_do_not_cascade() {
    // One bad expression poisons with the error type instead of
    // producing a second mismatch at the call site.
    let messages = errors("fn f(): I32 = missing_fn(1, 2)");
    assert_eq!(messages.len(), 1, "got: {messages:?}");
    assert!(messages[0].contains("`missing_fn` is not defined here"));
}
