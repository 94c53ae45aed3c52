//! Integration tests for the Rill parser: tree shape, losslessness, and
//! error recovery.

use rill_parser::nodes::item::Definition;
use rill_parser::nodes::AstNode;
use rill_parser::{parse, SyntaxKind};

/// Every parse must reproduce the source text exactly, errors included.
fn assert_lossless(source: &str) {
    let result = parse(source);
    assert_eq!(
        result.syntax().text().to_string(),
        source,
        "CST must be lossless for {source:?}"
    );
}

#[test]
fn cst_is_lossless() {
    assert_lossless("fn f() = 1");
    assert_lossless("fn f(a: I32, b: I32): I32 { a + b }");
    assert_lossless("  fn  spaced ( ) /* c */ = // tail\n 1 ");
    assert_lossless("struct S[T] = a: T, b: (T, T)");
    assert_lossless("enum Option[T] = none | some(T)");
    assert_lossless("module m { fn g() = 0 }");
    assert_lossless("fn f() { while let x = y { z } }");
    assert_lossless("fn f() { a.b[I32](c).d.0.[e] }");
    assert_lossless("impl[T] Box[T] { fn get(self): T { self.value } }");
}

#[test]
fn lossless_even_with_errors() {
    assert_lossless("fn");
    assert_lossless("fn f( = }");
    assert_lossless("struct = 1 fn ok() = 2");
    assert_lossless("fn f() { let = ; }");
}

#[test]
fn parses_function_definition() {
    let result = parse("fn add(a: I32, b: I32): I32 = a + b");
    assert!(result.ok(), "errors: {:?}", result.errors());

    let file = result.source_file();
    let defs: Vec<_> = file.definitions().collect();
    assert_eq!(defs.len(), 1);
    let Definition::Fn(fn_def) = &defs[0] else {
        panic!("expected a function definition");
    };
    assert_eq!(fn_def.name().unwrap().text(), "add");
    let params: Vec<_> = fn_def.param_list().unwrap().params().collect();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name().unwrap().text(), "a");
    assert!(fn_def.return_annotation().is_some());
    assert!(fn_def.body().is_some());
}

#[test]
fn parses_struct_enum_alias_concept() {
    let source = "
        struct Pair[A, B] = first: A, second: B
        enum Option[T] = none | some(T)
        alias Pairs = [Pair[I32, I32]]
        concept Show { fn show(self): String }
    ";
    let result = parse(source);
    assert!(result.ok(), "errors: {:?}", result.errors());

    let kinds: Vec<_> = result
        .source_file()
        .definitions()
        .map(|def| def.syntax().kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::STRUCT_DEF,
            SyntaxKind::ENUM_DEF,
            SyntaxKind::ALIAS_DEF,
            SyntaxKind::CONCEPT_DEF,
        ]
    );
}

#[test]
fn parses_module_and_import() {
    let result = parse("import std::vector module m { fn g() = 0 }");
    assert!(result.ok(), "errors: {:?}", result.errors());
    let defs: Vec<_> = result.source_file().definitions().collect();
    assert_eq!(defs.len(), 2);
    assert!(matches!(defs[0], Definition::Import(_)));
    let Definition::Module(module) = &defs[1] else {
        panic!("expected a module");
    };
    assert_eq!(module.name().unwrap().text(), "m");
    assert_eq!(module.definitions().count(), 1);
}

#[test]
fn operator_chain_stays_flat_in_cst() {
    let result = parse("fn f() = a * b + c * d");
    assert!(result.ok(), "errors: {:?}", result.errors());

    let chain = result
        .syntax()
        .descendants()
        .find(|node| node.kind() == SyntaxKind::OPERATOR_CHAIN_EXPR)
        .expect("expected an operator chain");
    let operands = chain
        .children()
        .filter(|node| node.kind() == SyntaxKind::PATH_EXPR)
        .count();
    assert_eq!(operands, 4, "chain keeps all four operands as siblings");
}

#[test]
fn struct_initializer_disabled_in_conditions() {
    // `S { x }` after `if` must parse as condition `S` and block `{ x }`.
    let result = parse("fn f() = if S { x } else { y }");
    assert!(result.ok(), "errors: {:?}", result.errors());
    assert!(result
        .syntax()
        .descendants()
        .all(|node| node.kind() != SyntaxKind::STRUCT_INIT_EXPR));

    // In plain expression position it is a struct initializer.
    let result = parse("fn f() = S { x = 1 }");
    assert!(result.ok(), "errors: {:?}", result.errors());
    assert!(result
        .syntax()
        .descendants()
        .any(|node| node.kind() == SyntaxKind::STRUCT_INIT_EXPR));
}

#[test]
fn method_call_vs_field_access() {
    let result = parse("fn f() = a.b.c(d).0");
    assert!(result.ok(), "errors: {:?}", result.errors());
    let root = result.syntax();
    assert!(root
        .descendants()
        .any(|node| node.kind() == SyntaxKind::METHOD_CALL_EXPR));
    assert!(root
        .descendants()
        .any(|node| node.kind() == SyntaxKind::FIELD_EXPR));
}

#[test]
fn if_elif_else_structure() {
    let result = parse("fn f() = if a { b } elif c { d } else { e }");
    assert!(result.ok(), "errors: {:?}", result.errors());
    let root = result.syntax();
    assert_eq!(
        root.descendants()
            .filter(|node| node.kind() == SyntaxKind::ELIF_BRANCH)
            .count(),
        1
    );
    assert_eq!(
        root.descendants()
            .filter(|node| node.kind() == SyntaxKind::ELSE_BRANCH)
            .count(),
        1
    );
}

#[test]
fn match_with_tuple_case() {
    let result = parse("fn f() = match p { a, b -> a _ -> 0 }");
    assert!(result.ok(), "errors: {:?}", result.errors());
    let arms: Vec<_> = result
        .syntax()
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::MATCH_ARM)
        .collect();
    assert_eq!(arms.len(), 2);
}

#[test]
fn error_reports_expected_but_found() {
    let result = parse("fn f( = 1");
    assert!(!result.ok());
    assert!(
        result.errors()[0].message.starts_with("expected"),
        "got: {}",
        result.errors()[0].message
    );
}

#[test]
fn recovery_continues_after_bad_definition() {
    let result = parse("struct Bad fn ok() = 1");
    assert!(!result.ok());
    // The parser must still produce the following function definition.
    let has_fn = result
        .source_file()
        .definitions()
        .any(|def| matches!(def, Definition::Fn(_)));
    assert!(has_fn, "recovery must reach the fn definition");
}

#[test]
fn typeof_rooted_path_type() {
    let result = parse("fn f(x: typeof(y)::T): I32 = 0");
    assert!(result.ok(), "errors: {:?}", result.errors());
    assert!(result
        .syntax()
        .descendants()
        .any(|node| node.kind() == SyntaxKind::TYPEOF_TYPE));
}

#[test]
fn reference_and_pointer_types() {
    let result = parse("fn f(a: &mut I32, b: *Bool, c: &m T): () = ()");
    assert!(result.ok(), "errors: {:?}", result.errors());
    let root = result.syntax();
    assert!(root.descendants().any(|n| n.kind() == SyntaxKind::REF_TYPE));
    assert!(root.descendants().any(|n| n.kind() == SyntaxKind::PTR_TYPE));
    assert_eq!(
        root.descendants()
            .filter(|n| n.kind() == SyntaxKind::MUTABILITY)
            .count(),
        2
    );
}
