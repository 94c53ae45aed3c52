//! End-to-end driver tests: invoke the built binary against real files.

use std::path::PathBuf;
use std::process::Command;

fn write_source(name: &str, text: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("rillc-e2e-{}-{name}", std::process::id()));
    std::fs::write(&path, text).expect("write test source");
    path
}

fn rillc(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_rillc"))
        .args(args)
        .output()
        .expect("run rillc")
}

#[test]
fn check_clean_program_exits_zero() {
    let path = write_source(
        "clean.rl",
        "fn add(a: I32, b: I32): I32 = a + b\nfn main(): I32 = add(1, 2)\n",
    );
    let output = rillc(&["check", path.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn check_type_error_exits_nonzero_and_reports() {
    let path = write_source("bad.rl", "fn f(): I32 = \"hello\"\n");
    let output = rillc(&["check", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("mismatched types"),
        "stderr: {stderr}"
    );
}

#[test]
fn check_json_emits_structured_diagnostics() {
    let path = write_source("bad-json.rl", "fn f(): I32 = \"hello\"\n");
    let output = rillc(&["check", "--json", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next().expect("one diagnostic line");
    let value: serde_json::Value = serde_json::from_str(first_line).expect("valid JSON");
    assert_eq!(value["severity"], "Error");
}

#[test]
fn parse_reports_syntax_errors() {
    let path = write_source("syntax.rl", "fn f( = }\n");
    let output = rillc(&["parse", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected"), "stderr: {stderr}");
}

#[test]
fn ast_dumps_desugared_definitions() {
    let path = write_source("dump.rl", "fn f() { while x { y } }\n");
    let output = rillc(&["ast", path.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("loop { if x { y } else break () }"),
        "stdout: {stdout}"
    );
}

#[test]
fn missing_file_is_fatal() {
    let output = rillc(&["check", "/nonexistent/rillc-e2e.rl"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot open"), "stderr: {stderr}");
}

#[test]
fn version_flag_works() {
    let output = rillc(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rillc"), "stdout: {stdout}");
}
