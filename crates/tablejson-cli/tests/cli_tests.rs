//! Integration tests for the `tjson` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the encode,
//! decode, and normalize subcommands through the actual binary, including
//! stdin/stdout piping, file I/O, and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn device_lua_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/device.lua")
}

fn device_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/device.json")
}

fn device_json() -> String {
    std::fs::read_to_string(device_json_path()).expect("device.json fixture must exist")
}

fn tjson() -> Command {
    Command::cargo_bin("tjson").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Encode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn encode_stdin_to_stdout() {
    tjson()
        .arg("encode")
        .write_stdin(r#"{ name = "x", n = 3 }"#)
        .assert()
        .success()
        .stdout("{\"name\":\"x\",\"n\":3}\n");
}

#[test]
fn encode_sequence() {
    tjson()
        .arg("encode")
        .write_stdin(r#"{ "a", "b" }"#)
        .assert()
        .success()
        .stdout("[\"a\",\"b\"]\n");
}

#[test]
fn encode_fixture_file_matches_expected_json() {
    tjson()
        .args(["encode", "-i", device_lua_path()])
        .assert()
        .success()
        .stdout(device_json());
}

#[test]
fn encode_empty_as_array_flag() {
    tjson()
        .args(["encode", "--empty-as-array"])
        .write_stdin("{ items = {} }")
        .assert()
        .success()
        .stdout("{\"items\":[]}\n");

    tjson()
        .arg("encode")
        .write_stdin("{ items = {} }")
        .assert()
        .success()
        .stdout("{\"items\":{}}\n");
}

#[test]
fn encode_drop_non_string_keys_flag() {
    tjson()
        .args(["encode", "--drop-non-string-keys"])
        .write_stdin(r#"{ [1.5] = "half", [true] = "yes", [7] = "seven" }"#)
        .assert()
        .success()
        .stdout("{\"7\":\"seven\"}\n");
}

#[test]
fn encode_file_to_file() {
    let dir = std::env::temp_dir();
    let output_path = dir.join("tjson-test-encode-output.json");
    let _ = std::fs::remove_file(&output_path);

    tjson()
        .args(["encode", "-i", device_lua_path(), "-o"])
        .arg(&output_path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&output_path).expect("output file must exist");
    assert_eq!(content, device_json().trim_end());
    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn encode_rejects_non_table() {
    tjson()
        .arg("encode")
        .write_stdin("42")
        .assert()
        .failure()
        .stderr(predicate::str::contains("table expected, got number"));
}

#[test]
fn encode_reports_literal_syntax_errors() {
    tjson()
        .arg("encode")
        .write_stdin("{ a = }")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse table literal"))
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn encode_then_decode_at_the_nesting_limit() {
    let literal = format!("{}{}", "{".repeat(100), "}".repeat(100));
    let encoded = tjson()
        .args(["encode", "--empty-as-array"])
        .write_stdin(literal.clone())
        .output()
        .expect("encode must run");
    assert!(encoded.status.success());

    tjson()
        .args(["decode", "--strict"])
        .write_stdin(encoded.stdout)
        .assert()
        .success()
        .stdout(format!("{literal}\n"));
}

#[test]
fn encode_rejects_nesting_past_the_limit() {
    tjson()
        .arg("encode")
        .write_stdin(format!("{}{}", "{".repeat(101), "}".repeat(101)))
        .assert()
        .failure()
        .stderr(predicate::str::contains("table nesting too deep"));
}

#[test]
fn encode_missing_input_file() {
    tjson()
        .args(["encode", "-i", "/nonexistent/input.lua"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decode_stdin_to_literal() {
    tjson()
        .arg("decode")
        .write_stdin(r#"{"name":"x","list":[1,2.5,null]}"#)
        .assert()
        .success()
        .stdout("{name=\"x\",list={1,2.5,nil}}\n");
}

#[test]
fn decode_malformed_prints_nil() {
    tjson()
        .arg("decode")
        .write_stdin("{not json")
        .assert()
        .success()
        .stdout("nil\n");
}

#[test]
fn decode_strict_fails_on_malformed() {
    tjson()
        .args(["decode", "--strict"])
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode JSON"));
}

#[test]
fn decode_strict_accepts_null() {
    tjson()
        .args(["decode", "--strict"])
        .write_stdin("null")
        .assert()
        .success()
        .stdout("nil\n");
}

#[test]
fn decode_then_encode_roundtrip() {
    let decoded = tjson()
        .args(["decode", "-i", device_json_path()])
        .output()
        .expect("decode must run");
    assert!(decoded.status.success());

    let encoded = tjson()
        .arg("encode")
        .write_stdin(decoded.stdout)
        .output()
        .expect("encode must run");
    assert!(encoded.status.success());

    let original: serde_json::Value = serde_json::from_str(&device_json()).unwrap();
    let roundtripped: serde_json::Value =
        serde_json::from_slice(&encoded.stdout).expect("encode output must be JSON");
    assert_eq!(original, roundtripped);
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalize subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn normalize_collapses_empty_containers_onto_flag() {
    tjson()
        .arg("normalize")
        .write_stdin(r#"{"a":[],"b":{}}"#)
        .assert()
        .success()
        .stdout("{\"a\":{},\"b\":{}}\n");

    tjson()
        .args(["normalize", "--empty-as-array"])
        .write_stdin(r#"{"a":[],"b":{}}"#)
        .assert()
        .success()
        .stdout("{\"a\":[],\"b\":[]}\n");
}

#[test]
fn normalize_compacts_whitespace() {
    tjson()
        .arg("normalize")
        .write_stdin("{\n  \"a\" : [ 1 , 2 ]\n}\n")
        .assert()
        .success()
        .stdout("{\"a\":[1,2]}\n");
}

#[test]
fn normalize_rejects_scalar_documents() {
    tjson()
        .arg("normalize")
        .write_stdin("42")
        .assert()
        .failure()
        .stderr(predicate::str::contains("table expected"));
}

// ─────────────────────────────────────────────────────────────────────────────
// General
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn verbose_logging_goes_to_stderr() {
    tjson()
        .args(["-vv", "decode"])
        .write_stdin("{not json")
        .assert()
        .success()
        .stdout("nil\n")
        .stderr(predicate::str::contains("lenient decode absorbed parse failure"));
}

#[test]
fn missing_subcommand_shows_usage() {
    tjson()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
