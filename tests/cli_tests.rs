// `Command::cargo_bin` is deprecated in newer assert_cmd releases
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).unwrap()
}

fn jsondump() -> Command {
    Command::cargo_bin("jsondump").unwrap()
}

#[test]
fn dumps_builtin_config_without_arguments() {
    jsondump()
        .assert()
        .success()
        .stdout(fixture("test_script.json"));
}

#[test]
fn builtin_output_is_deterministic() {
    let first = jsondump().output().unwrap().stdout;
    let second = jsondump().output().unwrap().stdout;
    assert_eq!(first, second);
}

#[test]
fn reformats_its_own_output_unchanged() {
    jsondump()
        .arg(fixture_path("test_script.json"))
        .assert()
        .success()
        .stdout(fixture("test_script.json"));
}

#[test]
fn preserve_order_with_custom_indent() {
    #[rustfmt::skip]
    let expected =
r#"{
  "b": [
    1,
    {
      "y": "café",
      "x": null
    }
  ],
  "a": 2.5
}
"#;
    jsondump()
        .args(&[fixture_path("unsorted.json").as_str(), "--preserve-order", "--indent", "2"])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn reads_stdin_with_ensure_ascii() {
    #[rustfmt::skip]
    let expected =
r#"{
   "animal": "caf\u00e9",
   "number": 42
}
"#;
    jsondump()
        .args(&["-", "--ensure-ascii"])
        .write_stdin(r#"{"number": 42, "animal": "café"}"#)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn empty_object_on_stdin() {
    jsondump()
        .arg("-")
        .write_stdin("{}")
        .assert()
        .success()
        .stdout("{}\n");
}

#[test]
fn rewrites_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"number":42,"animal":"bunny"}"#).unwrap();

    jsondump()
        .arg(&path)
        .arg("--in-place")
        .assert()
        .success()
        .stdout("");

    #[rustfmt::skip]
    let expected =
r#"{
   "animal": "bunny",
   "number": 42
}
"#;
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn rejects_malformed_json() {
    jsondump()
        .arg("-")
        .write_stdin("{\n\"a\": 1\n\"b\": 2\n}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error at line 3"));
}

#[test]
fn rejects_too_deep_nesting() {
    let input = format!("{}{}", "[".repeat(600), "]".repeat(600));
    jsondump()
        .arg("-")
        .write_stdin(input)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("nesting depth exceeds the limit of 512"));
}

#[test]
fn missing_file_is_reported() {
    jsondump()
        .arg(fixture_path("does_not_exist.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
}

#[test]
fn in_place_requires_a_file() {
    jsondump().arg("--in-place").assert().failure();
}

#[test]
fn indent_must_be_a_number() {
    jsondump().args(&["--indent", "wide"]).assert().failure();
}

#[test]
fn in_place_rejects_stdin() {
    jsondump()
        .args(&["-", "--in-place"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("--in-place needs a file"));
}

#[test]
fn rejects_deep_nesting_without_crashing() {
    let input = format!("{}{}", "[".repeat(1_000_000), "]".repeat(1_000_000));
    jsondump()
        .arg("-")
        .write_stdin(input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn check_accepts_builtin_config() {
    jsondump()
        .arg("--check")
        .assert()
        .success()
        .stdout(fixture("test_script.json"));
}

#[test]
fn check_accepts_test_script_file() {
    jsondump()
        .args(&["--check", fixture_path("test_script.json").as_str()])
        .assert()
        .success()
        .stdout(fixture("test_script.json"));
}

#[test]
fn check_rejects_mismatched_config() {
    jsondump()
        .args(&["-", "--check"])
        .write_stdin(r#"{"number": "42"}"#)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("config check failed"))
        .stderr(predicate::str::contains(
            "type mismatch at `$.number`: expected integer, found string",
        ));
}
