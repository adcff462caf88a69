//! CLI integration tests for all implemented subcommands.
//!
//! Uses `assert_cmd` to spawn the `formrule` binary and verify
//! exit codes, stdout content, and stderr content. Fixtures are written
//! to a fresh temp directory per test.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper: create a Command for the `formrule` binary.
fn formrule() -> Command {
    let mut cmd = cargo_bin_cmd!("formrule");
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("FORMRULE_LOADER_TIMEOUT_MS");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const ADDRESS_FORM: &str = r#"{
  "id": "address",
  "name": "Address",
  "fields": [
    {"id": "country", "name": "Country", "type": "DropDown",
     "options": [{"value": "US", "text": "United States"}, {"value": "CA", "text": "Canada"}]},
    {"id": "state", "name": "State", "type": "DropDown", "hidden": true,
     "rules": [{
       "id": "us-states",
       "description": "states follow country",
       "conditionGroups": [{"requireAll": true, "conditions": [
         {"fieldId": "country", "operator": "==", "value": "US"}
       ]}],
       "actions": [
         {"type": "show", "message": "Pick a state"},
         {"type": "setValue", "value": null},
         {"type": "loadOptions", "dataSource": {
           "url": "https://geo.test/states?country={c}",
           "parameters": {"c": "Country"},
           "valueField": "code",
           "textField": "name"
         }}
       ]
     }]}
  ]
}"#;

const SIGNUP_FORM: &str = r#"{
  "id": "signup",
  "name": "Signup",
  "fields": [
    {"id": "email", "name": "Email", "required": true, "regexPattern": "[^@]+@[^@]+"},
    {"id": "age", "name": "Age", "type": "Number"}
  ]
}"#;

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    formrule()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dynamic form rule engine"));
}

#[test]
fn version_exits_0() {
    formrule()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("formrule"));
}

// ──────────────────────────────────────────────
// 2. Eval subcommand
// ──────────────────────────────────────────────

#[test]
fn eval_with_fixture_loader_outputs_json() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", ADDRESS_FORM);
    let values = write(&dir, "values.json", r#"{"Country": "US"}"#);
    write(
        &dir,
        "states.json",
        r#"[{"code": "CA", "name": "California"}]"#,
    );
    let config = write(
        &dir,
        "formrule.toml",
        "[loader.fixtures]\n\"https://geo.test/states?country=US\" = \"states.json\"\n",
    );

    let output = formrule()
        .args(["--output", "json", "--config"])
        .arg(&config)
        .arg("eval")
        .arg(&form)
        .arg("--values")
        .arg(&values)
        .args(["--changed", "country"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["results"][0]["fieldId"], "state");
    assert_eq!(json["results"][0]["message"], "Pick a state");
    assert_eq!(json["fields"][1]["hidden"], false);
    assert_eq!(json["fields"][1]["systemControlled"], true);
    assert_eq!(
        json["fields"][1]["options"],
        serde_json::json!([{"value": "CA", "text": "California"}])
    );
    assert_eq!(json["values"]["State"], serde_json::Value::Null);
}

#[test]
fn eval_reports_option_load_failure_as_result() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", ADDRESS_FORM);
    let values = write(&dir, "values.json", r#"{"Country": "US"}"#);
    write(&dir, "other.json", "[]");
    let config = write(
        &dir,
        "formrule.toml",
        "[loader.fixtures]\n\"https://geo.test/other\" = \"other.json\"\n",
    );

    formrule()
        .arg("--config")
        .arg(&config)
        .arg("eval")
        .arg(&form)
        .arg("--values")
        .arg(&values)
        .assert()
        .success()
        .stdout(predicate::str::contains("[state] Failed to load options:"))
        .stdout(predicate::str::contains("[state] Pick a state"));
}

#[test]
fn eval_without_values_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", ADDRESS_FORM);

    formrule()
        .arg("eval")
        .arg(&form)
        .assert()
        .success()
        .stdout(predicate::str::contains("Results: none"))
        .stdout(predicate::str::contains("State = -  [hidden]"));
}

#[test]
fn eval_missing_form_file_exits_1() {
    formrule()
        .args(["eval", "/nonexistent/form.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("form file not found"));
}

#[test]
fn eval_invalid_form_json_reports_json_error() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", "{not json");

    formrule()
        .args(["--output", "json", "eval"])
        .arg(&form)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("invalid form definition"));
}

#[test]
fn eval_bad_config_exits_1() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", ADDRESS_FORM);
    let config = write(&dir, "formrule.toml", "[loader]\ntimeout_ms = \"soon\"\n");

    formrule()
        .arg("--config")
        .arg(&config)
        .arg("eval")
        .arg(&form)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not parse"));
}

#[test]
fn quiet_suppresses_output() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", ADDRESS_FORM);

    formrule()
        .arg("--quiet")
        .arg("eval")
        .arg(&form)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// 3. Check subcommand
// ──────────────────────────────────────────────

#[test]
fn check_clean_form_exits_0() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", SIGNUP_FORM);

    formrule()
        .arg("check")
        .arg(&form)
        .assert()
        .success()
        .stdout(predicate::str::contains("No definition issues"));
}

#[test]
fn check_dangling_reference_exits_1() {
    let dir = TempDir::new().unwrap();
    let form = write(
        &dir,
        "form.json",
        r#"{"id": "f", "name": "F", "fields": [
            {"id": "a", "name": "A", "rules": [
                {"id": "r", "conditionGroups": [{"conditions": [
                    {"fieldId": "ghost", "operator": "==", "value": 1}
                ]}], "actions": [{"type": "hide"}]}
            ]}
        ]}"#,
    );

    let output = formrule()
        .args(["--output", "json", "check"])
        .arg(&form)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["issues"][0]["kind"], "missing_condition_field");
    assert_eq!(json["issues"][0]["field_id"], "a");
}

// ──────────────────────────────────────────────
// 4. Validate subcommand
// ──────────────────────────────────────────────

#[test]
fn validate_valid_values_exits_0() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", SIGNUP_FORM);
    let values = write(&dir, "values.json", r#"{"Email": "a@b.c", "Age": "30"}"#);

    formrule()
        .arg("validate")
        .arg(&form)
        .arg("--values")
        .arg(&values)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid."));
}

#[test]
fn validate_violations_exit_1() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", SIGNUP_FORM);
    let values = write(&dir, "values.json", r#"{"Email": "nope", "Age": "old"}"#);

    let output = formrule()
        .args(["--output", "json", "validate"])
        .arg(&form)
        .arg("--values")
        .arg(&values)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    let kinds: Vec<&str> = json["violations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"pattern_mismatch"), "{:?}", kinds);
    assert!(kinds.contains(&"not_a_number"), "{:?}", kinds);
}

#[test]
fn validate_missing_values_file_exits_1() {
    let dir = TempDir::new().unwrap();
    let form = write(&dir, "form.json", SIGNUP_FORM);

    formrule()
        .arg("validate")
        .arg(&form)
        .args(["--values", "/nonexistent/values.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("values file not found"));
}
