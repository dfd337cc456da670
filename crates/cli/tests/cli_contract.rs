use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("markup-bridge-cli");
    cmd.env_remove("MARKUP_BRIDGE_DECODE_POLICY")
        .env_remove("MARKUP_BRIDGE_CLAMP_ON_ENCODE")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should contain valid json")
}

#[test]
fn normalize_emits_canonical_mapping() {
    let output = cli()
        .arg("normalize")
        .write_stdin(r##"{"color": "#ff8000", "opacity": 1.5, "thickness": 2, "dash": [3, 1]}"##)
        .assert()
        .success()
        .get_output()
        .clone();

    assert_eq!(
        stdout_json(&output),
        json!({"color": "#FF8000", "opacity": 1.0, "thickness": 2.0})
    );
}

#[test]
fn normalize_empty_payload_is_empty() {
    let output = cli().arg("normalize").write_stdin("{}").assert().success().get_output().clone();

    assert_eq!(stdout_json(&output), json!({}));
}

#[test]
fn normalize_drops_malformed_fields_by_default() {
    let output = cli()
        .arg("normalize")
        .write_stdin(r##"{"color": "#12345", "fontSize": "big", "fillColor": 12345}"##)
        .assert()
        .success()
        .get_output()
        .clone();

    assert_eq!(stdout_json(&output), json!({"fillColor": "#003039"}));
}

#[test]
fn normalize_strict_rejects_malformed_fields() {
    cli()
        .arg("normalize")
        .arg("--strict")
        .write_stdin(r##"{"color": "#12345", "thickness": 1}"##)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decode style from stdin"))
        .stderr(predicate::str::contains("`color`"));
}

#[test]
fn normalize_strict_via_environment() {
    cli()
        .arg("normalize")
        .env("MARKUP_BRIDGE_DECODE_POLICY", "strict")
        .write_stdin(r#"{"opacity": "half"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("`opacity`"));
}

#[test]
fn normalize_rejects_non_object_payload() {
    cli()
        .arg("normalize")
        .write_stdin("[1, 2, 3]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("style payload must be a map"));
}

#[test]
fn validate_reports_violations_with_exit_code() {
    let output = cli()
        .arg("validate")
        .arg("--input")
        .arg(fixture("invalid.json"))
        .assert()
        .code(2)
        .get_output()
        .clone();

    let value = stdout_json(&output);
    assert_eq!(value["valid"], json!(false));
    // Opacity is clamped while decoding, so only width and font size remain
    let violations = value["violations"].as_array().expect("violations array");
    assert_eq!(violations.len(), 2);
    assert_eq!(value["style"]["opacity"], json!(0.0));
}

#[test]
fn validate_accepts_valid_payload() {
    let output = cli()
        .arg("validate")
        .arg("--input")
        .arg(fixture("base.json"))
        .assert()
        .success()
        .get_output()
        .clone();

    let value = stdout_json(&output);
    assert_eq!(value["valid"], json!(true));
    assert_eq!(value["violations"], json!([]));
}

#[test]
fn merge_prefers_override() {
    let output = cli()
        .arg("merge")
        .arg(fixture("base.json"))
        .arg(fixture("override.json"))
        .assert()
        .success()
        .get_output()
        .clone();

    assert_eq!(
        stdout_json(&output),
        json!({"color": "#FF0000", "opacity": 0.8, "fontSize": 12.0})
    );
}

#[test]
fn resolve_drops_fill_for_open_shapes() {
    let output = cli()
        .args(["resolve", "--tool", "line", "--style"])
        .arg(fixture("shape.json"))
        .assert()
        .success()
        .get_output()
        .clone();

    assert_eq!(
        stdout_json(&output),
        json!({
            "tool": "line",
            "style": {"color": "#FF0000", "opacity": 1.0, "thickness": 4.0}
        })
    );
}

#[test]
fn resolve_keeps_fill_for_closed_shapes() {
    let output = cli()
        .args(["resolve", "--tool", "square", "--style"])
        .arg(fixture("shape.json"))
        .assert()
        .success()
        .get_output()
        .clone();

    let value = stdout_json(&output);
    assert_eq!(value["style"]["fillColor"], json!("#00FF00"));
}

#[test]
fn resolve_free_text_includes_font_size() {
    let output = cli()
        .args(["resolve", "--tool", "freeText"])
        .assert()
        .success()
        .get_output()
        .clone();

    let value = stdout_json(&output);
    assert_eq!(value["tool"], json!("freeText"));
    assert_eq!(value["style"]["fontSize"], json!(12.0));
    assert_eq!(value["style"]["color"], json!("#000000"));
}

#[test]
fn defaults_apply_configuration_overrides() {
    let output = cli()
        .arg("defaults")
        .arg("--config")
        .arg(fixture("config.json"))
        .assert()
        .success()
        .get_output()
        .clone();

    let value = stdout_json(&output);
    assert_eq!(value["ink"], json!({"color": "#00FF00", "thickness": 5.0}));
    assert_eq!(value["highlight"], json!({"color": "#FFFF00", "opacity": 0.5}));
}

#[test]
fn config_with_bad_tool_fails() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = temp.path().join("bridge.json");
    std::fs::write(&path, r#"{"tools": {"stamp": {}}}"#).expect("config should be written");

    cli()
        .arg("defaults")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"))
        .stderr(predicate::str::contains("unknown annotation tool"));
}

fn config_with_malformed_tool_field(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("bridge.json");
    std::fs::write(&path, r#"{"tools": {"line": {"color": "red", "opacity": 0.4}}}"#)
        .expect("config should be written");
    path
}

#[test]
fn defaults_drop_malformed_config_fields_by_default() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = config_with_malformed_tool_field(&temp);

    let output = cli()
        .arg("defaults")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .clone();

    let value = stdout_json(&output);
    assert_eq!(value["line"], json!({"color": "#FF0000", "opacity": 0.4, "thickness": 2.0}));
}

#[test]
fn strict_flag_rejects_malformed_config_tool_style() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = config_with_malformed_tool_field(&temp);

    cli()
        .args(["defaults", "--strict", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"))
        .stderr(predicate::str::contains("style for tool line"));
}

#[test]
fn strict_environment_rejects_malformed_config_tool_style() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = config_with_malformed_tool_field(&temp);

    cli()
        .arg("defaults")
        .arg("--config")
        .arg(&path)
        .env("MARKUP_BRIDGE_DECODE_POLICY", "strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("style for tool line"));
}

#[test]
fn merge_fails_for_missing_file() {
    cli()
        .arg("merge")
        .arg(fixture("base.json"))
        .arg(fixture("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn version_prints_package_version() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
