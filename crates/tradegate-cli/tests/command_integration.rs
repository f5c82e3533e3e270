//! Integration tests for CLI commands.
//!
//! Each test runs the `tradegate` binary against identity files written to a
//! temporary project directory.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_identity(dir: &TempDir, name: &str, attributes: &[(&str, &str)]) -> PathBuf {
    let attrs: serde_json::Map<String, serde_json::Value> = attributes
        .iter()
        .map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v)))
        .collect();
    let identity = serde_json::json!({
        "id": format!("x509::CN={name}::CN=ca.org1.example.com"),
        "mspid": "Org1MSP",
        "subject": format!("CN={name},OU=client"),
        "attributes": attrs,
    });
    let path = dir.path().join(format!("{name}.json"));
    fs::write(&path, identity.to_string()).unwrap();
    path
}

fn tradegate(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tradegate").unwrap();
    cmd.env_remove("RUST_LOG")
        .args(["--no-color", "--project"])
        .arg(project.path());
    cmd
}

// ============================================================================
// approve-trade
// ============================================================================

#[test]
fn approve_trade_below_threshold_is_allowed() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(
        &temp,
        "alice",
        &[("department", "accounting"), ("hf.EnrollmentID", "alice")],
    );

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .arg("50000")
        .assert()
        .success()
        .stdout(predicate::str::contains("ALLOW approve-trade"))
        .stdout(predicate::str::contains("APPROVED - Trade value=50000 by alice"));
}

#[test]
fn approve_trade_above_threshold_requires_manager() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(
        &temp,
        "bob",
        &[("department", "accounting"), ("role", "analyst")],
    );

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .arg("150000")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("DENY approve-trade"))
        .stdout(predicate::str::contains("role='analyst'"))
        .stdout(predicate::str::contains("APPROVED").not());
}

#[test]
fn approve_trade_manager_is_allowed_above_threshold() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(
        &temp,
        "carol",
        &[
            ("department", "accounting"),
            ("role", "manager"),
            ("hf.EnrollmentID", "carol"),
        ],
    );

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .arg("150000")
        .assert()
        .success()
        .stdout(predicate::str::contains("APPROVED - Trade value=150000 by carol"));
}

#[test]
fn approve_trade_wrong_department_is_denied() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "dave", &[("department", "sales")]);

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .arg("5000")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("department"));
}

#[test]
fn approve_trade_malformed_amount_is_an_error() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "alice", &[("department", "accounting")]);

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .arg("abc")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("ALLOW").not())
        .stderr(predicate::str::contains("malformed request"));
}

#[test]
fn approve_trade_missing_amount_is_an_error() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "alice", &[("department", "accounting")]);

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("args[0]"));
}

#[test]
fn approve_trade_without_membership_id_fails_resolution() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("anon.json");
    fs::write(&path, r#"{"id": "x509::CN=anon", "attributes": {}}"#).unwrap();

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&path)
        .arg("10")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("identity resolution failed"));
}

#[test]
fn approve_trade_json_output() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(
        &temp,
        "alice",
        &[("department", "accounting"), ("hf.EnrollmentID", "alice")],
    );

    let output = tradegate(&temp)
        .args(["--json", "approve-trade", "--identity"])
        .arg(&identity)
        .arg("99999")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["decision"]["outcome"], "ALLOW");
    assert_eq!(value["decision"]["amount"], "99999");
    assert_eq!(value["approval"]["approved_by"], "alice");
}

#[test]
fn approve_trade_uses_project_threshold() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tradegate.toml"),
        "[policy]\napproval_threshold = 1000\n",
    )
    .unwrap();
    let identity = write_identity(&temp, "alice", &[("department", "accounting")]);

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .arg("5000")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("requires role='manager'"));
}

#[test]
fn approve_trade_uses_environment_threshold() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "alice", &[("department", "accounting")]);

    tradegate(&temp)
        .env("TRADEGATE_POLICY__APPROVAL_THRESHOLD", "1000")
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .arg("5000")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("requires role='manager'"));
}

#[test]
fn environment_overrides_project_config() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tradegate.toml"),
        "[policy]\nrequired_department = \"sales\"\napproval_threshold = 1000\n",
    )
    .unwrap();
    let identity = write_identity(&temp, "alice", &[("department", "accounting")]);

    tradegate(&temp)
        .env("TRADEGATE_POLICY__APPROVAL_THRESHOLD", "1000000")
        .env("TRADEGATE_POLICY__REQUIRED_DEPARTMENT", "accounting")
        .args(["approve-trade", "--identity"])
        .arg(&identity)
        .arg("5000")
        .assert()
        .success()
        .stdout(predicate::str::contains("APPROVED - Trade value=5000"));

    tradegate(&temp)
        .env("TRADEGATE_POLICY__APPROVAL_THRESHOLD", "2500")
        .args(["config", "show", "--format", "toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("approval_threshold = 2500"))
        .stdout(predicate::str::contains("required_department = \"sales\""));
}

#[test]
fn approve_trade_accepts_toml_identity() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("erin.toml");
    fs::write(
        &path,
        r#"
id = "x509::CN=erin"
mspid = "Org1MSP"

[attributes]
department = "accounting"
"hf.EnrollmentID" = "erin"
"#,
    )
    .unwrap();

    tradegate(&temp)
        .args(["approve-trade", "--identity"])
        .arg(&path)
        .arg("42")
        .assert()
        .success()
        .stdout(predicate::str::contains("APPROVED - Trade value=42 by erin"));
}

// ============================================================================
// assert-department
// ============================================================================

#[test]
fn assert_department_allows_accounting() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "alice", &[("department", "accounting")]);

    tradegate(&temp)
        .args(["assert-department", "--identity"])
        .arg(&identity)
        .assert()
        .success()
        .stdout(predicate::str::contains("ALLOW assert-department"))
        .stdout(predicate::str::contains("GRANTED"));
}

#[test]
fn assert_department_denies_missing_department() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "frank", &[]);

    tradegate(&temp)
        .args(["assert-department", "--identity"])
        .arg(&identity)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("department-membership"));
}

// ============================================================================
// report
// ============================================================================

#[test]
fn report_lists_requested_attributes_in_order() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "alice", &[("department", "accounting")]);

    let output = tradegate(&temp)
        .args(["report", "--identity"])
        .arg(&identity)
        .args(["--extra", "department", "--extra", "desk"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["MSPID"], "Org1MSP");
    assert_eq!(value["department"], "accounting");
    assert_eq!(value["desk"], "NOT SET");
    assert_eq!(value["hf.Type"], "NOT SET");
    assert!(text.find("\"id\"").unwrap() < text.find("\"desk\"").unwrap());
}

#[test]
fn report_defaults_to_configured_attributes() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "alice", &[]);

    tradegate(&temp)
        .args(["report", "--format", "text", "--identity"])
        .arg(&identity)
        .assert()
        .success()
        .stdout(predicate::str::contains("app.accounting.role"))
        .stdout(predicate::str::contains("NOT SET"));
}

#[test]
fn report_rejects_unknown_format() {
    let temp = TempDir::new().unwrap();
    let identity = write_identity(&temp, "alice", &[]);

    tradegate(&temp)
        .args(["report", "--format", "yaml", "--identity"])
        .arg(&identity)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown report format"));
}

// ============================================================================
// config / version
// ============================================================================

#[test]
fn config_show_toml_reflects_project_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tradegate.toml"),
        "[policy]\nrequired_department = \"treasury\"\n",
    )
    .unwrap();

    tradegate(&temp)
        .args(["config", "show", "--format", "toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("required_department = \"treasury\""))
        .stdout(predicate::str::contains("approval_threshold = 100000"));
}

#[test]
fn config_validate_reports_invalid_threshold() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tradegate.toml"),
        "[policy]\napproval_threshold = 0\n",
    )
    .unwrap();

    tradegate(&temp)
        .args(["config", "validate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn config_validate_accepts_defaults() {
    let temp = TempDir::new().unwrap();

    tradegate(&temp)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn config_validate_names_project_directory() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("desk config");
    fs::create_dir(&project).unwrap();
    fs::write(
        project.join("tradegate.toml"),
        "[policy]\nrequired_department = \"treasury\"\n",
    )
    .unwrap();

    Command::cargo_bin("tradegate")
        .unwrap()
        .args(["--no-color", "config", "validate", "--project"])
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains(project.display().to_string()));
}

#[test]
fn version_prints_package_version() {
    let temp = TempDir::new().unwrap();

    tradegate(&temp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
