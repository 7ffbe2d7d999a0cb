use std::process::Command;

use tempfile::tempdir;

/// DDL that trips the backward-compatibility rule (code 105).
const SQL_WITH_FINDINGS: &str = "ALTER TABLE legacy DROP COLUMN c;";

/// Clean DDL: a brand-new table with conforming naming.
const SQL_CLEAN: &str = "CREATE TABLE user_account (id INT);";

/// Invalid SQL that fails to parse.
const SQL_INVALID: &str = "CREATE TABL broken (";

#[test]
fn test_check_clean_file() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("clean.sql");
    std::fs::write(&sql_path, SQL_CLEAN).expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args([sql_path.to_str().expect("sql path")])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(stdout.contains("PASS"), "Expected PASS in output: {stdout}");
    assert!(
        stdout.contains("0 findings"),
        "Expected 0 findings: {stdout}"
    );
}

#[test]
fn test_check_file_with_findings() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("bad.sql");
    std::fs::write(&sql_path, SQL_WITH_FINDINGS).expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args([sql_path.to_str().expect("sql path")])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit 1, got: {stdout}"
    );
    assert!(stdout.contains("FAIL"), "Expected FAIL in output: {stdout}");
    assert!(
        stdout.contains("105"),
        "Expected drop-column code 105: {stdout}"
    );
}

#[test]
fn test_check_invalid_sql_reports_syntax_finding() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("invalid.sql");
    std::fs::write(&sql_path, SQL_INVALID).expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args([sql_path.to_str().expect("sql path")])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit 1 for invalid SQL, got: {stdout}"
    );
    assert!(
        stdout.contains("201"),
        "Expected syntax-error code 201: {stdout}"
    );
}

#[test]
fn test_check_exclude_rules() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("excluded.sql");
    std::fs::write(&sql_path, SQL_WITH_FINDINGS).expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args([
            "--exclude-rules",
            "backward-compatibility",
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Expected exit 0 when rule excluded, got: {stdout}"
    );
    assert!(
        stdout.contains("PASS"),
        "Expected PASS when rule excluded: {stdout}"
    );
}

#[test]
fn test_check_unknown_excluded_rule_is_config_error() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("any.sql");
    std::fs::write(&sql_path, SQL_CLEAN).expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args([
            "--exclude-rules",
            "no-such-rule",
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        output.status.code(),
        Some(66),
        "Expected exit 66 for unknown rule: {stderr}"
    );
    assert!(
        stderr.contains("no-such-rule"),
        "Expected offending name on stderr: {stderr}"
    );
}

#[test]
fn test_check_json_format() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("json.sql");
    std::fs::write(&sql_path, SQL_WITH_FINDINGS).expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args(["--format", "json", sql_path.to_str().expect("sql path")])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit 1 for findings: {stdout}"
    );

    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("Expected valid JSON output");
    let arr = parsed.as_array().expect("Expected JSON array");
    assert_eq!(arr.len(), 1);
    let advice = arr[0]["advice"].as_array().expect("advice array");
    assert!(!advice.is_empty());
    assert_eq!(advice[0]["code"], 105);
    assert_eq!(advice[0]["position"]["line"], 0);
}

#[test]
fn test_check_stdin() {
    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            use std::io::Write;
            child
                .stdin
                .take()
                .unwrap()
                .write_all(SQL_WITH_FINDINGS.as_bytes())
                .unwrap();
            child.wait_with_output()
        })
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit 1 for stdin findings: {stdout}"
    );
    assert!(
        stdout.contains("<stdin>"),
        "Expected stdin source name: {stdout}"
    );
}

#[test]
fn test_check_output_file_has_no_ansi_sequences() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("bad.sql");
    let report_path = dir.path().join("report.txt");
    std::fs::write(&sql_path, SQL_WITH_FINDINGS).expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args([
            "--output",
            report_path.to_str().expect("report path"),
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(1), "Expected exit 1 for findings");

    let report = std::fs::read_to_string(report_path).expect("read report");
    assert!(
        !report.contains('\u{1b}'),
        "Expected no ANSI escape sequences in output file: {report}"
    );
}

#[test]
fn test_check_multiple_files() {
    let dir = tempdir().expect("temp dir");
    let clean_path = dir.path().join("clean.sql");
    let bad_path = dir.path().join("bad.sql");
    std::fs::write(&clean_path, SQL_CLEAN).expect("write clean sql");
    std::fs::write(&bad_path, SQL_WITH_FINDINGS).expect("write bad sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args([
            clean_path.to_str().expect("clean path"),
            bad_path.to_str().expect("bad path"),
        ])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit 1 when any file fails: {stdout}"
    );
    assert!(
        stdout.contains("1 file passed"),
        "Expected 1 file passed: {stdout}"
    );
    assert!(
        stdout.contains("1 file failed"),
        "Expected 1 file failed: {stdout}"
    );
}

#[test]
fn test_check_dml_change_kind() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("update.sql");
    std::fs::write(&sql_path, "UPDATE t SET a = 1;").expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_schemavet"))
        .args(["--change", "dml", sql_path.to_str().expect("sql path")])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit 1 for missing WHERE: {stdout}"
    );
    assert!(
        stdout.contains("301"),
        "Expected no-WHERE code 301: {stdout}"
    );
}
