//! End-to-end CLI tests for tabledump.
//!
//! These tests run the actual binary against JSON Lines fixtures and check
//! the files it leaves behind.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");

    let objects = r#"{"id": 1, "name": "alice", "email": null}
{"id": 2, "name": "bob", "email": "bob@example.com"}
{"id": 3, "name": "O'Brien", "email": "ob@example.com"}
"#;
    fs::write(dir.path().join("users.jsonl"), objects).unwrap();

    let arrays = "[1, \"x\"]\n[2, \"y\"]\n[3, \"z\"]\n[4, \"w\"]\n";
    fs::write(dir.path().join("arrays.jsonl"), arrays).unwrap();

    fs::write(dir.path().join("empty.jsonl"), "").unwrap();
    fs::write(dir.path().join("broken.jsonl"), "{\"id\": 1}\n{not json\n").unwrap();

    fs::write(
        dir.path().join("table.sql"),
        "CREATE TABLE `users` (`id` int, `name` text, `email` text)",
    )
    .unwrap();
    fs::write(dir.path().join("db.sql"), "CREATE DATABASE `app`").unwrap();

    dir
}

fn tabledump_cmd() -> Command {
    let cmd = std::process::Command::new(env!("CARGO_BIN_EXE_tabledump"));
    Command::from_std(cmd)
}

fn input(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

fn out_dir(dir: &TempDir) -> PathBuf {
    dir.path().join("out")
}

// ============================================================================
// Basic functionality
// ============================================================================

#[test]
fn test_sql_dump_defaults() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    tabledump_cmd()
        .arg(input(&dir, "users.jsonl"))
        .args(["--db", "app", "--table", "users", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows:   3"))
        .stdout(predicate::str::contains("Files:  1"));

    let sql = fs::read_to_string(out.join("app.users.0.sql")).unwrap();
    assert_eq!(
        sql,
        "/*!40101 SET NAMES binary*/;\n\
         INSERT INTO `users` VALUES\n\
         (1,'alice',NULL),\n\
         (2,'bob','bob@example.com'),\n\
         (3,'O\\'Brien','ob@example.com');\n"
    );
}

#[test]
fn test_complete_insert_with_detected_columns() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    tabledump_cmd()
        .arg(input(&dir, "users.jsonl"))
        .args(["--db", "app", "--table", "users", "--complete-insert", "-o"])
        .arg(&out)
        .assert()
        .success();

    let sql = fs::read_to_string(out.join("app.users.0.sql")).unwrap();
    assert!(sql.contains("INSERT INTO `users` (`id`,`name`,`email`) VALUES\n"));
}

#[test]
fn test_csv_dump_with_split() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    // each file holds the header plus one row
    tabledump_cmd()
        .arg(input(&dir, "arrays.jsonl"))
        .args([
            "--db",
            "app",
            "--table",
            "letters",
            "--format",
            "csv",
            "--columns",
            "id,letter",
            "--filesize",
            "15B",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files:  4"));

    for (i, line) in ["1,x", "2,y", "3,z", "4,w"].iter().enumerate() {
        let csv = fs::read_to_string(out.join(format!("app.letters.{i}.csv"))).unwrap();
        assert_eq!(csv, format!("id,letter\n{line}\n"));
    }
    assert!(!out.join("app.letters.4.csv").exists());
}

#[test]
fn test_csv_options() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    tabledump_cmd()
        .arg(input(&dir, "users.jsonl"))
        .args([
            "--db",
            "app",
            "--table",
            "users",
            "-f",
            "csv",
            "--csv-null",
            "NULL",
            "--csv-separator",
            ";",
            "--no-header",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(out.join("app.users.0.csv")).unwrap();
    assert_eq!(csv, "1;alice;NULL\n2;bob;bob@example.com\n3;O'Brien;ob@example.com\n");
}

#[test]
fn test_csv_multibyte_separator() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    tabledump_cmd()
        .arg(input(&dir, "arrays.jsonl"))
        .args([
            "--db",
            "app",
            "--table",
            "letters",
            "-f",
            "csv",
            "--columns",
            "id,letter",
            "--csv-separator",
            "||",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(out.join("app.letters.0.csv")).unwrap();
    assert_eq!(csv, "id||letter\n1||x\n2||y\n3||z\n4||w\n");
}

#[test]
fn test_template_and_chunk_index() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    tabledump_cmd()
        .arg(input(&dir, "arrays.jsonl"))
        .args([
            "--db",
            "app",
            "--table",
            "letters",
            "--template",
            "{{.Table}}_{{.Index}}",
            "--chunk-index",
            "7",
            "-o",
        ])
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("letters_7.sql").exists());
}

#[test]
fn test_schema_files() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    tabledump_cmd()
        .arg(input(&dir, "users.jsonl"))
        .args(["--db", "app", "--table", "users", "--schema-sql"])
        .arg(input(&dir, "table.sql"))
        .arg("--db-schema-sql")
        .arg(input(&dir, "db.sql"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote table schema"));

    assert_eq!(
        fs::read_to_string(out.join("app-schema-create.sql")).unwrap(),
        "/*!40101 SET NAMES binary*/;\nCREATE DATABASE `app`;\n"
    );
    assert!(out.join("app.users-schema.sql").exists());
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn test_empty_input_writes_no_data_file() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    tabledump_cmd()
        .arg(input(&dir, "empty.jsonl"))
        .args(["--db", "app", "--table", "users", "--filesize", "1KB", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files:  0"));

    assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}

// ============================================================================
// Error handling
// ============================================================================

#[test]
fn test_bad_template_fails() {
    let dir = setup_fixtures();

    tabledump_cmd()
        .arg(input(&dir, "users.jsonl"))
        .args(["--db", "app", "--table", "users", "--template", "{{.Schema}}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid output file template"));
}

#[test]
fn test_broken_row_fails() {
    let dir = setup_fixtures();
    let out = out_dir(&dir);

    tabledump_cmd()
        .arg(input(&dir, "broken.jsonl"))
        .args(["--db", "app", "--table", "t", "-o"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode row 2"));
}

#[test]
fn test_missing_input_fails() {
    let dir = setup_fixtures();

    tabledump_cmd()
        .arg(input(&dir, "nope.jsonl"))
        .args(["--db", "app", "--table", "t", "-o"])
        .arg(out_dir(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_invalid_size_rejected() {
    tabledump_cmd()
        .args(["x.jsonl", "--db", "a", "--table", "b", "--filesize", "huge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid size value"));
}

#[test]
fn test_help() {
    tabledump_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--filesize"))
        .stdout(predicate::str::contains("EXAMPLES"));
}
