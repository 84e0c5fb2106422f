use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn scout() -> Command {
    let mut cmd = Command::cargo_bin("catalog-scout").expect("binary built");
    cmd.env_remove("RUST_LOG").env_remove("CATALOG_API_URL");
    cmd
}

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn classify_prints_one_json_line_per_ticker() {
    scout()
        .args(["classify", "KXNFLGAME-25JAN12KCBUF", "KXSOCCEREPL-FOO"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""ticker":"KXNFLGAME-25JAN12KCBUF""#,
        ))
        .stdout(predicate::str::contains(r#""category":"NFL""#))
        .stdout(predicate::str::contains(r#""away":"KC","home":"BUF""#))
        .stdout(predicate::str::contains(r#""date":"2025-01-12""#))
        .stdout(predicate::str::contains(r#""category":"SOCCER_EPL""#))
        .stdout(predicate::str::contains(r#""confident":false"#));
}

#[test]
fn classify_reads_tickers_from_stdin() {
    scout()
        .arg("classify")
        .write_stdin("KXNBAGAME-25DEC25LALGS\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""category":"NBA""#))
        .stdout(predicate::str::contains(r#""away":"LAL""#));
}

#[test]
fn classify_uses_category_metadata() {
    scout()
        .args(["classify", "--category", "Sports", "KXCURLING-26FEB"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""category":"OTHER""#));
}

#[test]
fn check_config_accepts_valid_file() {
    let file = write_temp_config("[fetch]\npage_size = 250\n");

    scout()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("250"));
}

#[test]
fn check_config_rejects_invalid_file() {
    let file = write_temp_config("[fetch]\npage_size = 0\n");

    scout()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("page_size"));
}

#[test]
fn check_config_reports_missing_file() {
    scout()
        .args(["check", "config", "--config", "/nonexistent/catalog-scout.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn unknown_metric_flag_is_rejected_before_any_request() {
    scout()
        .args(["top", "--metrics", "popularity"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown metric"));
}
