//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("excerpo")
}

fn fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{name}")
}

fn site_fixture_path(site: &str, name: &str) -> String {
    format!("../../tests/fixtures/sites/{site}/{name}")
}

#[test]
fn test_cli_file_input() {
    cmd()
        .args(["--no-cache", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rustの所有権モデル入門"));
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(fixture_path("article.html")).unwrap();
    cmd()
        .args(["--no-cache", "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("所有権と借用"));
}

#[test]
fn test_cli_text_report_headers() {
    cmd()
        .args(["--no-cache", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Extraction report ==="))
        .stdout(predicate::str::contains("Title: Rustの所有権モデル入門"));
}

#[test]
fn test_cli_markdown_format() {
    cmd()
        .args(["--no-cache", "-f", "markdown", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Extraction report"))
        .stdout(predicate::str::contains("## Html (1)"));
}

#[test]
fn test_cli_html_format() {
    cmd()
        .args(["--no-cache", "-f", "html", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"));
}

#[test]
fn test_cli_json_format() {
    cmd()
        .args(["--no-cache", "-f", "json", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("\"success\": true"));
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("report.txt");

    cmd()
        .args(["--no-cache", "-o", output.to_str().unwrap(), &fixture_path("article.html")])
        .assert()
        .success();

    let report = std::fs::read_to_string(&output).unwrap();
    assert!(report.contains("Rustの所有権モデル入門"));
}

#[test]
fn test_cli_input_file_list() {
    let tmp = TempDir::new().unwrap();
    let list = tmp.path().join("urls.txt");
    let article = std::fs::canonicalize(fixture_path("article.html")).unwrap();
    std::fs::write(&list, format!("# local pages\n{}\n", article.display())).unwrap();

    cmd()
        .args(["--no-cache", "-i", list.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("所有権"));
}

#[test]
fn test_cli_site_fixture() {
    cmd()
        .args(["--no-cache", &site_fixture_path("qiita", "article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("非同期Rust入門"));
}

#[test]
fn test_cli_fullpage_mode() {
    cmd()
        .args(["--no-cache", "--mode", "fullpage", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("ガベージコレクタ"));
}

#[test]
fn test_cli_empty_content_fails() {
    cmd()
        .args(["--no-cache", &fixture_path("empty_content.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input could be extracted"));
}

#[test]
fn test_cli_invalid_url_fails() {
    cmd().args(["--no-cache", "::not a url::"]).assert().failure();
}

#[test]
fn test_cli_include_errors() {
    cmd()
        .args(["--no-cache", "--include-errors", "-f", "markdown", "::not a url::"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("**Error**"));
}

#[test]
fn test_cli_no_inputs() {
    cmd().assert().failure();
}

#[test]
fn test_cli_verbose_banner() {
    cmd()
        .args(["--no-cache", "-v", &fixture_path("article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Excerpo"));
}

#[test]
fn test_cli_media_url_is_skipped_offline() {
    // Extension classification settles media URLs without any fetch.
    cmd()
        .args(["--no-cache", "--include-errors", "https://example.com/photo.png"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Image (1)"))
        .stdout(predicate::str::contains("unsupported content"));
}
