//! CLI integration tests
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const BASE: &str = "https://slowkitchen.example/2024/starter";

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("lumpy")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn json_output(args: &[&str]) -> Value {
    let output = cmd().args(args).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_file_input_json() {
    let record = json_output(&[&get_fixture_path("article.html"), "--base-url", BASE]);

    assert_eq!(record["url"], BASE);
    assert_eq!(record["title"], "Keeping Sourdough Starters Alive Through Winter");
    assert_eq!(record["author"], "Mira Okafor");
    assert_eq!(record["siteName"], "The Slow Kitchen");
    assert_eq!(record["imageUrl"], "");
    assert!(record["content"].as_str().unwrap().contains("hooch is a sign of hunger"));
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("meta_only.html")).unwrap();
    let output = cmd().args(["-", "--base-url", "https://example.com/launch"]).write_stdin(html).output().unwrap();
    assert!(output.status.success());

    let record: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["title"], "Launch Announcement");
    assert_eq!(record["author"], "Product Team");
    assert_eq!(record["content"], "");
}

#[test]
fn test_cli_navigation_only_page() {
    let record = json_output(&[&get_fixture_path("nav_only.html"), "--base-url", "https://example.com/menu"]);
    assert_eq!(record["title"], "https://example.com/menu");
    assert_eq!(record["siteName"], "example.com");
    assert_eq!(record["content"], "");
}

#[test]
fn test_cli_navigation_links_page() {
    let record = json_output(&[&get_fixture_path("nav_links.html"), "--base-url", "https://example.com/menu"]);
    let content = record["content"].as_str().unwrap();

    assert_eq!(record["title"], "https://example.com/menu");
    assert_eq!(content.trim(), "Home Recipes About");
    assert!(!content.contains("<a"));
}

#[test]
fn test_cli_og_image_flag() {
    let record = json_output(&[&get_fixture_path("article.html"), "--base-url", BASE, "--og-image"]);
    assert_eq!(record["imageUrl"], "https://slowkitchen.example/img/starter.jpg");
}

#[test]
fn test_cli_html_format() {
    cmd()
        .args(["-f", "html", &get_fixture_path("article.html"), "--base-url", BASE])
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>"))
        .stdout(predicate::str::contains(r#"src="https://slowkitchen.example/img/jar.jpg""#));
}

#[test]
fn test_cli_text_format() {
    cmd()
        .args(["-f", "text", &get_fixture_path("article.html"), "--base-url", BASE])
        .assert()
        .success()
        .stdout(predicate::str::contains("hooch is a sign of hunger"))
        .stdout(predicate::str::contains("<p>").not());
}

#[test]
fn test_cli_no_images() {
    cmd()
        .args(["--no-images", "-f", "html", &get_fixture_path("article.html"), "--base-url", BASE])
        .assert()
        .success()
        .stdout(predicate::str::contains("<img").not());
}

#[test]
fn test_cli_char_threshold() {
    cmd()
        .args(["--char-threshold", "100", &get_fixture_path("article.html"), "--base-url", BASE])
        .assert()
        .success();
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("record.json");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .args([&get_fixture_path("article.html"), "--base-url", BASE])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let record: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(record["siteName"], "The Slow Kitchen");
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &get_fixture_path("article.html"), "--base-url", BASE])
        .assert()
        .success()
        .stderr(predicate::str::contains("Lumpy"))
        .stderr(predicate::str::contains("readability"));
}

#[test]
fn test_cli_file_requires_base_url() {
    cmd()
        .arg(get_fixture_path("article.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--base-url"));
}

#[test]
fn test_cli_invalid_base_url() {
    cmd()
        .args([&get_fixture_path("article.html"), "--base-url", "slowkitchen.example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid_url"));
}

#[test]
fn test_cli_invalid_file() {
    cmd().args(["nonexistent.html", "--base-url", BASE]).assert().failure();
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "markdown", &get_fixture_path("article.html"), "--base-url", BASE])
        .assert()
        .failure();
}

#[test]
fn test_cli_unreachable_url() {
    cmd()
        .args(["--timeout", "2", "http://127.0.0.1:1/post"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetch_error"));
}
