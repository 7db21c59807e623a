//! CLI output tests: run the built binary and check that stdout carries
//! only the JSON or date the downstream consumer expects.

use std::path::Path;
use std::process::{Command, Output};

const FILING: &str = "<SEC-HEADER>FILED AS OF DATE: 20250726\n</SEC-HEADER>\
    <html><body><p>Item 8.01 Other Events.</p>\
    <p>On July 25, 2025 the Company announced a definitive agreement for the acquisition of \
    Widget Co for $12.5 million in cash, subject to customary closing conditions.</p></body></html>";

fn edgarsift(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_edgarsift"))
        .args(args)
        .env_remove("EDGARSIFT_CONFIG")
        .env("RUST_LOG", "warn")
        .output()
        .expect("run edgarsift")
}

fn write_filing(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_distill_prints_distillation_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_filing(dir.path(), "filing.htm", FILING);
    let out = edgarsift(&["distill", &file]);
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["filing_date"], "2025-07-26");
    assert_eq!(json["date_tier"], "header");
    assert_eq!(json["sections"], serde_json::json!(["ITEM_8_01"]));
    assert!(json["distillate"].as_str().unwrap().starts_with("[Other Events]\nItem 8.01"));
    assert!(json["estimated_tokens"].is_number());
    assert!(json["truncated"].is_boolean());
}

#[test]
fn test_distill_several_files_prints_array() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_filing(dir.path(), "a.htm", FILING);
    let b = write_filing(dir.path(), "b.htm", "<p>nothing dated</p>");
    let out = edgarsift(&["distill", &a, &b, "--default-date", "2024-05-06"]);
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["filing_date"], "2024-05-06");
    assert_eq!(items[1]["date_tier"], "default");
}

#[test]
fn test_date_prints_only_the_date() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_filing(dir.path(), "filing.htm", FILING);
    let out = edgarsift(&["date", &file]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "2025-07-26");
}

#[test]
fn test_config_round_trips_through_file() {
    let out = edgarsift(&["config"]);
    assert!(out.status.success());
    let mut json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["limits"]["max_blocks"], 15);
    assert_eq!(json["items"].as_array().map(Vec::len), Some(10));

    json["limits"]["max_blocks"] = serde_json::json!(3);
    let dir = tempfile::tempdir().unwrap();
    let path = write_filing(dir.path(), "config.json", &json.to_string());
    let out = edgarsift(&["config", "--config", &path]);
    assert!(out.status.success());
    let reloaded: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(reloaded["limits"]["max_blocks"], 3);
}

#[test]
fn test_bad_usage_fails() {
    assert!(!edgarsift(&["distill"]).status.success());
    assert!(!edgarsift(&["frobnicate"]).status.success());
    assert!(!edgarsift(&["config", "--config", "/nonexistent/edgarsift.json"]).status.success());
}
