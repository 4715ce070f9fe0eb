//! Integration tests for the `hb` CLI.
//!
//! Each test points `hb` at a fresh temp data directory, runs it as a
//! subprocess, and checks stdout and/or the files it leaves behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

/// Get the path to the built `hb` binary.
fn hb_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hb"))
}

/// Run `hb` against `data_dir`, returning (stdout, stderr, success).
fn run_hb(data_dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(hb_bin())
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("HABITS_DIR")
        .output()
        .expect("failed to run hb");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `hb` expecting success, return stdout.
fn run_hb_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_hb(data_dir, args);
    if !success {
        panic!(
            "hb {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `hb` expecting failure, return stderr.
fn run_hb_err(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_hb(data_dir, args);
    if success {
        panic!("hb {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

/// Titles in list order, via `list --json`
fn titles(data_dir: &Path) -> Vec<String> {
    let out = run_hb_ok(data_dir, &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["title"].as_str().unwrap().to_string())
        .collect()
}

fn setup(titles: &[&str]) -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    for t in titles {
        run_hb_ok(tmp.path(), &["add", t]);
    }
    tmp
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_list_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_hb_ok(tmp.path(), &[]);
    assert!(out.contains("No habits yet"));
    let out = run_hb_ok(tmp.path(), &["list", "--json"]);
    assert_eq!(out.trim(), "[]");
}

#[test]
fn test_list_shows_positions() {
    let tmp = setup(&["Read", "Walk"]);
    let out = run_hb_ok(tmp.path(), &["list"]);
    assert!(out.contains("1. [·] Read"));
    assert!(out.contains("2. [·] Walk"));
}

#[test]
fn test_list_json_fields() {
    let tmp = setup(&["Read"]);
    let out = run_hb_ok(tmp.path(), &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let first = &parsed[0];
    assert_eq!(first["title"], "Read");
    assert_eq!(first["rating"], "neutral");
    assert_eq!(first["position"], 1);
    assert!(first["id"].is_string());
    assert!(first["createdAt"].is_string());
}

#[test]
fn test_help_explains_number_lookup() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_hb_ok(tmp.path(), &["rm", "--help"]);
    assert!(out.contains("read as a position"));
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[test]
fn test_add_default_names() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_hb_ok(tmp.path(), &["add"]);
    run_hb_ok(tmp.path(), &["add"]);
    run_hb_ok(tmp.path(), &["add"]);
    run_hb_ok(tmp.path(), &["rm", "My new atomic habit 2"]);

    assert_eq!(
        run_hb_ok(tmp.path(), &["next-name"]).trim(),
        "My new atomic habit 2"
    );
    let out = run_hb_ok(tmp.path(), &["add", "--at", "1"]);
    assert!(out.contains("Added 1. My new atomic habit 2"));
    assert_eq!(
        titles(tmp.path()),
        vec![
            "My new atomic habit 2",
            "My new atomic habit 1",
            "My new atomic habit 3"
        ]
    );
}

#[test]
fn test_add_above_and_below() {
    let tmp = setup(&["Read", "Walk"]);
    run_hb_ok(tmp.path(), &["add", "Stretch", "--above", "walk"]);
    run_hb_ok(tmp.path(), &["add", "Sleep", "--below", "Walk"]);
    assert_eq!(titles(tmp.path()), vec!["Read", "Stretch", "Walk", "Sleep"]);
}

#[test]
fn test_add_far_position_appends() {
    let tmp = setup(&["Read"]);
    run_hb_ok(tmp.path(), &["add", "Walk", "--at", "99"]);
    assert_eq!(titles(tmp.path()), vec!["Read", "Walk"]);
}

#[test]
fn test_add_with_rating() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_hb_ok(tmp.path(), &["add", "Run", "--rating", "plus", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["rating"], "plus");
}

#[test]
fn test_add_duplicate_rejected() {
    let tmp = setup(&["Read"]);
    let err = run_hb_err(tmp.path(), &["add", "  READ "]);
    assert!(err.contains("already exists"));
    assert_eq!(titles(tmp.path()), vec!["Read"]);
}

#[test]
fn test_add_empty_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_hb_err(tmp.path(), &["add", "   "]);
    assert!(err.contains("must not be empty"));
}

#[test]
fn test_add_uses_configured_language() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_hb_ok(tmp.path(), &["lang", "ru"]);
    let out = run_hb_ok(tmp.path(), &["add"]);
    assert!(out.contains("Моя новая атомная привычка 1"));
}

// ---------------------------------------------------------------------------
// Rename / rate
// ---------------------------------------------------------------------------

#[test]
fn test_rename() {
    let tmp = setup(&["Read", "Walk"]);
    run_hb_ok(tmp.path(), &["rename", "2", "  Walk 5k  "]);
    assert_eq!(titles(tmp.path()), vec!["Read", "Walk 5k"]);
}

#[test]
fn test_rename_duplicate_rejected() {
    let tmp = setup(&["Read", "Walk"]);
    let err = run_hb_err(tmp.path(), &["rename", "Walk", "read"]);
    assert!(err.contains("already exists"));
}

#[test]
fn test_rate() {
    let tmp = setup(&["Read"]);
    run_hb_ok(tmp.path(), &["rate", "Read", "minus"]);
    let out = run_hb_ok(tmp.path(), &["list"]);
    assert!(out.contains("[-] Read"));
    let err = run_hb_err(tmp.path(), &["rate", "Read", "amazing"]);
    assert!(err.contains("unknown rating"));
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

#[test]
fn test_mv_forward_and_backward() {
    let tmp = setup(&["a", "b", "c", "d", "e"]);
    run_hb_ok(tmp.path(), &["mv", "b", "4"]);
    assert_eq!(titles(tmp.path()), vec!["a", "c", "d", "b", "e"]);
    run_hb_ok(tmp.path(), &["mv", "b", "2"]);
    assert_eq!(titles(tmp.path()), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_mv_top_bottom() {
    let tmp = setup(&["a", "b", "c"]);
    run_hb_ok(tmp.path(), &["mv", "c", "--top"]);
    assert_eq!(titles(tmp.path()), vec!["c", "a", "b"]);
    run_hb_ok(tmp.path(), &["mv", "c", "--bottom"]);
    assert_eq!(titles(tmp.path()), vec!["a", "b", "c"]);
}

#[test]
fn test_mv_onto() {
    let tmp = setup(&["a", "b", "c", "d"]);
    run_hb_ok(tmp.path(), &["mv", "a", "--onto", "c"]);
    assert_eq!(titles(tmp.path()), vec!["b", "c", "a", "d"]);
    run_hb_ok(tmp.path(), &["mv", "d", "--onto", "b"]);
    assert_eq!(titles(tmp.path()), vec!["d", "b", "c", "a"]);
}

#[test]
fn test_mv_requires_target() {
    let tmp = setup(&["a"]);
    let err = run_hb_err(tmp.path(), &["mv", "a"]);
    assert!(err.contains("specify a position"));
}

#[test]
fn test_mv_unknown_habit() {
    let tmp = setup(&["a"]);
    let err = run_hb_err(tmp.path(), &["mv", "zzz", "1"]);
    assert!(err.contains("habit not found"));
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn test_rm_reindexes() {
    let tmp = setup(&["a", "b", "c"]);
    run_hb_ok(tmp.path(), &["rm", "2"]);
    let out = run_hb_ok(tmp.path(), &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let positions: Vec<u64> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["position"].as_u64().unwrap())
        .collect();
    assert_eq!(positions, vec![1, 2]);
    assert_eq!(titles(tmp.path()), vec!["a", "c"]);

    let log = fs::read_to_string(tmp.path().join(".recovery.log")).unwrap();
    assert!(log.contains("Title: b"));
}

#[test]
fn test_clear_requires_yes() {
    let tmp = setup(&["a", "b"]);
    let err = run_hb_err(tmp.path(), &["clear"]);
    assert!(err.contains("--yes"));
    assert_eq!(titles(tmp.path()).len(), 2);

    let out = run_hb_ok(tmp.path(), &["clear", "--yes"]);
    assert!(out.contains("Deleted 2 habits"));
    assert!(titles(tmp.path()).is_empty());
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[test]
fn test_data_file_layout() {
    let tmp = setup(&["Read"]);
    let raw = fs::read_to_string(tmp.path().join("habits.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &parsed[0];
    assert_eq!(first["order"], 0);
    assert_eq!(first["rating"], "neutral");
    assert!(first["createdAt"].is_i64());
    assert!(first["updatedAt"].is_i64());
}

#[test]
fn test_corrupt_data_reads_as_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("habits.json"), "{ nope").unwrap();
    let out = run_hb_ok(tmp.path(), &["list"]);
    assert!(out.contains("No habits yet"));
    let log = fs::read_to_string(tmp.path().join(".recovery.log")).unwrap();
    assert!(log.contains("{ nope"));
}

#[test]
fn test_reads_existing_blob() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("habits.json"),
        r#"[
  {"id":"6f1c2a8e-5a3b-4c1d-9e7f-0a1b2c3d4e5f","title":"Second","rating":"plus","order":1,"createdAt":1700000000000},
  {"id":"0b7f5d2c-3a44-4f0e-9a1e-3c2b9d8e7f60","title":"First","rating":"minus","order":0,"createdAt":1700000000000,"updatedAt":1700000001000}
]"#,
    )
    .unwrap();
    assert_eq!(titles(tmp.path()), vec!["First", "Second"]);
    let out = run_hb_ok(tmp.path(), &["list"]);
    assert!(out.contains("1. [-] First"));
    assert!(out.contains("2. [+] Second"));
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[test]
fn test_theme_toggle() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert_eq!(run_hb_ok(tmp.path(), &["theme"]).trim(), "light");
    assert_eq!(run_hb_ok(tmp.path(), &["theme", "toggle"]).trim(), "dark");
    assert_eq!(
        fs::read_to_string(tmp.path().join("theme")).unwrap(),
        "dark"
    );
    assert_eq!(run_hb_ok(tmp.path(), &["theme", "light"]).trim(), "light");
    let err = run_hb_err(tmp.path(), &["theme", "blue"]);
    assert!(err.contains("unknown theme"));
}

#[test]
fn test_theme_default_from_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[ui]\ndefault_theme = \"dark\"\n",
    )
    .unwrap();
    let out = run_hb_ok(tmp.path(), &["theme", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["theme"], "dark");
    assert_eq!(parsed["default"], true);
}

#[test]
fn test_lang() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert_eq!(run_hb_ok(tmp.path(), &["lang"]).trim(), "en");
    assert_eq!(run_hb_ok(tmp.path(), &["lang", "ru-RU"]).trim(), "ru");
    assert_eq!(run_hb_ok(tmp.path(), &["lang"]).trim(), "ru");
    let err = run_hb_err(tmp.path(), &["lang", "de"]);
    assert!(err.contains("unsupported language"));
}

#[test]
fn test_writes_log_file() {
    let tmp = setup(&["Read"]);
    let logs: Vec<_> = fs::read_dir(tmp.path().join("logs"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(!logs.is_empty());
}
