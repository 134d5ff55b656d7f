use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../mmd-babel/tests/fixtures")
        .join(name)
}

#[test]
fn prints_the_topic_tree() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("mmd");
    cmd.current_dir(dir.path()).arg("inspect").arg(fixture("sample.mm"));

    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.starts_with("⧉ Map (6 topics)\n└─ ◉ Travel\n"));
    assert!(stdout.contains("  ├─ ⊕ Packing\n"));
    assert!(stdout.contains("  └─ ○ Route ↗ ✎\n"));
}

#[test]
fn full_view_lists_payloads() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("mmd");
    cmd.current_dir(dir.path())
        .arg("inspect")
        .arg(fixture("sample.mmd"))
        .arg("--extra-full");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("✎ Family favourites"))
        .stdout(predicate::str::contains("↗ https://example.com/soup"))
        .stdout(predicate::str::contains("≔ fillColor=#FFCC00"))
        .stdout(predicate::str::contains("ƒ text"));
}

#[test]
fn invalid_flag_values_are_reported() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("mmd");
    cmd.current_dir(dir.path())
        .arg("inspect")
        .arg(fixture("sample.mm"))
        .arg("--extra-full")
        .arg("sometimes");

    cmd.assert().failure().stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("mmd");
    cmd.current_dir(dir.path()).arg("inspect").arg("nowhere.mm");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error: Can't read 'nowhere.mm'"));
}

#[test]
fn lists_formats() {
    let mut cmd = cargo_bin_cmd!("mmd");
    cmd.arg("--list-formats");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Available formats:"))
        .stdout(predicate::str::contains("freemind"))
        .stdout(predicate::str::contains(".xmind"));
}

#[test]
fn lists_formats_as_json() {
    let mut cmd = cargo_bin_cmd!("mmd");
    cmd.arg("--list-formats").arg("--json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let formats: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
    assert_eq!(formats.len(), 14);

    let png = formats.iter().find(|f| f["name"] == "png").unwrap();
    assert_eq!(png["import"], false);
    assert_eq!(png["export"], true);
    assert_eq!(png["extensions"], serde_json::json!(["png"]));

    let xmind = formats.iter().find(|f| f["name"] == "xmind").unwrap();
    assert_eq!(xmind["import"], true);
    assert_eq!(xmind["export"], false);
}
