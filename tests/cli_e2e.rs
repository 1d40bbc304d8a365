//! End-to-end CLI tests for the statuscan binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

/// Without an input file the binary prints help and exits with code 0.
#[test]
fn test_binary_without_input_prints_help() {
    let mut cmd = Command::cargo_bin("statuscan").unwrap();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("check website HTTP status codes"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("statuscan").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("statuscan"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("statuscan").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// A missing input file is reported and the run aborts before any request.
#[test]
fn test_binary_missing_input_file_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.txt");

    let mut cmd = Command::cargo_bin("statuscan").unwrap();
    cmd.arg("-u")
        .arg(&missing)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Not found."));
}

/// An input file with only blank lines reports "Empty".
#[test]
fn test_binary_empty_input_file_reports_empty() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("urls.txt");
    std::fs::write(&input, "\n  \n").unwrap();

    let mut cmd = Command::cargo_bin("statuscan").unwrap();
    cmd.arg("-u")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Empty"));
}

/// Full scan: per-URL lines, summary table, and the persisted success file.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_binary_scans_and_saves_successes() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let input = temp.path().join("urls.txt");
    let up = format!("{}/up", mock_server.uri());
    let gone = format!("{}/gone", mock_server.uri());
    std::fs::write(&input, format!("{up}\n{gone}\n{up}\n")).unwrap();
    let output_dir = temp.path().join("result");

    let output = {
        let input = input.clone();
        let output_dir = output_dir.clone();
        tokio::task::spawn_blocking(move || {
            Command::cargo_bin("statuscan")
                .unwrap()
                .arg("-u")
                .arg(&input)
                .args(["-o", "ok.txt", "-q"])
                .arg("--output-dir")
                .arg(&output_dir)
                .output()
                .unwrap()
        })
        .await
        .unwrap()
    };

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("[200] {up}")), "stdout: {stdout}");
    assert!(stdout.contains(&format!("[404] {gone}")), "stdout: {stdout}");
    assert!(stdout.contains("RESULT :"));
    assert!(stdout.contains("[200-299]  : 1"));
    assert!(stdout.contains("[400-499]  : 1"));
    assert!(stdout.contains("saved on"));

    let saved = std::fs::read_to_string(output_dir.join("ok.txt")).unwrap();
    assert_eq!(saved, format!("{up}\n"));
}

/// --json keeps stdout for the snapshot and moves per-URL lines to stderr.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_binary_json_summary() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let input = temp.path().join("urls.txt");
    let down = format!("{}/down", mock_server.uri());
    std::fs::write(&input, format!("{down}\n")).unwrap();

    let output = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("statuscan")
            .unwrap()
            .arg("-u")
            .arg(&input)
            .args(["--json", "-r", "1"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["server_error"], 1);
    assert_eq!(json["success"], 0);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.matches(&format!("[503] {down}")).count(),
        1,
        "stderr: {stderr}"
    );
}

/// An output directory that cannot be created is reported and the scan still runs.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_binary_unusable_output_dir_continues_without_saving() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let input = temp.path().join("urls.txt");
    std::fs::write(&input, format!("{}/up\n", mock_server.uri())).unwrap();
    let blocker = temp.path().join("result");
    std::fs::write(&blocker, "regular file").unwrap();

    let output = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("statuscan")
            .unwrap()
            .arg("-u")
            .arg(&input)
            .args(["-o", "ok.txt"])
            .arg("--output-dir")
            .arg(&blocker)
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("[200-299]  : 1"), "stdout: {stdout}");
    assert!(!stdout.contains("saved on"), "stdout: {stdout}");
    assert!(
        stderr.contains("continuing without persistence"),
        "stderr: {stderr}"
    );
}
