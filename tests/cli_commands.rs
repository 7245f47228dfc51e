use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn extract_json(output: &str) -> &str {
    let start = output.find('{').expect("json start");
    let end = output.rfind('}').expect("json end");
    &output[start..=end]
}

#[test]
fn rank_command_prints_candidates_and_decision() {
    let page = Path::new("demos/page.json");
    assert!(page.exists(), "fixture missing");

    let mut cmd = Command::cargo_bin("pagewalk").expect("binary built");
    let assert = cmd
        .env_remove("PAGEWALK_CONFIDENCE_THRESHOLD")
        .args([
            "rank",
            "--goal",
            "browse companies",
            "--page",
            page.to_str().unwrap(),
            "--top",
            "2",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    let value: Value = serde_json::from_str(extract_json(&stdout)).expect("valid json");

    assert_eq!(value["candidateCount"].as_u64(), Some(4));
    assert_eq!(value["candidates"].as_array().unwrap().len(), 2);
    assert_eq!(value["candidates"][0]["link"]["text"], "Browse Companies");
    assert_eq!(value["evaluation"]["decision"], "taken");
    assert_eq!(
        value["evaluation"]["action"]["href"],
        "https://directory.example.com/companies"
    );
}

#[test]
fn run_command_writes_result_and_signal_log() {
    let tmp = tempdir().expect("tempdir");
    let signals = tmp.path().join("signals.jsonl");

    let mut cmd = Command::cargo_bin("pagewalk").expect("binary built");
    let assert = cmd
        .args(["--log-format", "json", "run", "--input", "demos/run.json", "--site", "demos/site.yaml"])
        .arg("--signals")
        .arg(&signals)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    let value: Value = serde_json::from_str(extract_json(&stdout)).expect("valid json");
    assert_eq!(value["pagesVisited"].as_u64(), Some(3));
    assert_eq!(value["stopDecision"]["status"], "completed");

    let log = std::fs::read_to_string(&signals).expect("signal log");
    assert!(log.lines().count() > 0);
}

#[test]
fn invalid_threshold_override_fails_fast() {
    let mut cmd = Command::cargo_bin("pagewalk").expect("binary built");
    cmd.env("PAGEWALK_CONFIDENCE_THRESHOLD", "2.5")
        .args(["rank", "--goal", "x", "--page", "demos/page.json"])
        .assert()
        .failure();
}
