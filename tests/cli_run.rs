use std::fs;
use std::path::PathBuf;

use action_flow::RunResponse;
use anyhow::Result;
use pagewalk_cli::cli::run::execute_run;
use pagewalk_cli::cli::RunArgs;
use pagewalk_cli::Config;
use serde_json::Value;
use tempfile::tempdir;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[tokio::test]
async fn demo_run_follows_goal_then_paginates() -> Result<()> {
    let tmp = tempdir()?;
    let signals = tmp.path().join("signals.jsonl");
    let args = RunArgs {
        input: demo("run.json"),
        site: demo("site.yaml"),
        signals: Some(signals.clone()),
    };

    let response = execute_run(&args, &Config::default()).await?;
    let result = match &response {
        RunResponse::Completed(result) => result,
        RunResponse::Failed(failure) => panic!("run failed: {}", failure.error),
    };

    assert_eq!(result.pages_visited, 3);
    assert_eq!(result.items.len(), 8);
    assert!(result.pagination_detected);
    assert_eq!(result.pagination_method.as_deref(), Some("rel_next"));
    assert_eq!(result.pagination_stopped_reason.as_str(), "no_next");
    assert_eq!(
        result.intent_action.as_ref().map(|action| action.href.as_str()),
        Some("https://directory.example.com/companies")
    );

    let lines: Vec<Value> = fs::read_to_string(&signals)?
        .lines()
        .map(|line| serde_json::from_str::<Value>(line))
        .collect::<Result<_, _>>()?;
    let types: Vec<&str> = lines
        .iter()
        .filter_map(|line| line["signalType"].as_str())
        .collect();
    assert!(types.contains(&"intent_action_taken"));
    assert!(types.contains(&"selector_aggregate"));
    assert!(types.contains(&"mission_completed"));
    assert_eq!(types.last(), Some(&"pagination_stopped"));
    assert!(lines
        .iter()
        .filter(|line| line["signalType"] == "mission_progress_update")
        .all(|line| line["missionId"] == "demo-mission"));
    Ok(())
}

#[tokio::test]
async fn disabled_signal_log_writes_nothing() -> Result<()> {
    let tmp = tempdir()?;
    let mut config = Config::default();
    config.signals.enabled = false;
    config.signals.path = tmp.path().join("never.jsonl");

    let args = RunArgs {
        input: demo("run.json"),
        site: demo("site.yaml"),
        signals: None,
    };
    let response = execute_run(&args, &config).await?;

    assert!(!response.is_failed());
    assert!(!config.signals.path.exists());
    Ok(())
}

#[tokio::test]
async fn unreadable_input_is_an_error() {
    let args = RunArgs {
        input: PathBuf::from("does/not/exist.json"),
        site: demo("site.yaml"),
        signals: None,
    };
    let err = execute_run(&args, &Config::default()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read run input"));
}
