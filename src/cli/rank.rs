use std::path::PathBuf;

use action_gate::IntentActionSelector;
use anyhow::{Context, Result};
use clap::Args;
use intent_ranker::IntentRanker;
use pagewalk_core_types::PageSnapshot;
use serde_json::{json, Value};
use tokio::fs;

use crate::cli::context::CliContext;
use crate::config::Config;

#[derive(Args, Clone, Debug)]
pub struct RankArgs {
    /// Free-text goal to rank links against
    #[arg(short, long)]
    pub goal: String,

    /// Page snapshot (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub page: PathBuf,

    /// Only print the best N candidates
    #[arg(long)]
    pub top: Option<usize>,
}

pub async fn cmd_rank(args: RankArgs, ctx: &CliContext) -> Result<()> {
    let raw = fs::read_to_string(&args.page)
        .await
        .with_context(|| format!("Failed to read page snapshot {}", args.page.display()))?;
    let page: PageSnapshot = serde_json::from_str(&raw).context("Failed to parse page snapshot")?;

    let report = rank_page(&args.goal, &page, args.top, ctx.config());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Rank a page's links and report what the intent gates would decide,
/// without touching a browser.
pub fn rank_page(goal: &str, page: &PageSnapshot, top: Option<usize>, config: &Config) -> Value {
    let candidates = IntentRanker::with_weights(config.ranker).rank(goal, page);
    let selector = IntentActionSelector::new(config.intent);
    let evaluation = match selector.evaluate(&candidates, &page.url) {
        Ok(action) => json!({ "decision": "taken", "action": action }),
        Err(block) => json!({ "decision": "blocked", "block": block }),
    };

    let shown = top.unwrap_or(candidates.len()).min(candidates.len());
    json!({
        "goal": goal,
        "url": page.url,
        "candidateCount": candidates.len(),
        "candidates": &candidates[..shown],
        "evaluation": evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewalk_core_types::LinkDescriptor;

    fn directory_page() -> PageSnapshot {
        PageSnapshot::capture(
            "https://example.com/",
            "Home",
            "welcome",
            vec![
                LinkDescriptor::new("Company Directory", "/companies"),
                LinkDescriptor::new("Careers", "https://jobs.other.com/"),
                LinkDescriptor::new("Contact", "/contact"),
            ],
        )
    }

    #[test]
    fn reports_taken_action_for_directory_goal() {
        let report = rank_page("find companies", &directory_page(), None, &Config::default());
        assert_eq!(report["evaluation"]["decision"], "taken");
        assert_eq!(
            report["evaluation"]["action"]["href"],
            "https://example.com/companies"
        );
        assert_eq!(report["candidateCount"], 3);
    }

    #[test]
    fn top_limits_printed_candidates() {
        let report = rank_page("find companies", &directory_page(), Some(1), &Config::default());
        assert_eq!(report["candidates"].as_array().map(Vec::len), Some(1));
        assert_eq!(report["candidateCount"], 3);
    }

    #[test]
    fn empty_page_is_blocked() {
        let page = PageSnapshot::capture("https://example.com/", "Empty", "", Vec::new());
        let report = rank_page("find companies", &page, None, &Config::default());
        assert_eq!(report["evaluation"]["decision"], "blocked");
        assert_eq!(report["evaluation"]["block"]["reason"], "no_candidates");
    }
}
