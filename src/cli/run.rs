use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use action_flow::{ClickRetryPolicy, NavigationRunner, RunInput, RunResponse};
use anyhow::{bail, Context, Result};
use clap::Args;
use pagewalk_core_types::{JsonRankingStore, RankingStore, StaticRankingStore};
use pagewalk_signal_sink::{JsonlSignalSink, MemorySignalSink, SignalSink, TeeSignalSink};
use site_fixture::{FixtureBrowser, SiteFixture};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::context::CliContext;
use crate::config::Config;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Run input (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Recorded site to run against (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub site: PathBuf,

    /// Signal log path, overriding the configuration
    #[arg(long, value_name = "FILE")]
    pub signals: Option<PathBuf>,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let response = execute_run(&args, ctx.config()).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let RunResponse::Failed(failure) = &response {
        bail!("run failed: {}", failure.error);
    }
    Ok(())
}

/// Load inputs, wire the runner and execute one run.
pub async fn execute_run(args: &RunArgs, config: &Config) -> Result<RunResponse> {
    let raw_input = fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read run input {}", args.input.display()))?;
    let input: RunInput = serde_json::from_str(&raw_input).context("Failed to parse run input")?;
    let site = SiteFixture::load(&args.site)
        .with_context(|| format!("Failed to load site fixture {}", args.site.display()))?;

    let memory = MemorySignalSink::new();
    let sink = build_sink(args, config, memory.clone())?;
    let rankings: Arc<dyn RankingStore> = match &config.rankings.path {
        Some(path) => Arc::new(JsonRankingStore::new(path.clone())),
        None => Arc::new(StaticRankingStore::new(Vec::new())),
    };

    let runner = NavigationRunner::new(sink.clone(), rankings)
        .with_intent_config(config.intent)
        .with_ranker_weights(config.ranker)
        .with_click_policy(ClickRetryPolicy::with_attempts(config.pagination.click_attempts));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; stopping at the next page checkpoint");
            interrupt.cancel();
        }
    });

    let browser = FixtureBrowser::new(site);
    let response = runner.run(input, &browser, &browser, cancel).await;
    watcher.abort();

    if let Err(err) = sink.flush() {
        warn!(%err, "failed to flush signal log");
    }
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for signal in memory.snapshot() {
        *by_type.entry(signal.signal_type.as_str().to_string()).or_insert(0) += 1;
    }
    info!(signals = memory.len(), by_type = ?by_type, "signals emitted");

    Ok(response)
}

fn build_sink(args: &RunArgs, config: &Config, memory: Arc<MemorySignalSink>) -> Result<Arc<dyn SignalSink>> {
    let path = args
        .signals
        .clone()
        .or_else(|| config.signals.enabled.then(|| config.signals.path.clone()));
    let memory: Arc<dyn SignalSink> = memory;
    let Some(path) = path else {
        return Ok(memory);
    };

    let file: Arc<dyn SignalSink> = Arc::new(
        JsonlSignalSink::open(&path)
            .with_context(|| format!("Failed to open signal log {}", path.display()))?,
    );
    info!(path = %path.display(), "appending signals");
    Ok(Arc::new(TeeSignalSink::new(vec![file, memory])))
}
