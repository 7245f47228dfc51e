//! Navigation run orchestration

use std::sync::Arc;
use std::time::Instant;

use action_gate::{IntentActionSelector, IntentDecision, IntentSelectorConfig};
use action_locator::NextControlResolver;
use intent_ranker::{IntentRanker, RankerWeights};
use mission_gate::{BudgetVerdict, MissionGate, StopReason};
use pagewalk_core_types::{
    Driver, MissionId, PageInspector, PageSnapshot, RankingStore, RunId, StaticRankingStore,
};
use pagewalk_signal_sink::{NullSignalSink, SignalEmitter, SignalSink, SignalType};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::click::ClickRetryPolicy;
use crate::context::RunContext;
use crate::controller::{PagePorts, PaginationController, PaginationJob};
use crate::errors::FlowError;
use crate::types::*;

const LAYER: &str = "navigation";

/// Runs one traversal end to end and always answers with a [`RunResponse`].
pub struct NavigationRunner {
    sink: Arc<dyn SignalSink>,
    rankings: Arc<dyn RankingStore>,
    ranker: IntentRanker,
    selector: IntentActionSelector,
    controller: PaginationController,
}

impl NavigationRunner {
    pub fn new(sink: Arc<dyn SignalSink>, rankings: Arc<dyn RankingStore>) -> Self {
        Self {
            sink,
            rankings,
            ranker: IntentRanker::new(),
            selector: IntentActionSelector::default(),
            controller: PaginationController::default(),
        }
    }

    pub fn with_intent_config(mut self, config: IntentSelectorConfig) -> Self {
        self.selector = IntentActionSelector::new(config);
        self
    }

    pub fn with_ranker_weights(mut self, weights: RankerWeights) -> Self {
        self.ranker = IntentRanker::with_weights(weights);
        self
    }

    pub fn with_click_policy(mut self, policy: ClickRetryPolicy) -> Self {
        self.controller = self.controller.with_click_policy(policy);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn NextControlResolver>) -> Self {
        self.controller = self.controller.with_resolver(resolver);
        self
    }

    /// Execute a run. Faults never escape: they become a stop reason or a
    /// `FAILED` response.
    pub async fn run(
        &self,
        input: RunInput,
        driver: &dyn Driver,
        inspector: &dyn PageInspector,
        cancel: CancellationToken,
    ) -> RunResponse {
        let started = Instant::now();
        let run_id = RunId::new();

        let target_url = match validate(&input) {
            Ok(target_url) => target_url,
            Err(err) => {
                warn!(run_id = %run_id, %err, "run rejected");
                return RunResponse::Failed(RunFailure::new(
                    err.to_string(),
                    json!({ "runId": run_id, "kind": err.kind() }),
                ));
            }
        };

        let mission_id = input.mission_id.clone().map(MissionId::new);
        let emitter = SignalEmitter::new(self.sink.clone(), LAYER, "navigation_runner", run_id.clone())
            .with_mission(mission_id.clone());
        let mut gate = MissionGate::new(
            mission_id,
            input.mission_budget.clone(),
            emitter.for_source("mission", "mission_gate"),
        );
        if let Some(progress) = input.mission_progress.clone() {
            gate = gate.resume(progress);
        }
        let mut ctx = RunContext::new(run_id.clone(), cancel);
        let max_pages = gate.effective_max_pages(input.max_pages);
        info!(
            run_id = %run_id,
            target = %target_url,
            max_pages,
            goal = input.goal_description.is_some(),
            "navigation run started"
        );

        let mut intent_action = None;
        let outcome = match gate.checkpoint() {
            BudgetVerdict::Stop(decision) => PaginationOutcome::stopped_early(decision.reason),
            BudgetVerdict::Continue if max_pages == 0 => {
                info!(run_id = %run_id, "mission page budget already spent");
                PaginationOutcome::stopped_early(StopReason::MaxPages)
            }
            BudgetVerdict::Continue => {
                self.traverse(
                    &input,
                    &target_url,
                    max_pages,
                    PagePorts { driver, inspector },
                    &mut ctx,
                    &mut gate,
                    &emitter,
                    &mut intent_action,
                )
                .await
            }
        };

        let decision = gate.finalize(outcome.stop_reason);
        let duration_ms = started.elapsed().as_millis() as u64;

        emitter
            .for_source(LAYER, "selector_resolver")
            .emit(SignalType::SelectorAggregate, ctx.selector_stats.to_payload());
        emitter.emit(
            SignalType::PaginationStopped,
            json!({
                "reason": outcome.stop_reason,
                "status": decision.status,
                "pagesVisited": outcome.pages_visited,
                "itemsCollected": ctx.items().len(),
                "paginationDetected": outcome.pagination_detected,
                "paginationMethod": outcome.pagination_method,
                "durationMs": duration_ms,
            }),
        );
        info!(
            run_id = %run_id,
            status = %decision.status,
            reason = %decision.reason,
            pages = outcome.pages_visited,
            items = ctx.items().len(),
            duration_ms,
            "navigation run finished"
        );

        let last_error = ctx.last_error().map(str::to_string);
        let result = RunResult {
            run_id: run_id.to_string(),
            items: ctx.take_items(),
            pages_visited: outcome.pages_visited,
            pagination_detected: outcome.pagination_detected,
            pagination_method: outcome.pagination_method,
            pagination_stopped_reason: outcome.stop_reason,
            duration_ms,
            stop_decision: decision,
            intent_action,
            mission_progress: input.mission_id.as_ref().map(|_| gate.progress().clone()),
        };

        if decision.reason == StopReason::ExtractionError {
            let error = last_error.unwrap_or_else(|| StopReason::ExtractionError.to_string());
            let metadata = serde_json::to_value(&result).unwrap_or_else(|_| json!({ "runId": result.run_id }));
            return RunResponse::Failed(RunFailure::new(error, metadata));
        }
        RunResponse::Completed(result)
    }

    #[allow(clippy::too_many_arguments)]
    async fn traverse(
        &self,
        input: &RunInput,
        target_url: &str,
        max_pages: u32,
        ports: PagePorts<'_>,
        ctx: &mut RunContext,
        gate: &mut MissionGate,
        emitter: &SignalEmitter,
        intent_action: &mut Option<action_gate::IntentAction>,
    ) -> PaginationOutcome {
        let rankings = match self.rankings.load().await {
            Ok(rankings) => rankings,
            Err(err) => {
                warn!(%err, "control rankings unavailable; using fallbacks only");
                Vec::new()
            }
        };
        debug!(rankings = rankings.len(), "control rankings loaded");

        if let Err(err) = ports.driver.navigate(target_url).await {
            let err = FlowError::from(err);
            warn!(%err, "initial navigation failed");
            ctx.record_error(&err);
            return PaginationOutcome::stopped_early(StopReason::ExtractionError);
        }

        let mut initial = None;
        if let Some(goal) = input
            .goal_description
            .as_deref()
            .filter(|goal| !goal.trim().is_empty())
        {
            match self.follow_intent(goal, ports, ctx, emitter).await {
                Ok((snapshot, decision)) => {
                    if let IntentDecision::Taken(action) = decision {
                        *intent_action = Some(action);
                    } else {
                        initial = Some(snapshot);
                    }
                }
                Err(err) => {
                    warn!(%err, "intent step failed");
                    ctx.record_error(&err);
                    let reason = match err {
                        FlowError::Driver(_) => StopReason::NavigationFailed,
                        _ => StopReason::ExtractionError,
                    };
                    return PaginationOutcome::stopped_early(reason);
                }
            }
        }

        let request = input.extract_request();
        let job = PaginationJob {
            request: &request,
            rankings: &rankings,
            max_pages,
        };
        self.controller
            .run(
                ports,
                &job,
                ctx,
                gate,
                &emitter.for_source(LAYER, "pagination_controller"),
                initial,
            )
            .await
    }

    /// Rank the landing page against the goal and take at most one step.
    async fn follow_intent(
        &self,
        goal: &str,
        ports: PagePorts<'_>,
        ctx: &mut RunContext,
        emitter: &SignalEmitter,
    ) -> Result<(PageSnapshot, IntentDecision), FlowError> {
        let url = ports.driver.current_url().await?;
        let snapshot = ports.inspector.snapshot(&url).await?;
        let candidates = self.ranker.rank(goal, &snapshot);

        let top = candidates.first().map(|candidate| {
            json!({
                "text": candidate.link.text,
                "href": candidate.link.href,
                "score": candidate.score,
                "relevance": candidate.relevance,
                "signals": candidate.signals,
            })
        });
        emitter.for_source(LAYER, "intent_ranker").emit(
            SignalType::NavigationIntentRanked,
            json!({
                "goal": goal,
                "url": snapshot.url,
                "candidateCount": candidates.len(),
                "topCandidate": top,
            }),
        );

        let decision = self
            .selector
            .select_action(
                &candidates,
                &snapshot.url,
                ports.driver,
                &emitter.for_source(LAYER, "intent_selector"),
                &mut ctx.intent_latch,
            )
            .await?;
        Ok((snapshot, decision))
    }
}

impl Default for NavigationRunner {
    fn default() -> Self {
        Self::new(
            Arc::new(NullSignalSink),
            Arc::new(StaticRankingStore::new(Vec::new())),
        )
    }
}

fn validate(input: &RunInput) -> Result<String, FlowError> {
    let target_url = input
        .target_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| FlowError::InvalidInput("targetUrl is required".to_string()))?;
    if input.max_pages == 0 {
        return Err(FlowError::InvalidInput("maxPages must be at least 1".to_string()));
    }
    Ok(target_url.to_string())
}
