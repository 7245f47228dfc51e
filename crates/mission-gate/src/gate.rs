//! Budget enforcement and the single terminal decision of a run

use chrono::Utc;
use pagewalk_core_types::MissionId;
use pagewalk_signal_sink::{SignalEmitter, SignalType};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::model::*;

/// Owns a mission's budget and progress and produces exactly one
/// [`StopDecision`] per run.
pub struct MissionGate {
    mission_id: Option<MissionId>,
    budget: Option<MissionBudget>,
    progress: MissionProgress,
    /// Budget rule that fired at a checkpoint
    fired: Option<StopDecision>,
    /// Terminal decision handed out by `finalize`
    decision: Option<StopDecision>,
    emitter: SignalEmitter,
}

impl MissionGate {
    pub fn new(mission_id: Option<MissionId>, budget: Option<MissionBudget>, emitter: SignalEmitter) -> Self {
        Self {
            mission_id,
            budget,
            progress: MissionProgress::started_now(),
            fired: None,
            decision: None,
            emitter,
        }
    }

    /// Continue a mission from a persisted progress snapshot.
    pub fn resume(mut self, progress: MissionProgress) -> Self {
        self.progress = progress;
        self
    }

    pub fn mission_id(&self) -> Option<&MissionId> {
        self.mission_id.as_ref()
    }

    pub fn budget(&self) -> Option<&MissionBudget> {
        self.budget.as_ref()
    }

    pub fn progress(&self) -> &MissionProgress {
        &self.progress
    }

    pub fn decision(&self) -> Option<StopDecision> {
        self.decision
    }

    /// The caller's page cap, clamped to what is left of the mission's own.
    /// Pages counted by earlier invocations of a resumed mission are spent.
    pub fn effective_max_pages(&self, requested: u32) -> u32 {
        match &self.budget {
            Some(budget) => {
                requested.min(budget.max_pages.saturating_sub(self.progress.pages_visited))
            }
            None => requested,
        }
    }

    /// Evaluate the budget rules. Duration first, then target, then progress.
    pub fn check_budget(&self, progress: &MissionProgress, elapsed_seconds: f64) -> BudgetVerdict {
        let Some(budget) = &self.budget else {
            return BudgetVerdict::Continue;
        };

        if elapsed_seconds > budget.max_duration_seconds as f64 {
            return BudgetVerdict::Stop(StopDecision::new(
                MissionStatus::Aborted,
                StopReason::MaxDurationExceeded,
            ));
        }
        if let Some(target) = budget.min_items_target {
            if progress.total_items_collected >= target {
                return BudgetVerdict::Stop(StopDecision::new(
                    MissionStatus::Completed,
                    StopReason::TargetReached,
                ));
            }
        }
        if budget.no_progress_page_limit > 0
            && progress.pages_since_last_increase >= budget.no_progress_page_limit
        {
            return BudgetVerdict::Stop(StopDecision::new(MissionStatus::Failed, StopReason::NoProgress));
        }
        BudgetVerdict::Continue
    }

    /// Fold one page into the progress counters.
    pub fn record_page(&mut self, new_items: u64) {
        self.progress.record_page(new_items);
        debug!(
            pages_visited = self.progress.pages_visited,
            total_items = self.progress.total_items_collected,
            new_items,
            "mission progress recorded"
        );
        if self.mission_id.is_some() {
            self.emitter.emit(
                SignalType::MissionProgressUpdate,
                json!({
                    "newItems": new_items,
                    "pagesVisited": self.progress.pages_visited,
                    "totalItemsCollected": self.progress.total_items_collected,
                    "pagesSinceLastIncrease": self.progress.pages_since_last_increase,
                }),
            );
        }
    }

    /// Check the budget against the wall clock. A firing rule is sticky.
    pub fn checkpoint(&mut self) -> BudgetVerdict {
        if let Some(fired) = self.fired {
            return BudgetVerdict::Stop(fired);
        }

        let elapsed = self.progress.elapsed_seconds(Utc::now());
        let verdict = self.check_budget(&self.progress, elapsed);
        if let BudgetVerdict::Stop(decision) = verdict {
            info!(
                status = %decision.status,
                reason = %decision.reason,
                elapsed_seconds = elapsed,
                "mission budget rule fired"
            );
            self.fired = Some(decision);

            if self.mission_id.is_some() {
                self.emitter.emit(
                    SignalType::MissionStatusUpdate,
                    json!({
                        "status": decision.status,
                        "reason": decision.reason,
                        "elapsedSeconds": elapsed,
                        "progress": self.progress,
                    }),
                );
                if decision.reason == StopReason::MaxDurationExceeded {
                    let max_duration = self.budget.as_ref().map(|b| b.max_duration_seconds);
                    self.emitter.emit(
                        SignalType::MissionBudgetExceeded,
                        json!({
                            "budget": "maxDurationSeconds",
                            "limit": max_duration,
                            "elapsedSeconds": elapsed,
                        }),
                    );
                }
            }
        }
        verdict
    }

    /// Produce the run's terminal decision. Idempotent: later calls return
    /// the first decision and emit nothing.
    pub fn finalize(&mut self, controller_reason: StopReason) -> StopDecision {
        if let Some(decision) = self.decision {
            if decision.reason != controller_reason && self.fired.is_none() {
                warn!(
                    recorded = %decision.reason,
                    requested = %controller_reason,
                    "stop decision already final; ignoring later reason"
                );
            }
            return decision;
        }

        let decision = self
            .fired
            .unwrap_or_else(|| StopDecision::from_reason(controller_reason));
        self.decision = Some(decision);
        info!(status = %decision.status, reason = %decision.reason, "run stop decision");

        if self.mission_id.is_some() {
            let signal_type = match decision.status {
                MissionStatus::Completed => SignalType::MissionCompleted,
                MissionStatus::Failed | MissionStatus::Aborted => SignalType::MissionFailed,
            };
            self.emitter.emit(
                signal_type,
                json!({
                    "status": decision.status,
                    "reason": decision.reason,
                    "progress": self.progress,
                }),
            );
        }
        decision
    }
}
