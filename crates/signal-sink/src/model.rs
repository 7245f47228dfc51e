use std::fmt;

use chrono::{DateTime, Utc};
use pagewalk_core_types::{MissionId, RunId};
use serde::{Deserialize, Serialize};

/// Urgency attached to every signal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalPriority {
    Critical,
    Economic,
    Important,
    Info,
}

impl SignalPriority {
    /// Higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            SignalPriority::Info => 0,
            SignalPriority::Important => 1,
            SignalPriority::Economic => 2,
            SignalPriority::Critical => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalPriority::Critical => "CRITICAL",
            SignalPriority::Economic => "ECONOMIC",
            SignalPriority::Important => "IMPORTANT",
            SignalPriority::Info => "INFO",
        }
    }
}

/// Known signal types plus an escape hatch for downstream-defined ones.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalType {
    SelectorOutcome,
    SelectorAggregate,
    NavigationIntentRanked,
    IntentActionTaken,
    IntentActionBlocked,
    PaginationStopped,
    MissionStatusUpdate,
    MissionProgressUpdate,
    MissionBudgetExceeded,
    MissionCompleted,
    MissionFailed,
    Custom(String),
}

impl SignalType {
    pub fn as_str(&self) -> &str {
        match self {
            SignalType::SelectorOutcome => "selector_outcome",
            SignalType::SelectorAggregate => "selector_aggregate",
            SignalType::NavigationIntentRanked => "navigation_intent_ranked",
            SignalType::IntentActionTaken => "intent_action_taken",
            SignalType::IntentActionBlocked => "intent_action_blocked",
            SignalType::PaginationStopped => "pagination_stopped",
            SignalType::MissionStatusUpdate => "mission_status_update",
            SignalType::MissionProgressUpdate => "mission_progress_update",
            SignalType::MissionBudgetExceeded => "mission_budget_exceeded",
            SignalType::MissionCompleted => "mission_completed",
            SignalType::MissionFailed => "mission_failed",
            SignalType::Custom(name) => name,
        }
    }

    /// Priority used when the emitter does not supply one.
    pub fn default_priority(&self) -> SignalPriority {
        match self {
            SignalType::MissionFailed => SignalPriority::Critical,
            SignalType::MissionBudgetExceeded => SignalPriority::Economic,
            SignalType::MissionStatusUpdate
            | SignalType::MissionProgressUpdate
            | SignalType::MissionCompleted => SignalPriority::Important,
            SignalType::SelectorOutcome
            | SignalType::SelectorAggregate
            | SignalType::NavigationIntentRanked
            | SignalType::IntentActionTaken
            | SignalType::IntentActionBlocked
            | SignalType::PaginationStopped
            | SignalType::Custom(_) => SignalPriority::Info,
        }
    }
}

impl From<String> for SignalType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "selector_outcome" => SignalType::SelectorOutcome,
            "selector_aggregate" => SignalType::SelectorAggregate,
            "navigation_intent_ranked" => SignalType::NavigationIntentRanked,
            "intent_action_taken" => SignalType::IntentActionTaken,
            "intent_action_blocked" => SignalType::IntentActionBlocked,
            "pagination_stopped" => SignalType::PaginationStopped,
            "mission_status_update" => SignalType::MissionStatusUpdate,
            "mission_progress_update" => SignalType::MissionProgressUpdate,
            "mission_budget_exceeded" => SignalType::MissionBudgetExceeded,
            "mission_completed" => SignalType::MissionCompleted,
            "mission_failed" => SignalType::MissionFailed,
            _ => SignalType::Custom(value),
        }
    }
}

impl From<SignalType> for String {
    fn from(value: SignalType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit record describing one decision or outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub signal_type: SignalType,
    pub layer: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<MissionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub priority: SignalPriority,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// New signal stamped now, with the type's default priority.
    pub fn new(
        signal_type: SignalType,
        layer: impl Into<String>,
        source: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        let priority = signal_type.default_priority();
        Self {
            signal_type,
            layer: layer.into(),
            source: source.into(),
            mission_id: None,
            run_id: None,
            payload,
            priority,
            timestamp: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: SignalPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_mission(mut self, mission_id: Option<MissionId>) -> Self {
        self.mission_id = mission_id;
        self
    }

    pub fn with_run(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }
}
