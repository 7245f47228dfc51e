//! Run input, result and response types

use action_gate::IntentAction;
use mission_gate::{MissionBudget, MissionProgress, StopDecision, StopReason};
use pagewalk_core_types::{ExtractRequest, ExtractedItem};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_max_pages() -> u32 {
    10
}

/// What the caller asks one run to do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInput {
    /// Page the traversal starts from
    #[serde(default)]
    pub target_url: Option<String>,

    /// Kind of page the inspector should expect
    #[serde(default)]
    pub page_type: String,

    /// Field names the inspector should extract per item
    #[serde(default)]
    pub expected_fields: Vec<String>,

    /// Page cap requested by the caller
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Free-text goal; enables the intent navigation step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_budget: Option<MissionBudget>,

    /// Progress persisted by an earlier invocation of the same mission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_progress: Option<MissionProgress>,
}

impl RunInput {
    pub fn new(target_url: impl Into<String>, max_pages: u32) -> Self {
        Self {
            target_url: Some(target_url.into()),
            page_type: "listing".to_string(),
            max_pages,
            ..Self::default()
        }
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal_description = Some(goal.into());
        self
    }

    pub fn with_mission(mut self, mission_id: impl Into<String>, budget: MissionBudget) -> Self {
        self.mission_id = Some(mission_id.into());
        self.mission_budget = Some(budget);
        self
    }

    pub fn extract_request(&self) -> ExtractRequest {
        ExtractRequest {
            page_type: self.page_type.clone(),
            expected_fields: self.expected_fields.clone(),
        }
    }
}

/// Extracted item plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedItem {
    #[serde(flatten)]
    pub item: ExtractedItem,

    /// 1-based index of the visited page
    pub page_index: u32,

    pub source_url: String,
}

/// Outcome of the pagination loop alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOutcome {
    pub stop_reason: StopReason,
    pub pages_visited: u32,
    pub pagination_detected: bool,
    pub pagination_method: Option<String>,
}

impl PaginationOutcome {
    /// Outcome for a run that stopped before the loop started.
    pub fn stopped_early(stop_reason: StopReason) -> Self {
        Self {
            stop_reason,
            pages_visited: 0,
            pagination_detected: false,
            pagination_method: None,
        }
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub run_id: String,
    pub items: Vec<CollectedItem>,
    pub pages_visited: u32,
    pub pagination_detected: bool,
    pub pagination_method: Option<String>,
    pub pagination_stopped_reason: StopReason,
    pub duration_ms: u64,
    pub stop_decision: StopDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_action: Option<IntentAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_progress: Option<MissionProgress>,
}

/// Structured failure handed back instead of a fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Always `FAILED`
    pub status: String,
    pub error: String,
    /// Partial result or run identifiers
    pub metadata: Value,
}

impl RunFailure {
    pub fn new(error: impl Into<String>, metadata: Value) -> Self {
        Self {
            status: "FAILED".to_string(),
            error: error.into(),
            metadata,
        }
    }
}

/// What `NavigationRunner::run` returns. Never a panic, never an `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunResponse {
    Failed(RunFailure),
    Completed(RunResult),
}

impl RunResponse {
    pub fn result(&self) -> Option<&RunResult> {
        match self {
            RunResponse::Completed(result) => Some(result),
            RunResponse::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            RunResponse::Failed(failure) => Some(failure),
            RunResponse::Completed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunResponse::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_reads_camel_case_with_defaults() {
        let input: RunInput = serde_json::from_str(
            r#"{"targetUrl":"https://shop.test/list","pageType":"listing","expectedFields":["name"],
                "missionBudget":{"maxPages":3,"maxDurationSeconds":120}}"#,
        )
        .unwrap();
        assert_eq!(input.max_pages, 10);
        assert_eq!(input.mission_budget.as_ref().unwrap().max_pages, 3);
        assert_eq!(input.extract_request().expected_fields, vec!["name"]);
    }

    #[test]
    fn collected_items_flatten_fields() {
        let item = CollectedItem {
            item: ExtractedItem::with_href("/p/1").with_field("name", "Widget"),
            page_index: 2,
            source_url: "https://shop.test/list?page=2".to_string(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["href"], "/p/1");
        assert_eq!(value["fields"]["name"], "Widget");
        assert_eq!(value["pageIndex"], 2);
    }

    #[test]
    fn failures_serialise_with_status() {
        let response = RunResponse::Failed(RunFailure::new("targetUrl is required", Value::Null));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "FAILED");
        assert_eq!(value["error"], "targetUrl is required");
    }
}
