//! Budget, progress and stop decision models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Limits a mission runs under. Fixed once the mission starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionBudget {
    pub max_pages: u32,
    pub max_duration_seconds: u64,
    /// Zero disables the rule
    #[serde(default)]
    pub no_progress_page_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items_target: Option<u64>,
}

impl MissionBudget {
    pub fn new(max_pages: u32, max_duration_seconds: u64) -> Self {
        Self {
            max_pages,
            max_duration_seconds,
            no_progress_page_limit: 0,
            min_items_target: None,
        }
    }

    pub fn with_no_progress_limit(mut self, pages: u32) -> Self {
        self.no_progress_page_limit = pages;
        self
    }

    pub fn with_target(mut self, items: u64) -> Self {
        self.min_items_target = Some(items);
        self
    }
}

/// Counters carried across the pages of a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionProgress {
    pub total_items_collected: u64,
    pub pages_since_last_increase: u32,
    pub pages_visited: u32,
    pub started_at: DateTime<Utc>,
}

impl MissionProgress {
    pub fn started_now() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self {
            total_items_collected: 0,
            pages_since_last_increase: 0,
            pages_visited: 0,
            started_at,
        }
    }

    /// Fold one visited page into the counters.
    pub fn record_page(&mut self, new_items: u64) {
        self.pages_visited += 1;
        self.total_items_collected += new_items;
        if new_items > 0 {
            self.pages_since_last_increase = 0;
        } else {
            self.pages_since_last_increase += 1;
        }
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.started_at).num_milliseconds().max(0);
        millis as f64 / 1000.0
    }
}

/// Terminal status of a run or mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    Completed,
    Failed,
    Aborted,
}

impl MissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MissionStatus::Completed => "completed",
            MissionStatus::Failed => "failed",
            MissionStatus::Aborted => "aborted",
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why traversal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Duplicate,
    MaxPages,
    NoNext,
    NavigationFailed,
    ExtractionError,
    MaxDurationExceeded,
    TargetReached,
    NoProgress,
    Cancelled,
}

impl StopReason {
    pub const ALL: [StopReason; 9] = [
        StopReason::Duplicate,
        StopReason::MaxPages,
        StopReason::NoNext,
        StopReason::NavigationFailed,
        StopReason::ExtractionError,
        StopReason::MaxDurationExceeded,
        StopReason::TargetReached,
        StopReason::NoProgress,
        StopReason::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::Duplicate => "duplicate",
            StopReason::MaxPages => "max_pages",
            StopReason::NoNext => "no_next",
            StopReason::NavigationFailed => "navigation_failed",
            StopReason::ExtractionError => "extraction_error",
            StopReason::MaxDurationExceeded => "max_duration_exceeded",
            StopReason::TargetReached => "target_reached",
            StopReason::NoProgress => "no_progress",
            StopReason::Cancelled => "cancelled",
        }
    }

    /// Failure taxonomy entry the reason belongs to.
    pub fn category(self) -> StopCategory {
        match self {
            StopReason::NoNext => StopCategory::ControlResolution,
            StopReason::NavigationFailed => StopCategory::Navigation,
            StopReason::Duplicate => StopCategory::Duplicate,
            StopReason::ExtractionError => StopCategory::Extraction,
            StopReason::MaxPages
            | StopReason::MaxDurationExceeded
            | StopReason::TargetReached
            | StopReason::NoProgress => StopCategory::Budget,
            StopReason::Cancelled => StopCategory::Cancellation,
        }
    }

    /// Status a reason maps to when no budget rule overrides it.
    pub fn default_status(self) -> MissionStatus {
        match self {
            StopReason::ExtractionError | StopReason::NoProgress => MissionStatus::Failed,
            StopReason::MaxDurationExceeded | StopReason::Cancelled => MissionStatus::Aborted,
            _ => MissionStatus::Completed,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of run termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCategory {
    /// No next control; a normal end
    ControlResolution,
    /// Clicks never changed the page
    Navigation,
    /// Content repeated
    Duplicate,
    /// Inspector failed
    Extraction,
    /// A page, duration, target or progress limit
    Budget,
    Cancellation,
}

impl StopCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            StopCategory::ControlResolution => "control_resolution",
            StopCategory::Navigation => "navigation",
            StopCategory::Duplicate => "duplicate",
            StopCategory::Extraction => "extraction",
            StopCategory::Budget => "budget",
            StopCategory::Cancellation => "cancellation",
        }
    }
}

impl fmt::Display for StopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopDecision {
    pub status: MissionStatus,
    pub reason: StopReason,
}

impl StopDecision {
    pub fn new(status: MissionStatus, reason: StopReason) -> Self {
        Self { status, reason }
    }

    pub fn from_reason(reason: StopReason) -> Self {
        Self::new(reason.default_status(), reason)
    }
}

/// Result of one budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetVerdict {
    Continue,
    Stop(StopDecision),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn progress_counts_pages_without_new_items() {
        let mut progress = MissionProgress::started_now();
        progress.record_page(4);
        progress.record_page(0);
        progress.record_page(0);
        assert_eq!(progress.pages_visited, 3);
        assert_eq!(progress.total_items_collected, 4);
        assert_eq!(progress.pages_since_last_increase, 2);

        progress.record_page(1);
        assert_eq!(progress.pages_since_last_increase, 0);
    }

    #[test]
    fn elapsed_never_negative() {
        let now = Utc::now();
        let progress = MissionProgress::started_at(now + Duration::seconds(30));
        assert_eq!(progress.elapsed_seconds(now), 0.0);
        let progress = MissionProgress::started_at(now - Duration::milliseconds(1500));
        assert!((progress.elapsed_seconds(now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn default_statuses() {
        assert_eq!(StopReason::ExtractionError.default_status(), MissionStatus::Failed);
        assert_eq!(StopReason::NoProgress.default_status(), MissionStatus::Failed);
        assert_eq!(StopReason::Cancelled.default_status(), MissionStatus::Aborted);
        assert_eq!(StopReason::NavigationFailed.default_status(), MissionStatus::Completed);
        assert_eq!(StopReason::Duplicate.default_status(), MissionStatus::Completed);
    }

    #[test]
    fn every_reason_has_a_name_and_one_category() {
        use std::collections::HashSet;

        let mut names = HashSet::new();
        for reason in StopReason::ALL {
            assert!(!reason.as_str().is_empty());
            assert!(names.insert(reason.as_str()), "duplicate name {reason}");
            assert_eq!(
                serde_json::to_value(reason).unwrap(),
                serde_json::Value::String(reason.as_str().to_string())
            );
            assert!(!reason.category().as_str().is_empty());
        }

        let categories: HashSet<_> = StopReason::ALL.iter().map(|r| r.category()).collect();
        assert_eq!(categories.len(), 6);
        assert_eq!(StopReason::NoNext.category(), StopCategory::ControlResolution);
        assert_eq!(StopReason::NavigationFailed.category(), StopCategory::Navigation);
        assert_eq!(StopReason::Duplicate.category(), StopCategory::Duplicate);
        assert_eq!(StopReason::ExtractionError.category(), StopCategory::Extraction);
        assert_eq!(StopReason::MaxDurationExceeded.category(), StopCategory::Budget);
        assert_eq!(StopReason::Cancelled.category(), StopCategory::Cancellation);
    }

    #[test]
    fn budget_reads_camel_case() {
        let budget: MissionBudget =
            serde_json::from_str(r#"{"maxPages":5,"maxDurationSeconds":60,"noProgressPageLimit":2}"#)
                .unwrap();
        assert_eq!(budget, MissionBudget::new(5, 60).with_no_progress_limit(2));
    }
}
