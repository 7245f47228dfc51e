//! Core types for next-control resolution

use std::collections::BTreeMap;

use pagewalk_core_types::{ControlHandle, ControlKind, ControlQuery, SelectorType};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Substrings that mark a ranked selector as pagination-related.
pub const PAGINATION_HINTS: &[&str] = &["next", "page", "pagination", "aria", "rel"];

/// Visible texts accepted by the text fallback, in priority order.
pub const NEXT_TEXT_VARIANTS: &[&str] = &[
    "Next",
    "next",
    "NEXT",
    ">",
    "→",
    "More",
    "more",
    "Next Page",
    "next page",
];

/// CSS class fragments marking the active page in a pager.
pub const ACTIVE_PAGE_MARKERS: &[&str] = &["active", "current"];

/// Control chosen to advance to the next page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedControl {
    pub handle: ControlHandle,
    /// `ranked_<selector type>` for history hits, the fallback name otherwise
    pub method_tag: String,
    pub selector: String,
    pub selector_type: SelectorType,
}

/// Result of one lookup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Found,
    NotFound,
    NotVisible,
    Error,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Found => "found",
            AttemptOutcome::NotFound => "not_found",
            AttemptOutcome::NotVisible => "not_visible",
            AttemptOutcome::Error => "error",
        }
    }
}

/// Per-run tally of resolver activity, reported once as `selector_aggregate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorStats {
    pub attempts: u32,
    pub errors: u32,
    pub resolutions: u32,
    pub not_found: u32,
    pub hits_by_method: BTreeMap<String, u32>,
}

impl SelectorStats {
    pub fn record_attempt(&mut self, outcome: AttemptOutcome) {
        self.attempts += 1;
        if outcome == AttemptOutcome::Error {
            self.errors += 1;
        }
    }

    pub fn record_resolution(&mut self, method_tag: &str) {
        self.resolutions += 1;
        *self
            .hits_by_method
            .entry(method_tag.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_not_found(&mut self) {
        self.not_found += 1;
    }

    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }
}

/// Human-readable selector string used in signals.
pub fn describe_query(query: &ControlQuery) -> String {
    match query {
        ControlQuery::Structural(selector) | ControlQuery::Path(selector) => selector.clone(),
        ControlQuery::AccessibilityLabel(needle) => format!("[aria-label*=\"{}\" i]", needle),
        ControlQuery::ExactText { text, kind } => {
            let scope = match kind {
                ControlKind::Button => "button",
                ControlKind::Link => "a",
                ControlKind::Any => "*",
            };
            format!("{}:text(\"{}\")", scope, text)
        }
        ControlQuery::RelNext => "a[rel=\"next\"]".to_string(),
    }
}

/// Whether a ranked selector looks like it addresses a pager control.
pub fn is_pagination_selector(selector: &str) -> bool {
    let lowered = selector.to_lowercase();
    PAGINATION_HINTS.iter().any(|hint| lowered.contains(hint))
}
