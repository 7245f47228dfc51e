//! Historical control rankings loaded from prior runs.

use serde::{Deserialize, Serialize};

/// How a ranked selector addresses its control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorType {
    StructuralQuery,
    PathQuery,
    AccessibilityLabel,
    TextMatch,
    OrdinalPageNumber,
}

impl SelectorType {
    pub fn name(&self) -> &'static str {
        match self {
            SelectorType::StructuralQuery => "structural_query",
            SelectorType::PathQuery => "path_query",
            SelectorType::AccessibilityLabel => "accessibility_label",
            SelectorType::TextMatch => "text_match",
            SelectorType::OrdinalPageNumber => "ordinal_page_number",
        }
    }
}

/// A selector that advanced pagination in earlier runs, with its track record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRanking {
    pub selector: String,
    pub selector_type: SelectorType,
    pub historical_rank: u32,
    #[serde(default)]
    pub historical_success_rate: f64,
}

impl ControlRanking {
    pub fn new(selector: impl Into<String>, selector_type: SelectorType, rank: u32) -> Self {
        Self {
            selector: selector.into(),
            selector_type,
            historical_rank: rank,
            historical_success_rate: 0.0,
        }
    }

    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.historical_success_rate = rate.clamp(0.0, 1.0);
        self
    }
}
