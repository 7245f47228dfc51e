//! Core types for the intent action gates

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.25;
pub const DEFAULT_SCORE_DIVISOR: f64 = 10.0;

/// Tunables for the intent action selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentSelectorConfig {
    /// Minimum confidence required to act
    pub confidence_threshold: f64,
    /// Raw score mapped to full confidence
    pub score_divisor: f64,
}

impl IntentSelectorConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_divisor(mut self, divisor: f64) -> Self {
        self.score_divisor = divisor;
        self
    }

    /// Non-positive or non-finite divisors fall back to the default.
    pub fn effective_divisor(&self) -> f64 {
        if self.score_divisor.is_finite() && self.score_divisor > 0.0 {
            self.score_divisor
        } else {
            DEFAULT_SCORE_DIVISOR
        }
    }

    pub fn confidence_for(&self, score: i32) -> f64 {
        (score as f64 / self.effective_divisor()).clamp(0.0, 1.0)
    }
}

impl Default for IntentSelectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            score_divisor: DEFAULT_SCORE_DIVISOR,
        }
    }
}

/// Gate that stopped an intent action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum GateBlock {
    NoCandidates,
    ConfidenceBelowThreshold { confidence: f64, threshold: f64 },
    ElementNotClickable,
    HrefEqualsCurrentUrl,
}

impl GateBlock {
    pub fn reason(&self) -> &'static str {
        match self {
            GateBlock::NoCandidates => "no_candidates",
            GateBlock::ConfidenceBelowThreshold { .. } => "confidence_below_threshold",
            GateBlock::ElementNotClickable => "element_not_clickable",
            GateBlock::HrefEqualsCurrentUrl => "href_equals_current_url",
        }
    }
}

/// Navigation the selector decided to take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentAction {
    /// Absolute target URL
    pub href: String,
    pub link_text: String,
    pub score: i32,
    pub confidence: f64,
    pub relevance: f64,
    pub signals: Vec<String>,
    pub score_exceeds_divisor: bool,
}

/// What one selector invocation ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentDecision {
    Taken(IntentAction),
    Blocked(GateBlock),
    /// The run already spent its single intent evaluation
    AlreadyEvaluated,
}

impl IntentDecision {
    pub fn action(&self) -> Option<&IntentAction> {
        match self {
            IntentDecision::Taken(action) => Some(action),
            _ => None,
        }
    }
}

/// One-shot guard owned by the run.
#[derive(Debug, Default, Clone)]
pub struct SelectorLatch {
    spent: bool,
}

impl SelectorLatch {
    /// Returns `true` exactly once.
    pub fn try_acquire(&mut self) -> bool {
        if self.spent {
            return false;
        }
        self.spent = true;
        true
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }
}
