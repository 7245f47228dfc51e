//! Confidence-gated selection of the single intent navigation

use intent_ranker::Candidate;
use pagewalk_core_types::{resolve_href, strip_query, Driver, DriverError};
use pagewalk_signal_sink::{SignalEmitter, SignalType};
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::types::*;

/// Applies the safety gates to ranked candidates and navigates at most once.
#[derive(Debug, Clone, Default)]
pub struct IntentActionSelector {
    config: IntentSelectorConfig,
}

impl IntentActionSelector {
    pub fn new(config: IntentSelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntentSelectorConfig {
        &self.config
    }

    /// Run the gates against the top candidate. No side effects.
    pub fn evaluate(&self, candidates: &[Candidate], current_url: &str) -> Result<IntentAction, GateBlock> {
        let top = candidates.first().ok_or(GateBlock::NoCandidates)?;

        let confidence = self.config.confidence_for(top.score);
        if confidence < self.config.confidence_threshold {
            return Err(GateBlock::ConfidenceBelowThreshold {
                confidence,
                threshold: self.config.confidence_threshold,
            });
        }

        let target = resolve_href(current_url, &top.link.href).ok_or(GateBlock::ElementNotClickable)?;
        if points_at_current(&target, current_url) {
            return Err(GateBlock::HrefEqualsCurrentUrl);
        }

        let score_exceeds_divisor = top.score as f64 > self.config.effective_divisor();
        if score_exceeds_divisor {
            warn!(
                score = top.score,
                divisor = self.config.effective_divisor(),
                "candidate score exceeds confidence divisor; confidence saturated"
            );
        }

        Ok(IntentAction {
            href: target.to_string(),
            link_text: top.link.text.trim().to_string(),
            score: top.score,
            confidence,
            relevance: top.relevance,
            signals: top.signals.clone(),
            score_exceeds_divisor,
        })
    }

    /// Evaluate once per run, report the outcome and navigate on a pass.
    ///
    /// A spent latch refuses without touching the driver or the sink.
    pub async fn select_action(
        &self,
        candidates: &[Candidate],
        current_url: &str,
        driver: &dyn Driver,
        emitter: &SignalEmitter,
        latch: &mut SelectorLatch,
    ) -> Result<IntentDecision, DriverError> {
        if !latch.try_acquire() {
            warn!(url = current_url, "intent selection already evaluated for this run");
            return Ok(IntentDecision::AlreadyEvaluated);
        }

        match self.evaluate(candidates, current_url) {
            Ok(action) => {
                info!(
                    href = %action.href,
                    score = action.score,
                    confidence = action.confidence,
                    "intent action taken"
                );
                emitter.emit(
                    SignalType::IntentActionTaken,
                    json!({
                        "link": action.link_text,
                        "href": action.href,
                        "score": action.score,
                        "confidence": action.confidence,
                        "relevance": action.relevance,
                        "signals": action.signals,
                        "scoreExceedsDivisor": action.score_exceeds_divisor,
                    }),
                );
                driver.navigate(&action.href).await?;
                Ok(IntentDecision::Taken(action))
            }
            Err(block) => {
                debug!(reason = block.reason(), candidates = candidates.len(), "intent action blocked");
                let mut payload = json!({
                    "reason": block.reason(),
                    "candidateCount": candidates.len(),
                });
                if let GateBlock::ConfidenceBelowThreshold { confidence, threshold } = &block {
                    payload["confidence"] = json!(confidence);
                    payload["threshold"] = json!(threshold);
                }
                emitter.emit(SignalType::IntentActionBlocked, payload);
                Ok(IntentDecision::Blocked(block))
            }
        }
    }
}

fn points_at_current(target: &Url, current_url: &str) -> bool {
    match Url::parse(current_url) {
        Ok(current) => *target == current || strip_query(target) == strip_query(&current),
        Err(_) => target.as_str() == current_url.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pagewalk_core_types::{ClickMode, ControlHandle, ControlQuery, LinkDescriptor, RunId};
    use pagewalk_signal_sink::MemorySignalSink;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingDriver {
        navigations: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Driver for RecordingDriver {
        async fn navigate(&self, url: &str) -> Result<(), DriverError> {
            self.navigations.lock().push(url.to_string());
            Ok(())
        }

        async fn find_controls(&self, _query: &ControlQuery) -> Result<Vec<ControlHandle>, DriverError> {
            Ok(Vec::new())
        }

        async fn click(&self, _handle: &ControlHandle, _mode: ClickMode) -> Result<bool, DriverError> {
            Ok(false)
        }

        async fn current_fingerprint(&self) -> Result<String, DriverError> {
            Ok(String::new())
        }

        async fn current_url(&self) -> Result<String, DriverError> {
            Ok(String::new())
        }
    }

    const HOME: &str = "https://example.com/home?ref=nav";

    fn candidate(text: &str, href: &str, score: i32) -> Candidate {
        Candidate {
            link: LinkDescriptor::new(text, href),
            score,
            signals: vec!["directory_text:browse".to_string()],
            relevance: 0.5,
        }
    }

    #[test]
    fn empty_candidates_are_blocked() {
        let selector = IntentActionSelector::default();
        assert_eq!(selector.evaluate(&[], HOME), Err(GateBlock::NoCandidates));
    }

    #[test]
    fn low_confidence_is_blocked() {
        let selector = IntentActionSelector::default();
        let block = selector.evaluate(&[candidate("More", "/more", 2)], HOME).unwrap_err();
        assert_eq!(block.reason(), "confidence_below_threshold");
    }

    #[test]
    fn threshold_is_inclusive() {
        let selector = IntentActionSelector::new(IntentSelectorConfig::default().with_threshold(0.3));
        assert!(selector.evaluate(&[candidate("Browse", "/directory", 3)], HOME).is_ok());
    }

    #[test]
    fn placeholder_href_is_not_clickable() {
        let selector = IntentActionSelector::default();
        let block = selector
            .evaluate(&[candidate("Browse", "javascript:void(0)", 7)], HOME)
            .unwrap_err();
        assert_eq!(block, GateBlock::ElementNotClickable);
    }

    #[test]
    fn self_links_are_blocked_with_and_without_query() {
        let selector = IntentActionSelector::default();
        for href in ["/home?ref=nav", "/home", "https://example.com/home#top"] {
            let block = selector.evaluate(&[candidate("Home", href, 7)], HOME).unwrap_err();
            assert_eq!(block, GateBlock::HrefEqualsCurrentUrl, "href {href}");
        }
    }

    #[test]
    fn passing_candidate_resolves_to_absolute_href() {
        let selector = IntentActionSelector::default();
        let action = selector
            .evaluate(&[candidate("Browse Companies", "/directory", 7)], HOME)
            .unwrap();
        assert_eq!(action.href, "https://example.com/directory");
        assert!((action.confidence - 0.7).abs() < 1e-9);
        assert!(!action.score_exceeds_divisor);
    }

    #[test]
    fn oversized_scores_are_flagged() {
        let selector = IntentActionSelector::default();
        let action = selector
            .evaluate(&[candidate("Browse", "/directory", 12)], HOME)
            .unwrap();
        assert_eq!(action.confidence, 1.0);
        assert!(action.score_exceeds_divisor);
    }

    #[tokio::test]
    async fn select_action_navigates_once_and_reports() {
        let driver = RecordingDriver::default();
        let sink = MemorySignalSink::new();
        let emitter = SignalEmitter::new(sink.clone(), "navigation", "intent_selector", RunId::new());
        let mut latch = SelectorLatch::default();
        let selector = IntentActionSelector::default();
        let candidates = vec![candidate("Browse Companies", "/directory", 7)];

        let decision = selector
            .select_action(&candidates, HOME, &driver, &emitter, &mut latch)
            .await
            .unwrap();
        assert!(decision.action().is_some());

        let again = selector
            .select_action(&candidates, HOME, &driver, &emitter, &mut latch)
            .await
            .unwrap();
        assert_eq!(again, IntentDecision::AlreadyEvaluated);

        assert_eq!(
            driver.navigations.lock().clone(),
            vec!["https://example.com/directory".to_string()]
        );
        let taken = sink.of_type(&SignalType::IntentActionTaken);
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].payload["href"], "https://example.com/directory");
        assert_eq!(taken[0].payload["scoreExceedsDivisor"], false);
    }

    #[tokio::test]
    async fn blocked_selection_does_not_navigate() {
        let driver = RecordingDriver::default();
        let sink = MemorySignalSink::new();
        let emitter = SignalEmitter::new(sink.clone(), "navigation", "intent_selector", RunId::new());
        let mut latch = SelectorLatch::default();

        let decision = IntentActionSelector::default()
            .select_action(&[candidate("Login", "/login", -2)], HOME, &driver, &emitter, &mut latch)
            .await
            .unwrap();

        assert!(matches!(decision, IntentDecision::Blocked(GateBlock::ConfidenceBelowThreshold { .. })));
        assert!(driver.navigations.lock().is_empty());
        let blocked = sink.of_type(&SignalType::IntentActionBlocked);
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].payload["reason"], "confidence_below_threshold");
    }
}
