//! Next-control resolver with ranked history and fallback chain orchestration

use std::time::Instant;

use async_trait::async_trait;
use pagewalk_core_types::{ControlHandle, ControlQuery, ControlRanking, Driver, PageSnapshot, SelectorType};
use pagewalk_signal_sink::{SignalEmitter, SignalType};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::errors::LocatorError;
use crate::strategies::{fallback_chain, Strategy};
use crate::types::*;

/// Everything one resolution borrows from the run.
pub struct ResolveScope<'a> {
    pub driver: &'a dyn Driver,
    pub emitter: &'a SignalEmitter,
    pub stats: &'a mut SelectorStats,
}

/// Next-control resolver trait
#[async_trait]
pub trait NextControlResolver: Send + Sync {
    /// Find the control that advances to the next page.
    async fn resolve(
        &self,
        page: &PageSnapshot,
        rankings: &[ControlRanking],
        scope: &mut ResolveScope<'_>,
    ) -> Result<ResolvedControl, LocatorError>;
}

/// Default resolver: ranked selectors first, then the fixed fallback chain.
pub struct DefaultNextControlResolver {
    fallbacks: Vec<Box<dyn Strategy>>,
}

impl DefaultNextControlResolver {
    pub fn new() -> Self {
        Self {
            fallbacks: fallback_chain(),
        }
    }

    /// Run one lookup and report it. Returns the first actionable handle.
    async fn attempt(
        &self,
        query: &ControlQuery,
        selector_type: SelectorType,
        method_tag: &str,
        scope: &mut ResolveScope<'_>,
    ) -> Option<ControlHandle> {
        let selector = describe_query(query);
        let started = Instant::now();

        let (outcome, handle) = match scope.driver.find_controls(query).await {
            Ok(handles) => {
                let seen_any = !handles.is_empty();
                match handles.into_iter().find(ControlHandle::is_actionable) {
                    Some(handle) => (AttemptOutcome::Found, Some(handle)),
                    None if seen_any => (AttemptOutcome::NotVisible, None),
                    None => (AttemptOutcome::NotFound, None),
                }
            }
            Err(err) => {
                warn!(selector = %selector, %err, "control lookup failed; trying next strategy");
                (AttemptOutcome::Error, None)
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        debug!(
            selector = %selector,
            method = method_tag,
            outcome = outcome.as_str(),
            duration_ms,
            "selector attempt"
        );
        scope.stats.record_attempt(outcome);
        scope.emitter.emit(
            SignalType::SelectorOutcome,
            json!({
                "selector": selector,
                "selectorType": selector_type.name(),
                "methodTag": method_tag,
                "outcome": outcome.as_str(),
                "durationMs": duration_ms,
                "retryCount": 0,
            }),
        );
        handle
    }
}

impl Default for DefaultNextControlResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NextControlResolver for DefaultNextControlResolver {
    async fn resolve(
        &self,
        page: &PageSnapshot,
        rankings: &[ControlRanking],
        scope: &mut ResolveScope<'_>,
    ) -> Result<ResolvedControl, LocatorError> {
        let attempts_before = scope.stats.attempts;

        let mut ranked: Vec<&ControlRanking> = rankings
            .iter()
            .filter(|ranking| is_pagination_selector(&ranking.selector))
            .collect();
        ranked.sort_by_key(|ranking| ranking.historical_rank);
        debug!(
            url = %page.url,
            ranked = ranked.len(),
            total = rankings.len(),
            "resolving next control"
        );

        for ranking in ranked {
            let method_tag = format!("ranked_{}", ranking.selector_type.name());
            let query = ControlQuery::for_ranking(ranking);
            if let Some(handle) = self
                .attempt(&query, ranking.selector_type, &method_tag, scope)
                .await
            {
                info!(
                    selector = %ranking.selector,
                    rank = ranking.historical_rank,
                    method = %method_tag,
                    "next control resolved from history"
                );
                scope.stats.record_resolution(&method_tag);
                return Ok(ResolvedControl {
                    handle,
                    method_tag,
                    selector: ranking.selector.clone(),
                    selector_type: ranking.selector_type,
                });
            }
        }

        for strategy in &self.fallbacks {
            let queries = strategy.queries(page);
            if queries.is_empty() {
                debug!(strategy = strategy.method_tag(), "strategy not applicable");
                continue;
            }
            for query in queries {
                if let Some(handle) = self
                    .attempt(&query, strategy.selector_type(), strategy.method_tag(), scope)
                    .await
                {
                    let method_tag = strategy.method_tag().to_string();
                    info!(method = %method_tag, "next control resolved by fallback");
                    scope.stats.record_resolution(&method_tag);
                    return Ok(ResolvedControl {
                        handle,
                        method_tag,
                        selector: describe_query(&query),
                        selector_type: strategy.selector_type(),
                    });
                }
            }
        }

        scope.stats.record_not_found();
        let attempts = scope.stats.attempts - attempts_before;
        info!(url = %page.url, attempts, "no next control found");
        Err(LocatorError::NotFound { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewalk_core_types::{ClickMode, ControlKind, DriverError, LinkDescriptor, RunId};
    use pagewalk_signal_sink::MemorySignalSink;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Driver answering queries from a fixed table.
    #[derive(Default)]
    struct TableDriver {
        controls: HashMap<ControlQuery, Vec<ControlHandle>>,
        failing: Vec<ControlQuery>,
        asked: Mutex<Vec<ControlQuery>>,
    }

    impl TableDriver {
        fn with(mut self, query: ControlQuery, handle: ControlHandle) -> Self {
            self.controls.entry(query).or_default().push(handle);
            self
        }
    }

    #[async_trait]
    impl Driver for TableDriver {
        async fn navigate(&self, _url: &str) -> Result<(), DriverError> {
            Ok(())
        }

        async fn find_controls(
            &self,
            query: &ControlQuery,
        ) -> Result<Vec<ControlHandle>, DriverError> {
            self.asked.lock().push(query.clone());
            if self.failing.contains(query) {
                return Err(DriverError::Query("detached frame".into()));
            }
            Ok(self.controls.get(query).cloned().unwrap_or_default())
        }

        async fn click(&self, _handle: &ControlHandle, _mode: ClickMode) -> Result<bool, DriverError> {
            Ok(true)
        }

        async fn current_fingerprint(&self) -> Result<String, DriverError> {
            Ok(String::new())
        }

        async fn current_url(&self) -> Result<String, DriverError> {
            Ok(String::new())
        }
    }

    fn page(links: Vec<LinkDescriptor>) -> PageSnapshot {
        PageSnapshot::capture("https://example.com/results", "Results", "rows", links)
    }

    async fn resolve_with(
        driver: &TableDriver,
        page: &PageSnapshot,
        rankings: &[ControlRanking],
    ) -> (Result<ResolvedControl, LocatorError>, SelectorStats, std::sync::Arc<MemorySignalSink>) {
        let sink = MemorySignalSink::new();
        let emitter = SignalEmitter::new(sink.clone(), "navigation", "selector_resolver", RunId::new());
        let mut stats = SelectorStats::default();
        let mut scope = ResolveScope {
            driver,
            emitter: &emitter,
            stats: &mut stats,
        };
        let result = DefaultNextControlResolver::new()
            .resolve(page, rankings, &mut scope)
            .await;
        (result, stats, sink)
    }

    #[tokio::test]
    async fn best_ranked_visible_selector_wins() {
        let driver = TableDriver::default()
            .with(
                ControlQuery::Structural("li.next a".into()),
                ControlHandle::new("ranked-2"),
            )
            .with(
                ControlQuery::Structural("a.pagination-next".into()),
                ControlHandle::new("ranked-1"),
            )
            .with(ControlQuery::RelNext, ControlHandle::new("rel"));
        let rankings = vec![
            ControlRanking::new("li.next a", SelectorType::StructuralQuery, 2),
            ControlRanking::new("a.pagination-next", SelectorType::StructuralQuery, 1),
        ];

        let (result, stats, sink) = resolve_with(&driver, &page(vec![]), &rankings).await;
        let control = result.unwrap();
        assert_eq!(control.handle.id, "ranked-1");
        assert_eq!(control.method_tag, "ranked_structural_query");
        assert_eq!(stats.attempts, 1);
        assert_eq!(sink.of_type(&SignalType::SelectorOutcome).len(), 1);
    }

    #[tokio::test]
    async fn hidden_ranked_control_falls_through_to_next_rank() {
        let mut hidden = ControlHandle::new("hidden");
        hidden.visible = false;
        let driver = TableDriver::default()
            .with(ControlQuery::Structural("a.next-1".into()), hidden)
            .with(
                ControlQuery::Structural("a.next-2".into()),
                ControlHandle::new("shown"),
            );
        let rankings = vec![
            ControlRanking::new("a.next-1", SelectorType::StructuralQuery, 1),
            ControlRanking::new("a.next-2", SelectorType::StructuralQuery, 2),
        ];

        let (result, _, sink) = resolve_with(&driver, &page(vec![]), &rankings).await;
        assert_eq!(result.unwrap().handle.id, "shown");
        let outcomes: Vec<_> = sink
            .of_type(&SignalType::SelectorOutcome)
            .into_iter()
            .map(|s| s.payload["outcome"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(outcomes, vec!["not_visible", "found"]);
    }

    #[tokio::test]
    async fn non_pagination_rankings_are_ignored() {
        let driver = TableDriver::default()
            .with(
                ControlQuery::Structural("div.card a".into()),
                ControlHandle::new("card"),
            )
            .with(ControlQuery::RelNext, ControlHandle::new("rel"));
        let rankings = vec![ControlRanking::new(
            "div.card a",
            SelectorType::StructuralQuery,
            1,
        )];

        let (result, _, _) = resolve_with(&driver, &page(vec![]), &rankings).await;
        let control = result.unwrap();
        assert_eq!(control.handle.id, "rel");
        assert_eq!(control.method_tag, "rel_next");
        assert!(!driver
            .asked
            .lock()
            .contains(&ControlQuery::Structural("div.card a".into())));
    }

    #[tokio::test]
    async fn driver_errors_are_absorbed() {
        let mut driver = TableDriver::default().with(
            ControlQuery::AccessibilityLabel("next".into()),
            ControlHandle::new("aria"),
        );
        driver.failing.push(ControlQuery::RelNext);

        let (result, stats, _) = resolve_with(&driver, &page(vec![]), &[]).await;
        assert_eq!(result.unwrap().method_tag, "aria_next");
        assert_eq!(stats.errors, 1);
    }

    #[tokio::test]
    async fn buttons_are_preferred_over_links_for_text_match() {
        let driver = TableDriver::default()
            .with(
                ControlQuery::ExactText {
                    text: "Next".into(),
                    kind: ControlKind::Link,
                },
                ControlHandle::new("link"),
            )
            .with(
                ControlQuery::ExactText {
                    text: "More".into(),
                    kind: ControlKind::Button,
                },
                ControlHandle::new("button"),
            );

        let (result, _, _) = resolve_with(&driver, &page(vec![]), &[]).await;
        let control = result.unwrap();
        assert_eq!(control.handle.id, "button");
        assert_eq!(control.method_tag, "text_next");
    }

    #[tokio::test]
    async fn page_number_fallback_uses_active_marker() {
        let driver = TableDriver::default().with(
            ControlQuery::ExactText {
                text: "5".into(),
                kind: ControlKind::Link,
            },
            ControlHandle::new("page-5"),
        );
        let snapshot = page(vec![LinkDescriptor::new("4", "?p=4").with_class("active")]);

        let (result, _, _) = resolve_with(&driver, &snapshot, &[]).await;
        let control = result.unwrap();
        assert_eq!(control.handle.id, "page-5");
        assert_eq!(control.selector_type, SelectorType::OrdinalPageNumber);
    }

    #[tokio::test]
    async fn exhausted_chain_reports_not_found_and_every_attempt() {
        let driver = TableDriver::default();
        let (result, stats, sink) = resolve_with(&driver, &page(vec![]), &[]).await;

        let expected_attempts = 1 + 1 + (NEXT_TEXT_VARIANTS.len() as u32 * 2);
        assert_eq!(
            result.unwrap_err(),
            LocatorError::NotFound {
                attempts: expected_attempts
            }
        );
        assert_eq!(stats.not_found, 1);
        assert_eq!(
            sink.of_type(&SignalType::SelectorOutcome).len() as u32,
            expected_attempts
        );
    }
}
