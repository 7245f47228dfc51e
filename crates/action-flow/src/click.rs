//! Click delivery with navigation confirmation

use std::time::Instant;

use action_locator::{AttemptOutcome, ResolvedControl};
use pagewalk_core_types::{ClickMode, Driver, DriverError};
use pagewalk_signal_sink::{SignalEmitter, SignalType};
use serde_json::json;
use tracing::{debug, info, warn};

pub const DEFAULT_CLICK_ATTEMPTS: u32 = 3;

/// How one click attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickResult {
    /// URL or content changed
    Navigated,
    /// The driver reported the click as not delivered
    NotDelivered,
    /// Click delivered, page unchanged
    Unchanged,
    Error,
}

impl ClickResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClickResult::Navigated => "navigated",
            ClickResult::NotDelivered => "not_delivered",
            ClickResult::Unchanged => "unchanged",
            ClickResult::Error => "error",
        }
    }

    fn outcome(&self) -> AttemptOutcome {
        match self {
            ClickResult::Navigated => AttemptOutcome::Found,
            ClickResult::NotDelivered => AttemptOutcome::NotVisible,
            ClickResult::Unchanged => AttemptOutcome::NotFound,
            ClickResult::Error => AttemptOutcome::Error,
        }
    }
}

/// Result of a full click sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Navigated { attempts: u32, mode: ClickMode },
    Exhausted { attempts: u32 },
}

/// Bounded click retries alternating delivery modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRetryPolicy {
    modes: Vec<ClickMode>,
}

impl ClickRetryPolicy {
    /// `attempts` clicks alternating direct and scripted, starting direct.
    pub fn with_attempts(attempts: u32) -> Self {
        let modes = (0..attempts.max(1))
            .map(|n| if n % 2 == 0 { ClickMode::Direct } else { ClickMode::Scripted })
            .collect();
        Self { modes }
    }

    pub fn attempts(&self) -> u32 {
        self.modes.len() as u32
    }

    pub fn modes(&self) -> &[ClickMode] {
        &self.modes
    }

    /// Click until the page moves or attempts run out. Each attempt is
    /// reported as a `selector_outcome` with its retry count.
    pub async fn click_through(
        &self,
        control: &ResolvedControl,
        driver: &dyn Driver,
        emitter: &SignalEmitter,
    ) -> ClickOutcome {
        for (retry, mode) in self.modes.iter().copied().enumerate() {
            let started = Instant::now();
            let result = match click_once(control, mode, driver).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        control = %control.handle.id,
                        mode = mode.name(),
                        retryable = err.is_retryable(),
                        %err,
                        "click attempt failed"
                    );
                    ClickResult::Error
                }
            };
            let duration_ms = started.elapsed().as_millis() as u64;

            debug!(
                control = %control.handle.id,
                mode = mode.name(),
                retry,
                result = result.as_str(),
                "click attempt"
            );
            emitter.emit(
                SignalType::SelectorOutcome,
                json!({
                    "selector": control.selector,
                    "selectorType": control.selector_type.name(),
                    "methodTag": control.method_tag,
                    "outcome": result.outcome().as_str(),
                    "clickMode": mode.name(),
                    "clickResult": result.as_str(),
                    "durationMs": duration_ms,
                    "retryCount": retry,
                }),
            );

            if result == ClickResult::Navigated {
                let attempts = retry as u32 + 1;
                info!(method = %control.method_tag, attempts, "navigation confirmed");
                return ClickOutcome::Navigated { attempts, mode };
            }
        }

        warn!(
            control = %control.handle.id,
            attempts = self.attempts(),
            "click never changed the page"
        );
        ClickOutcome::Exhausted {
            attempts: self.attempts(),
        }
    }
}

impl Default for ClickRetryPolicy {
    fn default() -> Self {
        Self::with_attempts(DEFAULT_CLICK_ATTEMPTS)
    }
}

async fn click_once(
    control: &ResolvedControl,
    mode: ClickMode,
    driver: &dyn Driver,
) -> Result<ClickResult, DriverError> {
    let url_before = driver.current_url().await?;
    let fingerprint_before = driver.current_fingerprint().await?;

    if !driver.click(&control.handle, mode).await? {
        return Ok(ClickResult::NotDelivered);
    }

    let url_after = driver.current_url().await?;
    let fingerprint_after = driver.current_fingerprint().await?;
    if url_after != url_before || fingerprint_after != fingerprint_before {
        Ok(ClickResult::Navigated)
    } else {
        Ok(ClickResult::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewalk_core_types::{ControlHandle, RunId, SelectorType};
    use pagewalk_signal_sink::MemorySignalSink;
    use site_fixture::{FixtureBrowser, FixtureControl, FixturePage, SiteFixture};

    const ONE: &str = "https://shop.test/list";
    const TWO: &str = "https://shop.test/list?page=2";

    fn control(id: &str) -> ResolvedControl {
        ResolvedControl {
            handle: ControlHandle::new(id),
            method_tag: "rel_next".to_string(),
            selector: "a[rel=\"next\"]".to_string(),
            selector_type: SelectorType::StructuralQuery,
        }
    }

    async fn browser_with(next: FixtureControl) -> FixtureBrowser {
        let browser = FixtureBrowser::new(SiteFixture::new(vec![
            FixturePage::new(ONE, "List", "one").with_control(next),
            FixturePage::new(TWO, "List", "two"),
        ]));
        browser.navigate(ONE).await.unwrap();
        browser
    }

    #[test]
    fn default_policy_alternates_modes() {
        assert_eq!(
            ClickRetryPolicy::default().modes(),
            &[ClickMode::Direct, ClickMode::Scripted, ClickMode::Direct]
        );
        assert_eq!(ClickRetryPolicy::with_attempts(0).attempts(), 1);
    }

    #[tokio::test]
    async fn first_direct_click_navigates() {
        let browser = browser_with(FixtureControl::link("next", "Next").to(TWO)).await;
        let outcome = ClickRetryPolicy::default()
            .click_through(&control("next"), &browser, &SignalEmitter::disabled())
            .await;
        assert_eq!(
            outcome,
            ClickOutcome::Navigated {
                attempts: 1,
                mode: ClickMode::Direct
            }
        );
    }

    #[tokio::test]
    async fn scripted_retry_gets_through() {
        let browser = browser_with(FixtureControl::link("next", "Next").scripted_only().to(TWO)).await;
        let sink = MemorySignalSink::new();
        let emitter = SignalEmitter::new(sink.clone(), "navigation", "click", RunId::new());

        let outcome = ClickRetryPolicy::default()
            .click_through(&control("next"), &browser, &emitter)
            .await;

        assert_eq!(
            outcome,
            ClickOutcome::Navigated {
                attempts: 2,
                mode: ClickMode::Scripted
            }
        );
        let outcomes = sink.of_type(&SignalType::SelectorOutcome);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].payload["clickResult"], "not_delivered");
        assert_eq!(outcomes[1].payload["retryCount"], 1);
        assert_eq!(outcomes[1].payload["outcome"], "found");
    }

    #[tokio::test]
    async fn dead_control_exhausts_attempts() {
        let browser = browser_with(FixtureControl::link("next", "Next").dead()).await;
        let sink = MemorySignalSink::new();
        let emitter = SignalEmitter::new(sink.clone(), "navigation", "click", RunId::new());

        let outcome = ClickRetryPolicy::default()
            .click_through(&control("next"), &browser, &emitter)
            .await;

        assert_eq!(outcome, ClickOutcome::Exhausted { attempts: 3 });
        let modes: Vec<ClickMode> = browser.clicks().into_iter().map(|(_, mode)| mode).collect();
        assert_eq!(modes, vec![ClickMode::Direct, ClickMode::Scripted, ClickMode::Direct]);
        let retries: Vec<u64> = sink
            .of_type(&SignalType::SelectorOutcome)
            .iter()
            .filter_map(|signal| signal.payload["retryCount"].as_u64())
            .collect();
        assert_eq!(retries, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn click_errors_consume_attempts() {
        let browser = browser_with(FixtureControl::link("next", "Next").to(TWO)).await;
        let outcome = ClickRetryPolicy::default()
            .click_through(&control("detached"), &browser, &SignalEmitter::disabled())
            .await;
        assert_eq!(outcome, ClickOutcome::Exhausted { attempts: 3 });
    }
}
