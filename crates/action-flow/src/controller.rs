//! Pagination state machine

use std::sync::Arc;

use action_locator::{DefaultNextControlResolver, LocatorError, NextControlResolver, ResolveScope};
use mission_gate::{BudgetVerdict, MissionGate, StopReason};
use pagewalk_core_types::{ControlRanking, Driver, ExtractRequest, PageInspector, PageSnapshot};
use pagewalk_signal_sink::SignalEmitter;
use tracing::{debug, info, warn};

use crate::click::{ClickOutcome, ClickRetryPolicy};
use crate::context::RunContext;
use crate::errors::FlowError;
use crate::types::PaginationOutcome;

/// Where the loop is for the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum PaginationState {
    /// About to look at the current page; the snapshot may be supplied
    Visiting { snapshot: Option<PageSnapshot> },
    /// Snapshot taken, not yet extracted
    Extracted { snapshot: PageSnapshot },
    /// Page extracted, looking for the next control
    AdvancePending { snapshot: PageSnapshot },
    /// Click confirmed a new page
    Advanced,
    Stopped(StopReason),
}

impl PaginationState {
    pub fn name(&self) -> &'static str {
        match self {
            PaginationState::Visiting { .. } => "visiting",
            PaginationState::Extracted { .. } => "extracted",
            PaginationState::AdvancePending { .. } => "advance_pending",
            PaginationState::Advanced => "advanced",
            PaginationState::Stopped(_) => "stopped",
        }
    }
}

/// The driver and inspector one run borrows.
#[derive(Clone, Copy)]
pub struct PagePorts<'a> {
    pub driver: &'a dyn Driver,
    pub inspector: &'a dyn PageInspector,
}

/// Inputs that stay fixed across the pages of a run.
pub struct PaginationJob<'a> {
    pub request: &'a ExtractRequest,
    pub rankings: &'a [ControlRanking],
    pub max_pages: u32,
}

/// Drives extract, resolve, click until something says stop.
pub struct PaginationController {
    resolver: Arc<dyn NextControlResolver>,
    click_policy: ClickRetryPolicy,
}

impl PaginationController {
    pub fn new(resolver: Arc<dyn NextControlResolver>, click_policy: ClickRetryPolicy) -> Self {
        Self {
            resolver,
            click_policy,
        }
    }

    pub fn with_click_policy(mut self, policy: ClickRetryPolicy) -> Self {
        self.click_policy = policy;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn NextControlResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn click_policy(&self) -> &ClickRetryPolicy {
        &self.click_policy
    }

    /// Run the loop from the current page. Items land in `ctx`.
    pub async fn run(
        &self,
        ports: PagePorts<'_>,
        job: &PaginationJob<'_>,
        ctx: &mut RunContext,
        gate: &mut MissionGate,
        emitter: &SignalEmitter,
        initial: Option<PageSnapshot>,
    ) -> PaginationOutcome {
        let mut state = PaginationState::Visiting { snapshot: initial };
        let mut pagination_detected = false;
        let mut pagination_method: Option<String> = None;

        let stop_reason = loop {
            debug!(state = state.name(), pages = ctx.pages_visited(), "pagination step");
            state = match state {
                PaginationState::Visiting { snapshot } => {
                    if ctx.is_cancelled() {
                        info!(pages = ctx.pages_visited(), "run cancelled at page checkpoint");
                        PaginationState::Stopped(StopReason::Cancelled)
                    } else {
                        match snapshot {
                            Some(snapshot) => PaginationState::Extracted { snapshot },
                            None => match capture(ports).await {
                                Ok(snapshot) => PaginationState::Extracted { snapshot },
                                Err(err) => {
                                    warn!(%err, "page snapshot failed");
                                    ctx.record_error(&err);
                                    PaginationState::Stopped(StopReason::ExtractionError)
                                }
                            },
                        }
                    }
                }

                PaginationState::Extracted { snapshot } => {
                    self.extract(ports, job, ctx, gate, snapshot).await
                }

                PaginationState::AdvancePending { snapshot } => {
                    let mut scope = ResolveScope {
                        driver: ports.driver,
                        emitter,
                        stats: &mut ctx.selector_stats,
                    };
                    match self.resolver.resolve(&snapshot, job.rankings, &mut scope).await {
                        Err(LocatorError::NotFound { attempts }) => {
                            debug!(attempts, url = %snapshot.url, "no next control");
                            PaginationState::Stopped(StopReason::NoNext)
                        }
                        Ok(control) => {
                            pagination_detected = true;
                            pagination_method = Some(control.method_tag.clone());
                            match self
                                .click_policy
                                .click_through(&control, ports.driver, emitter)
                                .await
                            {
                                ClickOutcome::Navigated { .. } => PaginationState::Advanced,
                                ClickOutcome::Exhausted { attempts } => {
                                    warn!(attempts, url = %snapshot.url, "navigation not confirmed");
                                    PaginationState::Stopped(StopReason::NavigationFailed)
                                }
                            }
                        }
                    }
                }

                PaginationState::Advanced => PaginationState::Visiting { snapshot: None },

                PaginationState::Stopped(reason) => break reason,
            };
        };

        info!(
            reason = %stop_reason,
            pages = ctx.pages_visited(),
            items = ctx.items().len(),
            method = pagination_method.as_deref().unwrap_or("none"),
            "pagination stopped"
        );
        PaginationOutcome {
            stop_reason,
            pages_visited: ctx.pages_visited(),
            pagination_detected,
            pagination_method,
        }
    }

    async fn extract(
        &self,
        ports: PagePorts<'_>,
        job: &PaginationJob<'_>,
        ctx: &mut RunContext,
        gate: &mut MissionGate,
        snapshot: PageSnapshot,
    ) -> PaginationState {
        if !ctx.remember_fingerprint(&snapshot.content_fingerprint) {
            info!(url = %snapshot.url, "content already seen in this run");
            return PaginationState::Stopped(StopReason::Duplicate);
        }

        let items = match ports.inspector.extract_items(&snapshot, job.request).await {
            Ok(items) => items,
            Err(err) => {
                let err = FlowError::from(err);
                warn!(url = %snapshot.url, %err, "item extraction failed");
                ctx.record_error(&err);
                return PaginationState::Stopped(StopReason::ExtractionError);
            }
        };

        let page_index = ctx.record_page_visit();
        let added = ctx.absorb_items(page_index, &snapshot.url, items);
        debug!(url = %snapshot.url, page_index, added, "page extracted");
        gate.record_page(added);

        if let BudgetVerdict::Stop(decision) = gate.checkpoint() {
            return PaginationState::Stopped(decision.reason);
        }
        if ctx.pages_visited() >= job.max_pages {
            return PaginationState::Stopped(StopReason::MaxPages);
        }
        PaginationState::AdvancePending { snapshot }
    }
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(
            Arc::new(DefaultNextControlResolver::new()),
            ClickRetryPolicy::default(),
        )
    }
}

async fn capture(ports: PagePorts<'_>) -> Result<PageSnapshot, FlowError> {
    let url = ports.driver.current_url().await?;
    Ok(ports.inspector.snapshot(&url).await?)
}
