//! Per-run mutable state

use std::collections::HashSet;

use action_gate::SelectorLatch;
use action_locator::SelectorStats;
use pagewalk_core_types::{resolve_href, ExtractedItem, RunId};
use tokio_util::sync::CancellationToken;

use crate::errors::FlowError;
use crate::types::CollectedItem;

/// State owned by exactly one run. Nothing here is shared, so nothing is locked.
pub struct RunContext {
    run_id: RunId,
    seen_fingerprints: HashSet<String>,
    seen_hrefs: HashSet<String>,
    items: Vec<CollectedItem>,
    pages_visited: u32,
    last_error: Option<String>,
    cancel: CancellationToken,

    /// Resolver tally, reported once per run
    pub selector_stats: SelectorStats,

    /// Guards the single intent evaluation
    pub intent_latch: SelectorLatch,
}

impl RunContext {
    pub fn new(run_id: RunId, cancel: CancellationToken) -> Self {
        Self {
            run_id,
            seen_fingerprints: HashSet::new(),
            seen_hrefs: HashSet::new(),
            items: Vec::new(),
            pages_visited: 0,
            last_error: None,
            cancel,
            selector_stats: SelectorStats::default(),
            intent_latch: SelectorLatch::default(),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `false` if this content was already seen in the run.
    pub fn remember_fingerprint(&mut self, fingerprint: &str) -> bool {
        self.seen_fingerprints.insert(fingerprint.to_string())
    }

    /// Count a page as visited and return its 1-based index.
    pub fn record_page_visit(&mut self) -> u32 {
        self.pages_visited += 1;
        self.pages_visited
    }

    pub fn pages_visited(&self) -> u32 {
        self.pages_visited
    }

    /// Keep items whose href was not collected before. Items without an href
    /// are always kept. Returns the number of items added.
    pub fn absorb_items(&mut self, page_index: u32, source_url: &str, items: Vec<ExtractedItem>) -> u64 {
        let mut added = 0;
        for item in items {
            if let Some(href) = item.href.as_deref() {
                let key = resolve_href(source_url, href)
                    .map(|url| url.to_string())
                    .unwrap_or_else(|| href.trim().to_string());
                if !self.seen_hrefs.insert(key) {
                    continue;
                }
            }
            self.items.push(CollectedItem {
                item,
                page_index,
                source_url: source_url.to_string(),
            });
            added += 1;
        }
        added
    }

    pub fn items(&self) -> &[CollectedItem] {
        &self.items
    }

    pub fn take_items(&mut self) -> Vec<CollectedItem> {
        std::mem::take(&mut self.items)
    }

    pub fn record_error(&mut self, error: &FlowError) {
        self.last_error = Some(error.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
