//! Driver and inspector backed by a recorded site

use async_trait::async_trait;
use pagewalk_core_types::{
    ClickMode, ControlHandle, ControlKind, ControlQuery, Driver, DriverError, ExtractRequest,
    ExtractedItem, InspectError, PageInspector, PageSnapshot,
};
use parking_lot::Mutex;
use tracing::debug;

use crate::model::*;

/// Interaction the fixture observed, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    Navigate(String),
    Click { control: String, mode: ClickMode },
}

#[derive(Default)]
struct BrowserState {
    current: Option<usize>,
    events: Vec<BrowserEvent>,
}

/// Plays a [`SiteFixture`] back through the [`Driver`] and [`PageInspector`] ports.
pub struct FixtureBrowser {
    site: SiteFixture,
    state: Mutex<BrowserState>,
}

impl FixtureBrowser {
    pub fn new(site: SiteFixture) -> Self {
        Self {
            site,
            state: Mutex::new(BrowserState::default()),
        }
    }

    pub fn site(&self) -> &SiteFixture {
        &self.site
    }

    pub fn events(&self) -> Vec<BrowserEvent> {
        self.state.lock().events.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                BrowserEvent::Navigate(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clicks(&self) -> Vec<(String, ClickMode)> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                BrowserEvent::Click { control, mode } => Some((control.clone(), *mode)),
                _ => None,
            })
            .collect()
    }

    /// Number of driver calls that touched the page.
    pub fn interaction_count(&self) -> usize {
        self.state.lock().events.len()
    }

    fn current_page(&self) -> Result<&FixturePage, DriverError> {
        let index = self.state.lock().current.ok_or(DriverError::Closed)?;
        self.site.pages.get(index).ok_or(DriverError::Closed)
    }

    fn page_for(&self, url: &str) -> Result<&FixturePage, InspectError> {
        self.site
            .page_index(url)
            .and_then(|index| self.site.pages.get(index))
            .ok_or_else(|| InspectError::Snapshot {
                url: url.to_string(),
                reason: "page not recorded".to_string(),
            })
    }
}

fn matches(control: &FixtureControl, query: &ControlQuery) -> bool {
    match query {
        ControlQuery::Structural(selector) => control.selectors.iter().any(|s| s == selector),
        ControlQuery::Path(xpath) => control.xpaths.iter().any(|x| x == xpath),
        ControlQuery::AccessibilityLabel(needle) => control
            .aria_label
            .as_deref()
            .map(|label| label.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
        ControlQuery::ExactText { text, kind } => {
            control.text == *text && (*kind == ControlKind::Any || *kind == control.kind)
        }
        ControlQuery::RelNext => {
            control.kind == ControlKind::Link && control.rel.as_deref() == Some("next")
        }
    }
}

#[async_trait]
impl Driver for FixtureBrowser {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.events.push(BrowserEvent::Navigate(url.to_string()));
        let index = self.site.page_index(url).ok_or_else(|| DriverError::Navigation {
            url: url.to_string(),
            reason: "page not recorded".to_string(),
        })?;
        state.current = Some(index);
        debug!(url, "fixture navigated");
        Ok(())
    }

    async fn find_controls(&self, query: &ControlQuery) -> Result<Vec<ControlHandle>, DriverError> {
        let page = self.current_page()?;
        Ok(page
            .controls
            .iter()
            .filter(|control| matches(control, query))
            .map(|control| ControlHandle {
                id: control.id.clone(),
                visible: control.visible,
                enabled: control.enabled,
            })
            .collect())
    }

    async fn click(&self, handle: &ControlHandle, mode: ClickMode) -> Result<bool, DriverError> {
        let page = self.current_page()?;
        let control = page
            .controls
            .iter()
            .find(|control| control.id == handle.id)
            .ok_or_else(|| DriverError::Click {
                handle: handle.id.clone(),
                reason: "control detached".to_string(),
            })?;

        let mut state = self.state.lock();
        state.events.push(BrowserEvent::Click {
            control: control.id.clone(),
            mode,
        });

        if control.scripted_only && mode == ClickMode::Direct {
            return Ok(false);
        }
        if control.dead {
            return Ok(true);
        }
        if let Some(target) = &control.target {
            let index = self.site.page_index(target).ok_or_else(|| DriverError::Click {
                handle: handle.id.clone(),
                reason: format!("target {target} not recorded"),
            })?;
            state.current = Some(index);
        }
        Ok(true)
    }

    async fn current_fingerprint(&self) -> Result<String, DriverError> {
        Ok(self.current_page()?.fingerprint())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.current_page()?.url.clone())
    }
}

#[async_trait]
impl PageInspector for FixtureBrowser {
    async fn snapshot(&self, url: &str) -> Result<PageSnapshot, InspectError> {
        let page = self.page_for(url)?;
        if page.fail_snapshot {
            return Err(InspectError::Snapshot {
                url: url.to_string(),
                reason: "inspector crashed".to_string(),
            });
        }
        let mut snapshot = PageSnapshot::capture(
            page.url.clone(),
            page.title.clone(),
            &page.body,
            page.links.clone(),
        );
        snapshot.content_fingerprint = page.fingerprint();
        Ok(snapshot)
    }

    async fn extract_items(
        &self,
        snapshot: &PageSnapshot,
        _request: &ExtractRequest,
    ) -> Result<Vec<ExtractedItem>, InspectError> {
        let page = self.page_for(&snapshot.url)?;
        if page.fail_extraction {
            return Err(InspectError::Extraction(format!(
                "extraction failed on {}",
                snapshot.url
            )));
        }
        Ok(page.items.clone())
    }
}
