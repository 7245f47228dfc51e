//! Capability ports for the collaborators the core drives but does not own.
//!
//! The browser driver is borrowed exclusively by one run; every call is
//! awaited before the next one is issued.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DriverError, InspectError, RankingStoreError};
use crate::page::PageSnapshot;
use crate::ranking::{ControlRanking, SelectorType};

/// Element family a text query is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Button,
    Link,
    Any,
}

/// Query understood by [`Driver::find_controls`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum ControlQuery {
    /// CSS selector
    Structural(String),
    /// XPath expression
    Path(String),
    /// Clickable element whose accessible label contains the needle, ignoring case
    AccessibilityLabel(String),
    /// Clickable element whose visible text equals `text` exactly
    ExactText { text: String, kind: ControlKind },
    /// Anchor carrying `rel="next"`
    RelNext,
}

impl ControlQuery {
    /// Translate a historical ranking into a live query.
    pub fn for_ranking(ranking: &ControlRanking) -> Self {
        let selector = ranking.selector.clone();
        match ranking.selector_type {
            SelectorType::StructuralQuery => ControlQuery::Structural(selector),
            SelectorType::PathQuery => ControlQuery::Path(selector),
            SelectorType::AccessibilityLabel => ControlQuery::AccessibilityLabel(selector),
            SelectorType::TextMatch => ControlQuery::ExactText {
                text: selector,
                kind: ControlKind::Any,
            },
            SelectorType::OrdinalPageNumber => ControlQuery::ExactText {
                text: selector,
                kind: ControlKind::Link,
            },
        }
    }
}

/// Opaque reference to a live control. Only the two flags are meaningful to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlHandle {
    pub id: String,
    pub visible: bool,
    pub enabled: bool,
}

impl ControlHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: true,
            enabled: true,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// How a click is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    /// Native pointer interaction
    Direct,
    /// Script-dispatched click, bypassing overlays and hit testing
    Scripted,
}

impl ClickMode {
    pub fn name(&self) -> &'static str {
        match self {
            ClickMode::Direct => "direct",
            ClickMode::Scripted => "scripted",
        }
    }
}

/// What the caller wants extracted from each page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub page_type: String,
    #[serde(default)]
    pub expected_fields: Vec<String>,
}

/// One structured record pulled out of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl ExtractedItem {
    pub fn with_href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Browser automation capability.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn find_controls(&self, query: &ControlQuery) -> Result<Vec<ControlHandle>, DriverError>;

    /// Returns `false` when the interaction was not delivered.
    async fn click(&self, handle: &ControlHandle, mode: ClickMode) -> Result<bool, DriverError>;

    async fn current_fingerprint(&self) -> Result<String, DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;
}

/// DOM inspection capability.
#[async_trait]
pub trait PageInspector: Send + Sync {
    async fn snapshot(&self, url: &str) -> Result<PageSnapshot, InspectError>;

    async fn extract_items(
        &self,
        snapshot: &PageSnapshot,
        request: &ExtractRequest,
    ) -> Result<Vec<ExtractedItem>, InspectError>;
}

/// Source of prior-run control rankings.
#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Rankings sorted by `historical_rank`; empty when nothing was recorded.
    async fn load(&self) -> Result<Vec<ControlRanking>, RankingStoreError>;
}
