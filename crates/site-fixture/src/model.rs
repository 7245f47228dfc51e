//! Recorded site description

use std::path::Path;

use pagewalk_core_types::{content_fingerprint, ControlKind, ExtractedItem, LinkDescriptor};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::FixtureError;

/// A set of pages and the controls that move between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFixture {
    #[serde(default)]
    pub pages: Vec<FixturePage>,
}

impl SiteFixture {
    pub fn new(pages: Vec<FixturePage>) -> Self {
        Self { pages }
    }

    /// Parse YAML (or JSON, which YAML accepts).
    pub fn from_yaml_str(source: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    pub fn page_index(&self, url: &str) -> Option<usize> {
        self.pages.iter().position(|page| same_url(&page.url, url))
    }
}

/// One recorded page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixturePage {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Forces the content fingerprint, e.g. to model identical content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub links: Vec<LinkDescriptor>,
    #[serde(default)]
    pub controls: Vec<FixtureControl>,
    #[serde(default)]
    pub items: Vec<ExtractedItem>,
    #[serde(default)]
    pub fail_extraction: bool,
    #[serde(default)]
    pub fail_snapshot: bool,
}

impl FixturePage {
    pub fn new(url: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_link(mut self, link: LinkDescriptor) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_control(mut self, control: FixtureControl) -> Self {
        self.controls.push(control);
        self
    }

    pub fn with_item(mut self, item: ExtractedItem) -> Self {
        self.items.push(item);
        self
    }

    /// `count` items whose hrefs are derived from `prefix`.
    pub fn with_items(mut self, prefix: &str, count: usize) -> Self {
        for n in 0..count {
            let href = format!("{prefix}/{n}");
            self.items
                .push(ExtractedItem::with_href(href).with_field("name", format!("{prefix} #{n}")));
        }
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn failing_extraction(mut self) -> Self {
        self.fail_extraction = true;
        self
    }

    pub fn failing_snapshot(mut self) -> Self {
        self.fail_snapshot = true;
        self
    }

    pub fn fingerprint(&self) -> String {
        self.fingerprint
            .clone()
            .unwrap_or_else(|| content_fingerprint(&self.title, &self.body))
    }
}

/// A clickable element on a recorded page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureControl {
    pub id: String,
    #[serde(default = "default_kind")]
    pub kind: ControlKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub aria_label: Option<String>,
    #[serde(default)]
    pub rel: Option<String>,
    /// CSS selectors that match this control
    #[serde(default)]
    pub selectors: Vec<String>,
    #[serde(default)]
    pub xpaths: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Page a delivered click lands on
    #[serde(default)]
    pub target: Option<String>,
    /// Direct clicks are swallowed; only scripted clicks get through
    #[serde(default)]
    pub scripted_only: bool,
    /// Clicks are delivered but nothing happens
    #[serde(default)]
    pub dead: bool,
}

fn default_kind() -> ControlKind {
    ControlKind::Link
}

fn default_true() -> bool {
    true
}

impl FixtureControl {
    pub fn link(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ControlKind::Link,
            text: text.into(),
            aria_label: None,
            rel: None,
            selectors: Vec::new(),
            xpaths: Vec::new(),
            visible: true,
            enabled: true,
            target: None,
            scripted_only: false,
            dead: false,
        }
    }

    pub fn button(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: ControlKind::Button,
            ..Self::link(id, text)
        }
    }

    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn rel_next(mut self) -> Self {
        self.rel = Some("next".to_string());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    pub fn with_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpaths.push(xpath.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn scripted_only(mut self) -> Self {
        self.scripted_only = true;
        self
    }

    pub fn dead(mut self) -> Self {
        self.dead = true;
        self
    }
}

/// URLs compare after parsing so `https://a.test` equals `https://a.test/`.
pub(crate) fn same_url(left: &str, right: &str) -> bool {
    match (Url::parse(left.trim()), Url::parse(right.trim())) {
        (Ok(left), Ok(right)) => left == right,
        _ => left.trim() == right.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_fixture_fills_defaults() {
        let fixture = SiteFixture::from_yaml_str(
            r#"
pages:
  - url: https://shop.test/list
    title: Listing
    body: page one
    controls:
      - id: next
        text: Next
        rel: next
        target: https://shop.test/list?page=2
    items:
      - href: /p/1
        fields: { name: Widget }
"#,
        )
        .unwrap();

        let page = &fixture.pages[0];
        let control = &page.controls[0];
        assert_eq!(control.kind, ControlKind::Link);
        assert!(control.visible && control.enabled);
        assert!(!control.scripted_only);
        assert_eq!(page.items[0].fields["name"], "Widget");
        assert_eq!(page.fingerprint(), content_fingerprint("Listing", "page one"));
    }

    #[test]
    fn fixtures_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.yaml");
        std::fs::write(&path, "pages:\n  - url: https://shop.test/\n    title: Home\n").unwrap();
        let fixture = SiteFixture::load(&path).unwrap();
        assert_eq!(fixture.pages.len(), 1);

        let missing = SiteFixture::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(missing, FixtureError::Read { .. }));
    }

    #[test]
    fn pages_are_found_by_normalised_url() {
        let fixture = SiteFixture::new(vec![FixturePage::new("https://shop.test", "Home", "")]);
        assert_eq!(fixture.page_index("https://shop.test/"), Some(0));
        assert_eq!(fixture.page_index("https://shop.test/other"), None);
    }
}
