//! Read-only page model produced by the external inspector.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Number of leading body characters that take part in the content fingerprint.
pub const FINGERPRINT_TEXT_CHARS: usize = 512;

/// Immutable per-page view handed to the core once per visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub content_fingerprint: String,
    #[serde(default)]
    pub links: Vec<LinkDescriptor>,
}

impl PageSnapshot {
    /// Build a snapshot and derive its fingerprint from title and leading text.
    pub fn capture(
        url: impl Into<String>,
        title: impl Into<String>,
        leading_text: &str,
        links: Vec<LinkDescriptor>,
    ) -> Self {
        let title = title.into();
        let content_fingerprint = content_fingerprint(&title, leading_text);
        Self {
            url: url.into(),
            title,
            content_fingerprint,
            links,
        }
    }

    /// Host of the page URL, lower-cased.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.to_ascii_lowercase()))
    }
}

/// One outbound link (or link-like control) on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDescriptor {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub aria_label: Option<String>,
    #[serde(default, alias = "cssClassList")]
    pub css_classes: Vec<String>,
}

impl LinkDescriptor {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.css_classes.push(class.into());
        self
    }

    /// Whether the href can be followed at all.
    pub fn has_followable_href(&self) -> bool {
        !is_placeholder_href(&self.href)
    }
}

/// Hash over title and leading body text, used to detect revisited pages.
pub fn content_fingerprint(title: &str, body_text: &str) -> String {
    let normalized = body_text.split_whitespace().collect::<Vec<_>>().join(" ");
    let leading: String = normalized.chars().take(FINGERPRINT_TEXT_CHARS).collect();

    let mut hasher = Sha256::new();
    hasher.update(title.trim().as_bytes());
    hasher.update(b"\n");
    hasher.update(leading.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Empty, `#`-only and `javascript:` hrefs lead nowhere.
pub fn is_placeholder_href(href: &str) -> bool {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return true;
    }
    trimmed.to_ascii_lowercase().starts_with("javascript:")
}

/// Resolve a possibly relative href against the page it was found on.
pub fn resolve_href(base: &str, href: &str) -> Option<Url> {
    if is_placeholder_href(href) {
        return None;
    }
    match Url::parse(href.trim()) {
        Ok(url) => Some(url),
        Err(_) => Url::parse(base).ok()?.join(href.trim()).ok(),
    }
}

/// URL with query string and fragment removed.
pub fn strip_query(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_query(None);
    stripped.set_fragment(None);
    stripped
}
