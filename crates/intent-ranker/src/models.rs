//! Candidate and weight models

use pagewalk_core_types::LinkDescriptor;
use serde::{Deserialize, Serialize};

/// Outbound link scored against a goal. Recomputed on every ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub link: LinkDescriptor,
    pub score: i32,
    pub signals: Vec<String>,
    /// Share of goal keywords matched, 0..=1
    pub relevance: f64,
}

/// Additive scoring weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RankerWeights {
    pub directory_text: i32,
    pub directory_path: i32,
    pub navigation_text: i32,
    pub aria_hint: i32,
    pub goal_keyword: i32,
    pub external_host: i32,
    pub utility_class: i32,
    pub excluded_term: i32,
}

impl Default for RankerWeights {
    fn default() -> Self {
        Self {
            directory_text: 3,
            directory_path: 3,
            navigation_text: 2,
            aria_hint: 2,
            goal_keyword: 1,
            external_host: -3,
            utility_class: -2,
            excluded_term: -2,
        }
    }
}

pub const DIRECTORY_TEXT_KEYWORDS: &[&str] = &[
    "directory",
    "listing",
    "browse",
    "catalog",
    "companies",
    "vendors",
    "businesses",
    "suppliers",
    "members",
];

pub const DIRECTORY_PATH_PATTERNS: &[&str] = &[
    "/directory",
    "/list",
    "/companies",
    "/vendors",
    "/catalog",
    "/browse",
    "/businesses",
    "/search",
    "/results",
];

pub const NAVIGATION_TEXT_KEYWORDS: &[&str] = &[
    "next",
    "more",
    "view all",
    "see all",
    "show more",
    "load more",
    "continue",
    "page",
];

pub const ARIA_HINTS: &[&str] = &["result", "page", "navigation"];

pub const UTILITY_CLASSES: &[&str] = &["footer", "nav-utility", "sidebar", "menu"];

pub const EXCLUDED_TERMS: &[&str] = &[
    "login", "sign", "account", "cart", "checkout", "privacy", "terms", "contact", "about",
];

pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "instagram.com",
    "youtube.com",
    "tiktok.com",
    "pinterest.com",
];
