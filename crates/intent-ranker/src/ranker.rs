//! Heuristic link ranking against a free-text goal

use pagewalk_core_types::{is_placeholder_href, resolve_href, LinkDescriptor, PageSnapshot};
use tracing::debug;

use crate::keywords::{keyword_stem, GoalKeywordExtractor};
use crate::models::*;

/// Scores a page's outbound links. Pure: identical input, identical output.
#[derive(Clone, Default)]
pub struct IntentRanker {
    weights: RankerWeights,
    extractor: GoalKeywordExtractor,
}

impl IntentRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: RankerWeights) -> Self {
        Self {
            weights,
            extractor: GoalKeywordExtractor::new(),
        }
    }

    pub fn weights(&self) -> &RankerWeights {
        &self.weights
    }

    /// Candidates sorted by score, highest first; ties keep page order.
    pub fn rank(&self, goal: &str, page: &PageSnapshot) -> Vec<Candidate> {
        let keywords = self.extractor.extract(goal);
        let page_host = page.host();

        let mut candidates: Vec<Candidate> = page
            .links
            .iter()
            .filter(|link| is_rankable(link))
            .map(|link| self.score_link(link, &keywords, &page.url, page_host.as_deref()))
            .collect();
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            url = %page.url,
            links = page.links.len(),
            candidates = candidates.len(),
            keywords = keywords.len(),
            top_score = candidates.first().map(|c| c.score),
            "ranked navigation candidates"
        );
        candidates
    }

    fn score_link(
        &self,
        link: &LinkDescriptor,
        keywords: &[String],
        base_url: &str,
        page_host: Option<&str>,
    ) -> Candidate {
        let w = &self.weights;
        let text = link.text.trim().to_lowercase();
        let href = link.href.trim().to_lowercase();
        let aria = link
            .aria_label
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        let mut score = 0;
        let mut signals = Vec::new();

        if let Some(keyword) = first_contained(&text, DIRECTORY_TEXT_KEYWORDS) {
            score += w.directory_text;
            signals.push(format!("directory_text:{keyword}"));
        }
        if let Some(pattern) = first_contained(&href, DIRECTORY_PATH_PATTERNS) {
            score += w.directory_path;
            signals.push(format!("directory_path:{pattern}"));
        }
        if let Some(keyword) = first_contained(&text, NAVIGATION_TEXT_KEYWORDS) {
            score += w.navigation_text;
            signals.push(format!("navigation_text:{keyword}"));
        }
        if let Some(hint) = first_contained(&aria, ARIA_HINTS) {
            score += w.aria_hint;
            signals.push(format!("aria_hint:{hint}"));
        }

        let mut matched = 0usize;
        for keyword in keywords {
            let stem = keyword_stem(keyword);
            if text.contains(stem) || href.contains(stem) {
                matched += 1;
                score += w.goal_keyword;
                signals.push(format!("goal_keyword:{keyword}"));
            }
        }

        let link_host = resolve_href(base_url, &link.href)
            .and_then(|url| url.host_str().map(|host| host.to_ascii_lowercase()));
        if let (Some(page_host), Some(link_host)) = (page_host, link_host.as_deref()) {
            if page_host != link_host {
                score += w.external_host;
                signals.push(format!("external_host:{link_host}"));
            }
        }

        let utility_class = link.css_classes.iter().find_map(|class| {
            let class = class.to_lowercase();
            UTILITY_CLASSES
                .iter()
                .find(|marker| class.contains(*marker))
                .copied()
        });
        if let Some(marker) = utility_class {
            score += w.utility_class;
            signals.push(format!("utility_class:{marker}"));
        }

        let excluded = first_contained(&text, EXCLUDED_TERMS)
            .or_else(|| first_contained(&href, EXCLUDED_TERMS))
            .or_else(|| link_host.as_deref().and_then(social_domain));
        if let Some(term) = excluded {
            score += w.excluded_term;
            signals.push(format!("excluded_term:{term}"));
        }

        let relevance = if keywords.is_empty() {
            0.0
        } else {
            (matched as f64 / keywords.len() as f64).min(1.0)
        };

        Candidate {
            link: link.clone(),
            score,
            signals,
            relevance,
        }
    }
}

/// Links with nothing to read or nowhere to go never become candidates.
fn is_rankable(link: &LinkDescriptor) -> bool {
    let has_label = !link.text.trim().is_empty()
        || link
            .aria_label
            .as_deref()
            .map(|label| !label.trim().is_empty())
            .unwrap_or(false);
    has_label && !is_placeholder_href(&link.href)
}

/// Social domain the host belongs to, matched on label boundaries.
fn social_domain(host: &str) -> Option<&'static str> {
    SOCIAL_DOMAINS
        .iter()
        .find(|domain| {
            host == **domain
                || host
                    .strip_suffix(**domain)
                    .map(|prefix| prefix.ends_with('.'))
                    .unwrap_or(false)
        })
        .copied()
}

fn first_contained(haystack: &str, needles: &[&'static str]) -> Option<&'static str> {
    needles.iter().find(|needle| haystack.contains(*needle)).copied()
}
