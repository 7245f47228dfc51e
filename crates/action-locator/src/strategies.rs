//! Fallback strategies for locating the next-page control
//!
//! Tried in fixed order once no ranked selector matched:
//! 1. RelNext - anchor carrying `rel="next"`
//! 2. AriaNext - accessible label containing "next"
//! 3. TextNext - exact visible text from a fixed list, buttons before links
//! 4. PageNumber - link numbered one past the active page

use pagewalk_core_types::{ControlKind, ControlQuery, PageSnapshot, SelectorType};

use crate::types::{ACTIVE_PAGE_MARKERS, NEXT_TEXT_VARIANTS};

/// A fallback strategy expands into the live queries it wants tried, in order.
pub trait Strategy: Send + Sync {
    fn method_tag(&self) -> &'static str;

    fn selector_type(&self) -> SelectorType;

    fn queries(&self, page: &PageSnapshot) -> Vec<ControlQuery>;
}

/// `a[rel="next"]`
pub struct RelNextStrategy;

impl Strategy for RelNextStrategy {
    fn method_tag(&self) -> &'static str {
        "rel_next"
    }

    fn selector_type(&self) -> SelectorType {
        SelectorType::StructuralQuery
    }

    fn queries(&self, _page: &PageSnapshot) -> Vec<ControlQuery> {
        vec![ControlQuery::RelNext]
    }
}

/// Accessible label containing "next", case folded by the driver.
pub struct AriaNextStrategy;

impl Strategy for AriaNextStrategy {
    fn method_tag(&self) -> &'static str {
        "aria_next"
    }

    fn selector_type(&self) -> SelectorType {
        SelectorType::AccessibilityLabel
    }

    fn queries(&self, _page: &PageSnapshot) -> Vec<ControlQuery> {
        vec![ControlQuery::AccessibilityLabel("next".to_string())]
    }
}

/// Exact visible text, every button variant before any link variant.
pub struct TextNextStrategy;

impl Strategy for TextNextStrategy {
    fn method_tag(&self) -> &'static str {
        "text_next"
    }

    fn selector_type(&self) -> SelectorType {
        SelectorType::TextMatch
    }

    fn queries(&self, _page: &PageSnapshot) -> Vec<ControlQuery> {
        [ControlKind::Button, ControlKind::Link]
            .into_iter()
            .flat_map(|kind| {
                NEXT_TEXT_VARIANTS.iter().map(move |text| ControlQuery::ExactText {
                    text: (*text).to_string(),
                    kind,
                })
            })
            .collect()
    }
}

/// Link whose text is the active page number plus one.
pub struct PageNumberStrategy;

impl Strategy for PageNumberStrategy {
    fn method_tag(&self) -> &'static str {
        "page_number"
    }

    fn selector_type(&self) -> SelectorType {
        SelectorType::OrdinalPageNumber
    }

    fn queries(&self, page: &PageSnapshot) -> Vec<ControlQuery> {
        match active_page_number(page).and_then(|current| current.checked_add(1)) {
            Some(next) => vec![ControlQuery::ExactText {
                text: next.to_string(),
                kind: ControlKind::Link,
            }],
            None => Vec::new(),
        }
    }
}

/// Page number of the first numbered link marked active or current.
pub fn active_page_number(page: &PageSnapshot) -> Option<u32> {
    page.links.iter().find_map(|link| {
        let marked = link.css_classes.iter().any(|class| {
            let class = class.to_ascii_lowercase();
            ACTIVE_PAGE_MARKERS
                .iter()
                .any(|marker| class.contains(marker))
        });
        if !marked {
            return None;
        }
        link.text.trim().parse::<u32>().ok()
    })
}

/// Fallback chain in evaluation order.
pub fn fallback_chain() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(RelNextStrategy),
        Box::new(AriaNextStrategy),
        Box::new(TextNextStrategy),
        Box::new(PageNumberStrategy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewalk_core_types::LinkDescriptor;

    fn pager(links: Vec<LinkDescriptor>) -> PageSnapshot {
        PageSnapshot::capture("https://example.com/list", "List", "body", links)
    }

    #[test]
    fn text_strategy_tries_buttons_first() {
        let queries = TextNextStrategy.queries(&pager(vec![]));
        assert_eq!(queries.len(), NEXT_TEXT_VARIANTS.len() * 2);
        assert_eq!(
            queries[0],
            ControlQuery::ExactText {
                text: "Next".into(),
                kind: ControlKind::Button
            }
        );
        assert_eq!(
            queries[NEXT_TEXT_VARIANTS.len()],
            ControlQuery::ExactText {
                text: "Next".into(),
                kind: ControlKind::Link
            }
        );
    }

    #[test]
    fn active_page_is_read_from_class_markers() {
        let page = pager(vec![
            LinkDescriptor::new("1", "?page=1"),
            LinkDescriptor::new(" 2 ", "?page=2").with_class("pager-item--Current"),
            LinkDescriptor::new("3", "?page=3"),
        ]);
        assert_eq!(active_page_number(&page), Some(2));
        assert_eq!(
            PageNumberStrategy.queries(&page),
            vec![ControlQuery::ExactText {
                text: "3".into(),
                kind: ControlKind::Link
            }]
        );
    }

    #[test]
    fn last_representable_page_has_no_successor() {
        let page = pager(vec![LinkDescriptor::new("4294967295", "?page=4294967295").with_class("active")]);
        assert_eq!(active_page_number(&page), Some(u32::MAX));
        assert!(PageNumberStrategy.queries(&page).is_empty());
    }

    #[test]
    fn page_number_strategy_is_empty_without_marker() {
        let page = pager(vec![LinkDescriptor::new("2", "?page=2")]);
        assert!(PageNumberStrategy.queries(&page).is_empty());
    }

    #[test]
    fn chain_order_is_fixed() {
        let tags: Vec<_> = fallback_chain().iter().map(|s| s.method_tag()).collect();
        assert_eq!(tags, vec!["rel_next", "aria_next", "text_next", "page_number"]);
    }
}
