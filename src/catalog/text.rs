//! Text helpers shared by the page parsers.

use crate::catalog::selectors::page;
use scraper::{ElementRef, Html};

/// Visible text of an element: text nodes trimmed, empty ones dropped,
/// joined with a single space.
pub fn element_text(element: ElementRef) -> String {
    element.text().map(str::trim).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Link display text with all internal whitespace collapsed.
pub fn link_text(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Non-empty, trimmed attribute value.
pub fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).map(str::trim).filter(|v| !v.is_empty())
}

/// Document `<title>`, if present and non-empty.
pub fn page_title(document: &Html) -> Option<String> {
    document
        .select(&page::TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}
