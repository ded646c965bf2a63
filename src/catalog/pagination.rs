//! "Next page" link resolution.

use crate::catalog::selectors::pagination;
use crate::catalog::text::{link_text, non_empty_attr};
use scraper::{ElementRef, Html};
use url::Url;

/// Parses listing HTML and resolves its next-page URL.
pub fn resolve_next_html(html: &str, page_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    resolve_next(&document, page_url)
}

/// Absolute URL of the "next page" link, if the page has one.
///
/// Looks inside `ul.pagination` when the page has one; otherwise any link
/// on the page whose text is exactly the next glyph. A container with no
/// qualifying link ends pagination: the rest of the page is not scanned.
pub fn resolve_next(document: &Html, page_url: &Url) -> Option<String> {
    match document.select(&pagination::CONTAINER).next() {
        Some(container) => find_next(container.select(&pagination::LINK), page_url),
        None => find_next(document.select(&pagination::LINK), page_url),
    }
}

fn find_next<'a>(
    mut links: impl Iterator<Item = ElementRef<'a>>,
    page_url: &Url,
) -> Option<String> {
    links.find_map(|a| {
        if link_text(a) != pagination::NEXT_GLYPH {
            return None;
        }
        let href = non_empty_attr(a, "href")?;
        page_url.join(href).ok().map(String::from)
    })
}
