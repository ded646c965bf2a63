//! CSS selectors for catalog HTML parsing.
//!
//! This file contains all CSS selectors used for parsing listing and product
//! pages. The storefront is OpenCart-based; template revisions move things
//! around, so most lookups are ordered fallbacks rather than single selectors.
//!
//! **Update process**: When parsing fails, run with `--debug`, inspect the
//! dumped HTML, update selectors here, and add a test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for search-result and category listing pages.
pub mod listing {
    use super::*;

    /// Primary product card container.
    pub static CARD: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.product-thumb").unwrap());

    /// Card container used by older templates.
    pub static CARD_FALLBACK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.product-layout").unwrap());

    /// Anchors inside a card, highest priority first.
    pub static CARD_LINKS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        [
            ".caption h4 a",
            ".caption h3 a",
            "h4 a",
            "h3 a",
            "a[href*='/product/']",
            "a[href*='route=product/product']",
        ]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
    });

    /// Page-wide scan for anything that links to a product detail page.
    pub static PRODUCT_LINK: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "a[href*='/product/'], \
             a[href*='route=product/product']",
        )
        .unwrap()
    });

    /// Minimum link text length for the page-wide scan (filters menu noise).
    pub const MIN_FALLBACK_NAME_LEN: usize = 8;
}

/// Selectors for pagination controls.
pub mod pagination {
    use super::*;

    /// Pagination container.
    pub static CONTAINER: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("ul.pagination").unwrap());

    /// Any anchor.
    pub static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

    /// Visible text of the "next page" link.
    pub const NEXT_GLYPH: &str = ">";
}

/// Selectors for product detail pages.
pub mod product {
    use super::*;

    /// Discounted price in OpenCart's special-price markup.
    pub static PRICE_NEW: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".price-new").unwrap());

    /// Struck-through price next to `PRICE_NEW`.
    pub static PRICE_OLD: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".price-old").unwrap());

    /// Generic regions that usually hold a visible price.
    pub static PRICE_REGION: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            ".price, \
             p.price, \
             .product-price, \
             .list-unstyled, \
             .price-box, \
             .product-info",
        )
        .unwrap()
    });

    /// Embedded schema.org payloads.
    pub static JSON_LD: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("script[type='application/ld+json']").unwrap());

    /// Open Graph price meta tag.
    pub static META_PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='product:price:amount']").unwrap());

    /// Microdata price.
    pub static ITEMPROP_PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[itemprop='price']").unwrap());
}

/// Page-level selectors shared by both page kinds.
pub mod page {
    use super::*;

    /// Document title.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        // Force evaluation of all lazy selectors to ensure they compile
        let _ = &*listing::CARD;
        let _ = &*listing::CARD_FALLBACK;
        let _ = &*listing::CARD_LINKS;
        let _ = &*listing::PRODUCT_LINK;
        let _ = &*pagination::CONTAINER;
        let _ = &*pagination::LINK;
        let _ = &*product::PRICE_NEW;
        let _ = &*product::PRICE_OLD;
        let _ = &*product::PRICE_REGION;
        let _ = &*product::JSON_LD;
        let _ = &*product::META_PRICE;
        let _ = &*product::ITEMPROP_PRICE;
        let _ = &*page::TITLE;
    }

    #[test]
    fn test_card_links_priority_count() {
        assert_eq!(listing::CARD_LINKS.len(), 6);
    }

    #[test]
    fn test_product_link_matches_both_url_styles() {
        let html = Html::parse_document(
            r#"<a href="/product/42">Seo style</a>
               <a href="index.php?route=product/product&product_id=42">Query style</a>
               <a href="/category/ssd">Category</a>"#,
        );

        let links: Vec<_> = html.select(&listing::PRODUCT_LINK).collect();
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_json_ld_selector() {
        let html = Html::parse_document(
            r#"<script type="application/ld+json">{}</script>
               <script type="text/javascript">var x = 1;</script>"#,
        );

        assert_eq!(html.select(&product::JSON_LD).count(), 1);
    }
}
