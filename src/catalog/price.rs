//! Price extraction for product detail pages.
//!
//! Product pages are not uniform: some use OpenCart's special-price markup,
//! some only print a price inside a generic block, some only carry it in
//! JSON-LD or meta tags. [`PriceExtractor`] runs an ordered list of
//! strategies and takes the first one that finds something.

use crate::catalog::models::PricePair;
use crate::catalog::selectors::product;
use crate::catalog::text::{element_text, non_empty_attr};
use anyhow::{Context, Result};
use regex_lite::Regex;
use scraper::Html;
use serde_json::Value;
use tracing::trace;

/// Currency marker used by the default storefront.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

type Strategy = fn(&PriceExtractor, &Html) -> Option<PricePair>;

/// Strategies in priority order.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("discount markup", PriceExtractor::from_discount_markup),
    ("price region", PriceExtractor::from_price_regions),
    ("json-ld offer", PriceExtractor::from_structured_data),
    ("meta attribute", PriceExtractor::from_meta),
];

/// Locates current/old prices on a product page.
#[derive(Debug, Clone)]
pub struct PriceExtractor {
    symbol: String,
    amount_re: Regex,
}

impl PriceExtractor {
    /// Creates an extractor for amounts written after `symbol`.
    pub fn new(symbol: &str) -> Result<Self> {
        let pattern = format!(r"{}\s*([\d,]+)", regex_lite::escape(symbol));
        let amount_re = Regex::new(&pattern)
            .with_context(|| format!("Invalid currency symbol: {}", symbol))?;

        Ok(Self { symbol: symbol.to_string(), amount_re })
    }

    /// Parses a page and extracts its price.
    pub fn extract_from_html(&self, html: &str) -> PricePair {
        let document = Html::parse_document(html);
        self.extract(&document)
    }

    /// Runs the strategy cascade over a parsed page.
    pub fn extract(&self, document: &Html) -> PricePair {
        for (name, strategy) in STRATEGIES {
            if let Some(prices) = strategy(self, document) {
                trace!("Price found via {}: {:?}", name, prices);
                return prices;
            }
        }

        PricePair::none()
    }

    /// Finds every amount in `text`.
    ///
    /// One amount is the current price. With two or more, the last is taken
    /// as current and the first as old, matching the usual "struck-through
    /// price first" layout. That is a guess about document order, not
    /// something the markup promises.
    pub fn parse_amounts(&self, text: &str) -> PricePair {
        let amounts: Vec<&str> = self
            .amount_re
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect();

        match amounts.as_slice() {
            [] => PricePair::none(),
            [only] => PricePair::current_only(*only),
            [first, .., last] => PricePair::new(Some(last.to_string()), Some(first.to_string())),
        }
    }

    /// Some templates render only the digits; put the marker back.
    fn with_symbol(&self, text: &str) -> String {
        if text.contains(&self.symbol) {
            text.to_string()
        } else {
            format!("{}{}", self.symbol, text)
        }
    }

    /// `.price-new` / `.price-old`, each parsed on its own.
    ///
    /// A page with `.price-new` is settled here even when it holds no amount
    /// (e.g. "Out of stock"); an old price is never kept without a current one.
    fn from_discount_markup(&self, document: &Html) -> Option<PricePair> {
        let new_el = document.select(&product::PRICE_NEW).next()?;
        let amounts = self.parse_amounts(&self.with_symbol(&element_text(new_el)));
        let Some(current) = amounts.current else {
            return Some(PricePair::none());
        };

        let old = document
            .select(&product::PRICE_OLD)
            .next()
            .and_then(|el| self.parse_amounts(&self.with_symbol(&element_text(el))).current);

        Some(PricePair::new(Some(current), old).normalized())
    }

    /// First generic price block that contains an amount.
    fn from_price_regions(&self, document: &Html) -> Option<PricePair> {
        document
            .select(&product::PRICE_REGION)
            .map(|el| self.parse_amounts(&element_text(el)))
            .find(PricePair::is_found)
            .map(PricePair::normalized)
    }

    /// schema.org `offers.price` from JSON-LD.
    fn from_structured_data(&self, document: &Html) -> Option<PricePair> {
        document
            .select(&product::JSON_LD)
            .find_map(|script| {
                let payload = script.text().collect::<String>();
                match serde_json::from_str::<Value>(payload.trim()) {
                    Ok(data) => offer_price(&data),
                    Err(e) => {
                        trace!("Skipping malformed JSON-LD payload: {}", e);
                        None
                    }
                }
            })
            .map(PricePair::current_only)
    }

    /// `product:price:amount` meta tag, then `itemprop="price"`.
    fn from_meta(&self, document: &Html) -> Option<PricePair> {
        if let Some(content) = document
            .select(&product::META_PRICE)
            .next()
            .and_then(|el| non_empty_attr(el, "content"))
        {
            return Some(PricePair::current_only(content));
        }

        let element = document.select(&product::ITEMPROP_PRICE).next()?;
        if let Some(content) = non_empty_attr(element, "content") {
            return Some(PricePair::current_only(content));
        }

        let prices = self.parse_amounts(&element_text(element));
        prices.is_found().then(|| prices.normalized())
    }
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL).expect("Failed to build default price pattern")
    }
}

/// First `offers.price` in a JSON-LD payload. The payload and its `offers`
/// may each be a single object or an array.
fn offer_price(data: &Value) -> Option<String> {
    let nodes: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    nodes.into_iter().filter_map(|node| node.get("offers")).find_map(|offers| match offers {
        Value::Array(list) => list.iter().find_map(price_field),
        single => price_field(single),
    })
}

/// `price` of one offer; empty strings and zero are treated as missing.
fn price_field(offer: &Value) -> Option<String> {
    match offer.get("price")? {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(String::from),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PriceExtractor {
        PriceExtractor::default()
    }

    fn pair(current: Option<&str>, old: Option<&str>) -> PricePair {
        PricePair::new(current.map(String::from), old.map(String::from))
    }

    // Amount parsing

    #[test]
    fn test_parse_amounts_none() {
        assert_eq!(extractor().parse_amounts(""), PricePair::none());
        assert_eq!(extractor().parse_amounts("Call for price"), PricePair::none());
        assert_eq!(extractor().parse_amounts("$1,200"), PricePair::none());
    }

    #[test]
    fn test_parse_amounts_single() {
        assert_eq!(extractor().parse_amounts("Price: ₹4,250"), pair(Some("4,250"), None));
        assert_eq!(extractor().parse_amounts("₹  999 incl. GST"), pair(Some("999"), None));
    }

    #[test]
    fn test_parse_amounts_two_is_last_then_first() {
        assert_eq!(extractor().parse_amounts("₹1,200 ₹999"), pair(Some("999"), Some("1,200")));
        assert_eq!(extractor().parse_amounts("₹999 ₹1,200"), pair(Some("1,200"), Some("999")));
    }

    #[test]
    fn test_parse_amounts_many_ignores_middle() {
        let prices = extractor().parse_amounts("₹5,000 ₹4,000 ₹3,000 ₹2,000");
        assert_eq!(prices, pair(Some("2,000"), Some("5,000")));
    }

    #[test]
    fn test_parse_amounts_then_normalize() {
        let prices = extractor().parse_amounts("₹1,200 ₹999").normalized();
        assert_eq!(prices, pair(Some("999"), Some("1,200")));

        let prices = extractor().parse_amounts("₹999 ₹1,200").normalized();
        assert_eq!(prices, pair(Some("999"), Some("1,200")));
    }

    #[test]
    fn test_custom_symbol() {
        let extractor = PriceExtractor::new("$").unwrap();
        assert_eq!(extractor.parse_amounts("$1,299 $999"), pair(Some("999"), Some("1,299")));
        assert_eq!(extractor.parse_amounts("₹999"), PricePair::none());
    }

    // Strategies

    #[test]
    fn test_discount_markup() {
        let html = r#"<html><body>
            <ul class="list-unstyled">
                <li><span class="price-old">₹1,499</span></li>
                <li><h2 class="price-new">₹999</h2></li>
            </ul>
        </body></html>"#;

        assert_eq!(extractor().extract_from_html(html), pair(Some("999"), Some("1,499")));
    }

    #[test]
    fn test_discount_markup_digits_only() {
        let html = r#"<span class="price-new">2,999</span><span class="price-old">3,499</span>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("2,999"), Some("3,499")));
    }

    #[test]
    fn test_discount_markup_swapped_classes_are_normalized() {
        let html = r#"<span class="price-new">₹3,499</span><span class="price-old">₹2,999</span>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("2,999"), Some("3,499")));
    }

    #[test]
    fn test_discount_markup_without_old() {
        let html = r#"<span class="price-new">₹749</span>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("749"), None));
    }

    #[test]
    fn test_discount_markup_without_amount_stops_cascade() {
        let html = r#"<span class="price-new">Out of stock</span>
                      <span class="price-old">₹1,499</span>
                      <p class="price">₹1,200</p>
                      <meta property="product:price:amount" content="1200">"#;
        assert_eq!(extractor().extract_from_html(html), PricePair::none());
    }

    #[test]
    fn test_price_region_with_two_amounts() {
        let html = r#"<div class="product-price">MRP ₹12,000 Offer ₹10,500</div>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("10,500"), Some("12,000")));
    }

    #[test]
    fn test_price_region_skips_blocks_without_amounts() {
        let html = r#"
            <ul class="list-unstyled"><li>Brand: Seagate</li></ul>
            <p class="price">₹5,499</p>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("5,499"), None));
    }

    #[test]
    fn test_json_ld_single_offer() {
        let html = r#"<script type="application/ld+json">
            {"@type": "Product", "name": "SSD", "offers": {"@type": "Offer", "price": " 3299 "}}
        </script>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("3299"), None));
    }

    #[test]
    fn test_json_ld_offer_list_and_numeric_price() {
        let html = r#"<script type="application/ld+json">
            [{"@type": "BreadcrumbList"},
             {"@type": "Product", "offers": [{"price": ""}, {"price": 4599}]}]
        </script>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("4599"), None));
    }

    #[test]
    fn test_json_ld_malformed_is_skipped() {
        let html = r#"
            <script type="application/ld+json">{"offers": {"price": </script>
            <script type="application/ld+json">{"offers": {"price": "899"}}</script>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("899"), None));
    }

    #[test]
    fn test_json_ld_zero_price_is_missing() {
        let html = r#"<script type="application/ld+json">{"offers": {"price": 0}}</script>"#;
        assert_eq!(extractor().extract_from_html(html), PricePair::none());
    }

    #[test]
    fn test_meta_price() {
        let html = r#"<head><meta property="product:price:amount" content=" 1499.00 "></head>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("1499.00"), None));
    }

    #[test]
    fn test_itemprop_content_then_text() {
        let html = r#"<span itemprop="price" content="2100">Rs. 2,100</span>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("2100"), None));

        let html = r#"<span itemprop="price">₹2,400 ₹2,100</span>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("2,100"), Some("2,400")));
    }

    #[test]
    fn test_itemprop_without_amount() {
        let html = r#"<span itemprop="price">Ask us</span>"#;
        assert_eq!(extractor().extract_from_html(html), PricePair::none());
    }

    #[test]
    fn test_strategy_priority() {
        // Discount markup beats JSON-LD and meta.
        let html = r#"
            <script type="application/ld+json">{"offers": {"price": "1"}}</script>
            <meta property="product:price:amount" content="2">
            <span class="price-new">₹3</span>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("3"), None));

        // Visible region beats JSON-LD.
        let html = r#"
            <script type="application/ld+json">{"offers": {"price": "1"}}</script>
            <div class="price-box">₹5</div>"#;
        assert_eq!(extractor().extract_from_html(html), pair(Some("5"), None));
    }

    #[test]
    fn test_no_price_anywhere() {
        let html = r#"<html><head><title>Product</title></head><body><h1>SSD</h1></body></html>"#;
        assert_eq!(extractor().extract_from_html(html), PricePair::none());
    }
}
