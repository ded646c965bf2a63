//! Product discovery on listing pages.
//!
//! Search results and category pages come from several template revisions.
//! Cards are found with a primary selector and an older fallback; inside a
//! card the product link is found by a prioritized list of selectors. When
//! no card yields anything, every product-looking link on the page is used
//! instead, filtered by display-text length.

use crate::catalog::models::Product;
use crate::catalog::selectors::listing;
use crate::catalog::text::{link_text, non_empty_attr};
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use tracing::{debug, trace};
use url::Url;

/// Parses listing HTML into unpriced, URL-unique product candidates.
pub fn parse_listing_html(html: &str, page_url: &Url) -> Vec<Product> {
    let document = Html::parse_document(html);
    parse_listing(&document, page_url)
}

/// Extracts unpriced, URL-unique product candidates from a listing page.
pub fn parse_listing(document: &Html, page_url: &Url) -> Vec<Product> {
    let mut cards: Vec<ElementRef> = document.select(&listing::CARD).collect();
    if cards.is_empty() {
        cards = document.select(&listing::CARD_FALLBACK).collect();
    }

    let mut products: Vec<Product> =
        cards.into_iter().filter_map(|card| parse_card(card, page_url)).collect();

    if products.is_empty() {
        debug!("No product cards on {}, scanning all product links", page_url);
        products = document
            .select(&listing::PRODUCT_LINK)
            .filter_map(|anchor| product_from_anchor(anchor, page_url))
            .filter(|p| p.name.chars().count() >= listing::MIN_FALLBACK_NAME_LEN)
            .collect();
    }

    dedup_by_url(products)
}

/// Product link of a single card.
fn parse_card(card: ElementRef, page_url: &Url) -> Option<Product> {
    let anchor = listing::CARD_LINKS.iter().find_map(|selector| card.select(selector).next());

    let Some(anchor) = anchor else {
        trace!("Skipping card without a product link");
        return None;
    };

    product_from_anchor(anchor, page_url)
}

fn product_from_anchor(anchor: ElementRef, page_url: &Url) -> Option<Product> {
    let name = link_text(anchor);
    if name.is_empty() {
        return None;
    }

    let href = non_empty_attr(anchor, "href")?;
    let url = match page_url.join(href) {
        Ok(url) => url,
        Err(e) => {
            trace!("Skipping unresolvable href {:?}: {}", href, e);
            return None;
        }
    };

    Some(Product::new(name, url.to_string()))
}

/// Keeps one product per URL: first position, last occurrence's data.
fn dedup_by_url(products: Vec<Product>) -> Vec<Product> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<Product> = Vec::with_capacity(products.len());

    for product in products {
        match index.get(&product.url) {
            Some(&pos) => unique[pos] = product,
            None => {
                index.insert(product.url.clone(), unique.len());
                unique.push(product);
            }
        }
    }

    unique
}
