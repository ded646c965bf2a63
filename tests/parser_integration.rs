//! Integration tests for listing and product page parsing using fixture files.

use mdc_crawler::catalog::listing::parse_listing_html;
use mdc_crawler::catalog::pagination::resolve_next_html;
use mdc_crawler::{PriceExtractor, PricePair};
use url::Url;

const SEARCH_FIXTURE: &str = include_str!("fixtures/search_result.html");
const DISCOUNT_FIXTURE: &str = include_str!("fixtures/product_discount.html");
const JSONLD_FIXTURE: &str = include_str!("fixtures/product_jsonld.html");

fn search_page_url() -> Url {
    Url::parse("https://mdcomputers.in/?route=product%2Fsearch&search=external+harddrive").unwrap()
}

#[test]
fn test_parse_search_results() {
    let products = parse_listing_html(SEARCH_FIXTURE, &search_page_url());

    // Four cards, one of them a repeat of the first URL
    assert_eq!(products.len(), 3);

    // Repeated URL keeps its first position but takes the later card's name
    assert_eq!(products[0].url, "https://mdcomputers.in/product/seagate-expansion-2tb");
    assert_eq!(products[0].name, "Seagate Expansion 2TB (Renewed listing)");

    // Relative href resolved against the search page
    assert_eq!(products[1].name, "WD Elements 1TB Portable");
    assert_eq!(
        products[1].url,
        "https://mdcomputers.in/index.php?route=product/product&product_id=1042&search=external+harddrive"
    );

    // Multi-line link text collapses to single spaces
    assert_eq!(products[2].name, "Toshiba Canvio Basics 1TB");
    assert_eq!(products[2].url, "https://mdcomputers.in/product/toshiba-canvio-basics-1tb");

    // Listing prices are never trusted
    assert!(products.iter().all(|p| p.price_current.is_none() && p.price_old.is_none()));
}

#[test]
fn test_menu_links_ignored_when_cards_exist() {
    let products = parse_listing_html(SEARCH_FIXTURE, &search_page_url());
    assert!(products.iter().all(|p| !p.url.ends_with("/product/offers")));
}

#[test]
fn test_search_pagination() {
    assert_eq!(
        resolve_next_html(SEARCH_FIXTURE, &search_page_url()).as_deref(),
        Some("https://mdcomputers.in/index.php?route=product/search&search=external%20harddrive&page=2")
    );
}

#[test]
fn test_parse_empty_results() {
    let html = r#"
        <html>
        <body>
            <div id="content"><p>There is no product that matches the search criteria.</p></div>
        </body>
        </html>
    "#;

    assert!(parse_listing_html(html, &search_page_url()).is_empty());
    assert!(resolve_next_html(html, &search_page_url()).is_none());
}

#[test]
fn test_product_discount_prices() {
    let prices = PriceExtractor::default().extract_from_html(DISCOUNT_FIXTURE);
    assert_eq!(prices, PricePair::new(Some("5,499".into()), Some("7,999".into())));
}

#[test]
fn test_product_structured_data_price() {
    let prices = PriceExtractor::default().extract_from_html(JSONLD_FIXTURE);
    assert_eq!(prices, PricePair::current_only("4199"));
}

#[test]
fn test_product_without_price() {
    let html = "<html><head><title>Coming soon</title></head><body><h1>Coming soon</h1></body></html>";
    assert_eq!(PriceExtractor::default().extract_from_html(html), PricePair::none());
}
