//! Catalog crawling: HTTP client, page parsing, price extraction, and the
//! crawl loop that ties them together.

pub mod client;
pub mod crawl;
pub mod listing;
pub mod models;
pub mod normalize;
pub mod pagination;
pub mod price;
pub mod selectors;
pub mod text;

pub use client::{CatalogClient, CatalogFetch, FetchError, Page};
pub use crawl::{search_url, Crawl, CrawlSettings, CrawlState};
pub use models::{PricePair, Product};
pub use normalize::normalize_prices;
pub use price::PriceExtractor;
