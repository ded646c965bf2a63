//! mdc-crawler - Search-driven product and price crawler
//!
//! Pages through a catalog's search results, visits every product page, and
//! extracts current and pre-discount prices with layered fallbacks.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod format;

pub use catalog::{Crawl, CrawlSettings, PriceExtractor, PricePair, Product};
pub use config::Config;
