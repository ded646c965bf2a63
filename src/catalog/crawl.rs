//! Search crawl: listing pages → product pages → priced records.
//!
//! A [`Crawl`] is pulled one record at a time with [`Crawl::next`]. Nothing
//! is fetched until the caller asks, so stopping early is just dropping the
//! value. Each crawl owns its visited sets; a finished crawl stays finished.

use crate::catalog::client::{CatalogFetch, Page};
use crate::catalog::listing::parse_listing;
use crate::catalog::models::{PricePair, Product};
use crate::catalog::pagination::resolve_next;
use crate::catalog::price::PriceExtractor;
use crate::catalog::text::page_title;
use crate::config::Config;
use anyhow::{Context, Result};
use scraper::Html;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use url::Url;

/// Builds the first listing URL for a search term.
pub fn search_url(base_url: &str, term: &str) -> Result<String> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("route", "product/search")
        .append_pair("search", term);
    Ok(url.into())
}

/// Timing and diagnostics knobs for a crawl.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Pause before fetching the next listing page
    pub page_delay: Duration,
    /// Pause between product fetches
    pub product_delay: Duration,
    /// Save listing pages that yield no products
    pub debug: bool,
    /// Where those pages are saved
    pub dump_path: PathBuf,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_delay: Duration::from_millis(config.page_delay_ms),
            product_delay: Duration::from_millis(config.product_delay_ms),
            debug: config.debug,
            dump_path: config.debug_dump_path.clone(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// URLs seen during one crawl. Both sets only grow.
#[derive(Debug, Default)]
pub struct CrawlState {
    visited_pages: HashSet<String>,
    visited_products: HashSet<String>,
}

impl CrawlState {
    /// Listing pages already fetched.
    pub fn visited_pages(&self) -> &HashSet<String> {
        &self.visited_pages
    }

    /// Product pages already fetched and emitted.
    pub fn visited_products(&self) -> &HashSet<String> {
        &self.visited_products
    }
}

/// What one listing page contributed.
struct ListingPage {
    products: Vec<Product>,
    next: Option<String>,
    title: Option<String>,
}

/// A lazy, single-use crawl over a search's listing pages.
pub struct Crawl<'c, C: CatalogFetch + ?Sized> {
    client: &'c C,
    extractor: PriceExtractor,
    settings: CrawlSettings,
    state: CrawlState,
    next_url: Option<String>,
    pending: VecDeque<Product>,
    after_pending: Option<String>,
    throttle_due: bool,
    finished: bool,
}

impl<'c, C: CatalogFetch + ?Sized> Crawl<'c, C> {
    /// Starts a crawl of the search results for `term`.
    pub fn new(
        client: &'c C,
        term: &str,
        extractor: PriceExtractor,
        settings: CrawlSettings,
    ) -> Result<Self> {
        let start = search_url(client.base_url(), term)?;
        info!("Searching for {:?}: {}", term, start);
        Ok(Self::starting_at(client, start, extractor, settings))
    }

    /// Starts a crawl at an arbitrary listing page, such as a category.
    pub fn starting_at(
        client: &'c C,
        start_url: impl Into<String>,
        extractor: PriceExtractor,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            client,
            extractor,
            settings,
            state: CrawlState::default(),
            next_url: Some(start_url.into()),
            pending: VecDeque::new(),
            after_pending: None,
            throttle_due: false,
            finished: false,
        }
    }

    /// Visited URLs so far.
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Returns true once the crawl has ended, normally or on error.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Produces the next priced product.
    ///
    /// `None` means the crawl is over. A fetch failure is returned once as
    /// `Some(Err(_))`, after which the crawl is over as well.
    pub async fn next(&mut self) -> Option<Result<Product>> {
        if self.finished {
            return None;
        }

        match self.advance().await {
            Ok(Some(product)) => Some(Ok(product)),
            Ok(None) => {
                self.finished = true;
                info!(
                    "Crawl finished: {} pages, {} products",
                    self.state.visited_pages.len(),
                    self.state.visited_products.len()
                );
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    async fn advance(&mut self) -> Result<Option<Product>> {
        loop {
            while let Some(candidate) = self.pending.pop_front() {
                if !self.state.visited_products.insert(candidate.url.clone()) {
                    trace!("Already emitted {}", candidate.url);
                    continue;
                }

                self.throttle().await;
                let product = self.price_product(candidate).await?;
                self.throttle_due = true;
                return Ok(Some(product));
            }

            if let Some(next) = self.after_pending.take() {
                if self.state.visited_pages.contains(&next) {
                    debug!("Next page {} already visited, stopping", next);
                    return Ok(None);
                }

                self.throttle().await;
                if !self.settings.page_delay.is_zero() {
                    debug!("Sleeping {:?} before {}", self.settings.page_delay, next);
                    tokio::time::sleep(self.settings.page_delay).await;
                }
                self.next_url = Some(next);
            }

            let Some(url) = self.next_url.take() else {
                return Ok(None);
            };

            if !self.state.visited_pages.insert(url.clone()) {
                return Ok(None);
            }

            self.load_listing(&url).await?;
        }
    }

    /// Politeness pause after an emitted record.
    async fn throttle(&mut self) {
        if std::mem::take(&mut self.throttle_due) && !self.settings.product_delay.is_zero() {
            tokio::time::sleep(self.settings.product_delay).await;
        }
    }

    async fn load_listing(&mut self, url: &str) -> Result<()> {
        let page = self
            .client
            .get(url)
            .await
            .with_context(|| format!("Failed to fetch listing page {}", url))?;

        if page.url != url {
            debug!("{} redirected to {}", url, page.url);
            self.state.visited_pages.insert(page.url.clone());
        }

        let listing = read_listing(&page, url)?;
        info!("Listing page {}: {} products", url, listing.products.len());

        if listing.products.is_empty() {
            self.report_empty(&page, listing.title.as_deref()).await;
        }

        self.pending = listing.products.into();
        self.after_pending = listing.next;
        Ok(())
    }

    async fn report_empty(&self, page: &Page, title: Option<&str>) {
        if !self.settings.debug {
            debug!("No products parsed from {}", page.url);
            return;
        }

        let path = &self.settings.dump_path;
        match tokio::fs::write(path, &page.body).await {
            Ok(()) => warn!("No products parsed. Saved HTML to {}", path.display()),
            Err(e) => warn!("No products parsed. Could not save HTML to {}: {}", path.display(), e),
        }
        warn!("Page <title>: {}", title.unwrap_or("NONE"));
    }

    async fn price_product(&self, candidate: Product) -> Result<Product> {
        let page = self
            .client
            .get(&candidate.url)
            .await
            .with_context(|| format!("Failed to fetch product page {}", candidate.url))?;

        let prices = self.extract_prices(&candidate.url, &page.body);
        Ok(candidate.with_prices(prices.normalized()))
    }

    fn extract_prices(&self, product_url: &str, body: &str) -> PricePair {
        let document = Html::parse_document(body);
        let prices = self.extractor.extract(&document);

        if !prices.is_found() {
            debug!(
                "Price not found on product page: {} (title={})",
                product_url,
                page_title(&document).as_deref().unwrap_or("NO TITLE")
            );
        }

        prices
    }
}

/// Parses a fetched listing page, resolving links against where it was
/// actually served from.
fn read_listing(page: &Page, requested: &str) -> Result<ListingPage> {
    let base = Url::parse(&page.url)
        .or_else(|_| Url::parse(requested))
        .with_context(|| format!("Invalid listing URL: {}", requested))?;

    let document = Html::parse_document(&page.body);

    Ok(ListingPage {
        products: parse_listing(&document, &base),
        next: resolve_next(&document, &base),
        title: page_title(&document),
    })
}
