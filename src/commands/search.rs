//! Search command implementation.

use crate::catalog::{CatalogClient, CatalogFetch, Crawl, CrawlSettings, PriceExtractor};
use crate::config::Config;
use crate::format::Formatter;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{info, warn};

/// Crawls a search and writes the priced products.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search, writing records to `out`. Returns the record count.
    pub async fn execute(&self, term: &str, out: &mut impl Write) -> Result<usize> {
        let client =
            CatalogClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_client(&client, term, out).await
    }

    /// Executes the search with a provided client (for testing).
    ///
    /// JSON Lines are written as each record arrives; JSON and CSV are
    /// written once the crawl ends. If the crawl fails part-way, whatever was
    /// collected is still written before the error is returned.
    pub async fn execute_with_client(
        &self,
        client: &impl CatalogFetch,
        term: &str,
        out: &mut impl Write,
    ) -> Result<usize> {
        let extractor = PriceExtractor::new(&self.config.currency_symbol)?;
        let settings = CrawlSettings::from_config(&self.config);
        let mut crawl = Crawl::new(client, term, extractor, settings)?;

        let formatter = Formatter::new(self.config.format);
        let limit = self.config.max_results.unwrap_or(usize::MAX);

        let mut collected = Vec::new();
        let mut count = 0;
        let mut discounted = 0;
        let mut failure = None;

        while count < limit {
            match crawl.next().await {
                Some(Ok(product)) => {
                    count += 1;
                    if product.is_discounted() {
                        discounted += 1;
                    }
                    if formatter.is_streaming() {
                        let line = formatter.format_products(std::slice::from_ref(&product));
                        writeln!(out, "{}", line)?;
                        out.flush()?;
                    } else {
                        collected.push(product);
                    }
                }
                Some(Err(e)) => {
                    failure = Some(e);
                    break;
                }
                None => break,
            }
        }

        if !formatter.is_streaming() {
            writeln!(out, "{}", formatter.format_products(&collected))?;
        }

        if let Some(e) = failure {
            return Err(e.context(format!("Crawl for {:?} aborted after {} products", term, count)));
        }

        if count == 0 {
            warn!(
                "0 products found. Try --debug to inspect {}",
                self.config.debug_dump_path.display()
            );
        } else {
            info!("Found {} products, {} discounted", count, discounted);
        }

        Ok(count)
    }
}
