//! mdc-crawler - Search-driven product and price crawler
//!
//! Records go to stdout; logs go to stderr.

use anyhow::Result;
use clap::Parser;
use mdc_crawler::commands::SearchCommand;
use mdc_crawler::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mdc-crawler",
    version,
    about = "Crawl catalog search results and extract product prices",
    long_about = "Pages through the catalog's search results for a term, visits each product page, \
                  and prints one record per product with its current and pre-discount price."
)]
struct Cli {
    /// Search term, e.g. "external harddrive"
    term: String,

    /// Output format: jsonl, json, csv [default: jsonl]
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Seconds to wait between listing pages [default: 0.2]
    #[arg(long)]
    sleep: Option<f64>,

    /// Stop after this many products
    #[arg(short, long)]
    max: Option<usize>,

    /// Save listing pages that yield no products and log parsing diagnostics
    #[arg(long)]
    debug: bool,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, env = "MDC_PROXY")]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose || cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(sleep) = cli.sleep {
        config.set_page_delay_secs(sleep);
    }
    config.debug = config.debug || cli.debug;

    if cli.max.is_some() {
        config.max_results = cli.max;
    }

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    let cmd = SearchCommand::new(config);
    let mut stdout = std::io::stdout().lock();
    cmd.execute(&cli.term, &mut stdout).await?;

    Ok(())
}
