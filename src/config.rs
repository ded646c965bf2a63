//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::catalog::price::DEFAULT_CURRENCY_SYMBOL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Site crawled when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://mdcomputers.in/";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site root; search URLs are built on it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Delay between listing pages in milliseconds
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Delay between product page fetches in milliseconds
    #[serde(default = "default_product_delay_ms")]
    pub product_delay_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Marker that precedes every amount on the site
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Stop after this many records
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Save listing pages that yield no products
    #[serde(default)]
    pub debug: bool,

    /// Where empty listing pages are saved
    #[serde(default = "default_debug_dump_path")]
    pub debug_dump_path: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_delay_ms() -> u64 {
    200
}

fn default_product_delay_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_debug_dump_path() -> PathBuf {
    PathBuf::from("debug_mdcomputers.html")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            proxy: None,
            page_delay_ms: default_page_delay_ms(),
            product_delay_ms: default_product_delay_ms(),
            timeout_secs: default_timeout_secs(),
            currency_symbol: default_currency_symbol(),
            format: OutputFormat::Jsonl,
            max_results: None,
            debug: false,
            debug_dump_path: default_debug_dump_path(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration from the first config file found, or defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_path(explicit_path) else {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        };

        debug!("Using config file: {}", path.display());
        Self::from_file(path)
    }

    /// Config file search order: explicit path, `./config.toml`, then
    /// `<config dir>/mdc-crawler/config.toml`. Only the explicit path may be
    /// missing on disk; `from_file` reports that as an error.
    fn resolve_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit_path {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from("config.toml");
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("mdc-crawler").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("MDC_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.base_url = base_url;
            }
        }

        if let Ok(proxy) = std::env::var("MDC_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("MDC_PAGE_DELAY") {
            if let Ok(d) = delay.parse() {
                self.page_delay_ms = d;
            }
        }

        self
    }

    /// Sets the page delay from fractional seconds, as taken on the command line.
    pub fn set_page_delay_secs(&mut self, secs: f64) {
        self.page_delay_ms = (secs.max(0.0) * 1000.0).round() as u64;
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// A single JSON array
    Json,
    /// CSV with a header row
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: jsonl, json, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
