//! Data models for catalog products and extracted prices.

use serde::{Deserialize, Serialize};

/// A product discovered on a listing page, priced from its detail page.
///
/// `url` is the identity key: two records with the same URL are the same
/// product no matter what their names say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display text of the product link
    pub name: String,
    /// Absolute product URL
    pub url: String,
    /// Price the customer pays, digits and thousands separators only
    pub price_current: Option<String>,
    /// Pre-discount price, only present alongside `price_current`
    pub price_old: Option<String>,
}

impl Product {
    /// Creates an unpriced product candidate.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into(), price_current: None, price_old: None }
    }

    /// Attaches a price pair.
    pub fn with_prices(mut self, prices: PricePair) -> Self {
        self.price_current = prices.current;
        self.price_old = prices.old;
        self
    }

    /// Returns true if the record carries a discount.
    pub fn is_discounted(&self) -> bool {
        self.price_current.is_some() && self.price_old.is_some()
    }
}

/// A (current, old) price candidate as pulled out of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricePair {
    pub current: Option<String>,
    pub old: Option<String>,
}

impl PricePair {
    /// Creates a pair from raw parts.
    pub fn new(current: Option<String>, old: Option<String>) -> Self {
        Self { current, old }
    }

    /// No price found.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single price with no discount.
    pub fn current_only(current: impl Into<String>) -> Self {
        Self { current: Some(current.into()), old: None }
    }

    /// Returns true if a current price was found.
    pub fn is_found(&self) -> bool {
        self.current.is_some()
    }
}
