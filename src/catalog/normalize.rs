//! Price-pair ordering correction.
//!
//! Extraction order is unreliable across markup variants, but a discounted
//! price is never displayed above the price it discounts. When both values
//! are whole numbers and come out inverted, swap them.

use crate::catalog::models::PricePair;

/// Returns the pair with `current <= old` when both parse as integers;
/// anything else comes back unchanged.
pub fn normalize_prices(prices: PricePair) -> PricePair {
    let current = prices.current.as_deref().and_then(to_int_price);
    let old = prices.old.as_deref().and_then(to_int_price);

    match (current, old) {
        (Some(current), Some(old)) if old < current => {
            PricePair { current: prices.old, old: prices.current }
        }
        _ => prices,
    }
}

impl PricePair {
    /// Applies [`normalize_prices`].
    pub fn normalized(self) -> Self {
        normalize_prices(self)
    }
}

/// Parses "1,499" style amounts. Non-numeric input yields `None`.
fn to_int_price(price: &str) -> Option<i64> {
    let cleaned = price.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
