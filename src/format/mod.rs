//! Output formatting for product records (JSON Lines, JSON, CSV).

use crate::catalog::Product;
use crate::config::OutputFormat;

/// Formats products for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Returns true if records can be written one at a time as they arrive.
    pub fn is_streaming(&self) -> bool {
        self.format == OutputFormat::Jsonl
    }

    fn format_record(&self, product: &Product) -> String {
        serde_json::to_string(product).unwrap_or_else(|_| "{}".to_string())
    }

    /// Formats a result set. For JSON Lines this may be a single record
    /// written as soon as it arrives.
    pub fn format_products(&self, products: &[Product]) -> String {
        match self.format {
            OutputFormat::Jsonl => self.jsonl_products(products),
            OutputFormat::Json => self.json_products(products),
            OutputFormat::Csv => self.csv_products(products),
        }
    }

    fn jsonl_products(&self, products: &[Product]) -> String {
        products.iter().map(|p| self.format_record(p)).collect::<Vec<_>>().join("\n")
    }

    fn json_products(&self, products: &[Product]) -> String {
        serde_json::to_string_pretty(products).unwrap_or_else(|_| "[]".to_string())
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "name,url,price_current,price_old".to_string()
    }

    fn csv_products(&self, products: &[Product]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for product in products {
            lines.push(format!(
                "{},{},{},{}",
                Self::csv_escape(&product.name),
                Self::csv_escape(&product.url),
                product.price_current.as_deref().map(Self::csv_escape).unwrap_or_default(),
                product.price_old.as_deref().map(Self::csv_escape).unwrap_or_default(),
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
