//! Market data providers

pub mod types;
pub mod yahoo;

use crate::error::Result;
use async_trait::async_trait;
use types::StockData;

/// Provider of per-symbol price history and quote data
#[async_trait]
pub trait StockDataProvider: Send + Sync {
    /// Provider ID (e.g., "yahoo")
    fn id(&self) -> &'static str;

    /// Fetch price history and derived stats for one symbol.
    ///
    /// A successful result always carries a non-empty graph; a symbol
    /// with no usable samples is an error.
    async fn fetch_stock_data(&self, symbol: &str) -> Result<StockData>;
}
