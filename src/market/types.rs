//! Market data types

use serde::{Deserialize, Serialize};

/// Price history and derived stats for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockData {
    pub symbol: String,
    /// Last close in the fetched window
    pub price: f64,
    /// Percent change over the fetched window, 2 decimals
    pub fluctuation: f64,
    /// Close-price history, oldest first, never empty
    pub graph: Vec<f64>,
}
