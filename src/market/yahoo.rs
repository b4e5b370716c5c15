//! Yahoo Finance chart API provider

use crate::aggregate::round2;
use crate::error::{AppError, Result};
use crate::market::types::StockData;
use crate::market::StockDataProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; finwatch/0.1)";

/// Yahoo Finance implementation of [`StockDataProvider`]
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at a different host (tests use a mock server)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StockDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_stock_data(&self, symbol: &str) -> Result<StockData> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let response = self
            .client
            .get(url)
            .query(&[("range", "1mo"), ("interval", "1d")])
            .send()
            .await?
            .error_for_status()?;

        let chart: ChartResponse = response.json().await?;
        stock_data_from_chart(symbol, chart)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    // Null entries mark days without a close (halts, holidays)
    close: Vec<Option<f64>>,
}

/// Convert a chart response into [`StockData`]
fn stock_data_from_chart(symbol: &str, response: ChartResponse) -> Result<StockData> {
    let result = response
        .chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .ok_or_else(|| AppError::MarketData(format!("No chart data for {symbol}")))?;

    let graph: Vec<f64> = result
        .indicators
        .quote
        .first()
        .map(|quote| quote.close.iter().flatten().copied().collect())
        .unwrap_or_default();

    let (Some(&first), Some(&last)) = (graph.first(), graph.last()) else {
        return Err(AppError::MarketData(format!("Empty price series for {symbol}")));
    };

    let fluctuation = if first != 0.0 {
        round2((last - first) / first * 100.0)
    } else {
        0.0
    };

    Ok(StockData {
        symbol: symbol.to_string(),
        price: last,
        fluctuation,
        graph,
    })
}
