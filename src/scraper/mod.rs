//! Analyst target price and rating source
//!
//! Fetches the analyst consensus for a symbol: mean target price and
//! recommendation key. A symbol without coverage yields `Ok(None)`;
//! callers keep whatever they had stored.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; finwatch/0.1)";

/// Analyst consensus for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEstimate {
    pub target_price: f64,
    pub rating: String,
}

/// Source of analyst target estimates
#[async_trait]
pub trait AnalystRatingSource: Send + Sync {
    /// Source ID (e.g., "yahoo")
    fn id(&self) -> &'static str;

    /// Fetch the current estimate; `Ok(None)` means no coverage
    async fn fetch_target(&self, symbol: &str) -> Result<Option<TargetEstimate>>;
}

/// Yahoo Finance quoteSummary implementation
pub struct YahooAnalystSource {
    client: Client,
    base_url: String,
}

impl YahooAnalystSource {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the source at a different host (tests use a mock server)
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

impl Default for YahooAnalystSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalystRatingSource for YahooAnalystSource {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_target(&self, symbol: &str) -> Result<Option<TargetEstimate>> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);

        let response = self
            .client
            .get(url)
            .query(&[("modules", "financialData")])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;

        let summary: QuoteSummaryResponse = response.json().await?;
        Ok(estimate_from_summary(summary))
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
}

#[derive(Debug, Deserialize)]
struct FinancialData {
    #[serde(rename = "targetMeanPrice")]
    target_mean_price: Option<RawValue>,
    #[serde(rename = "recommendationKey")]
    recommendation_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

/// Extract an estimate from a quoteSummary payload, if complete
fn estimate_from_summary(response: QuoteSummaryResponse) -> Option<TargetEstimate> {
    let financial = response
        .quote_summary
        .result?
        .into_iter()
        .next()?
        .financial_data?;

    let target_price = financial.target_mean_price?.raw?;
    let rating = financial.recommendation_key?;

    Some(TargetEstimate {
        target_price,
        rating,
    })
}
