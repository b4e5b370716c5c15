//! Multi-series graph aggregation
//!
//! Sums the price-history series of a user's favorites elementwise,
//! truncated to the shortest series, then downsamples the sum with a
//! fixed-window chunked average. Favorites whose market-data fetch
//! failed carry no graph; they are excluded from the math but still
//! reported in the ticker list.
//!
//! Empty input and all-failed input are normal states, not errors: both
//! short-circuit to an empty aggregate before any minimum is computed.

use serde::Serialize;

/// Width of the downsampling window
pub const CHUNK_SIZE: usize = 10;

/// One favorite's price-history series.
///
/// `graph` is `None` when the data source failed for this symbol.
#[derive(Debug, Clone)]
pub struct FavoriteSeries {
    pub symbol: String,
    pub graph: Option<Vec<f64>>,
}

/// Result of aggregating a list of favorite series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Elementwise sum, truncated to the shortest available graph
    pub summed_graph: Vec<f64>,
    /// Ticker of every input favorite, in input order
    pub tickers: Vec<String>,
    /// Chunked average of `summed_graph` (window of [`CHUNK_SIZE`],
    /// last chunk may be short)
    pub averaged_graph: Vec<f64>,
}

impl AggregateResult {
    fn empty() -> Self {
        Self {
            summed_graph: Vec::new(),
            tickers: Vec::new(),
            averaged_graph: Vec::new(),
        }
    }
}

/// Aggregate the series of all favorites into one summed, downsampled
/// graph.
///
/// All numeric output is rounded half-away-from-zero to 2 decimals.
pub fn aggregate(series: &[FavoriteSeries]) -> AggregateResult {
    if series.is_empty() {
        return AggregateResult::empty();
    }

    let tickers: Vec<String> = series.iter().map(|s| s.symbol.clone()).collect();

    let graphs: Vec<&Vec<f64>> = series.iter().filter_map(|s| s.graph.as_ref()).collect();

    // No usable graph at all: the symbols are known but the math is
    // impossible, so report them over empty graphs.
    let Some(min_length) = graphs.iter().map(|g| g.len()).min() else {
        return AggregateResult {
            summed_graph: Vec::new(),
            tickers,
            averaged_graph: Vec::new(),
        };
    };

    let summed_graph: Vec<f64> = (0..min_length)
        .map(|i| round2(graphs.iter().map(|g| g[i]).sum()))
        .collect();

    let averaged_graph: Vec<f64> = summed_graph
        .chunks(CHUNK_SIZE)
        .map(|chunk| round2(chunk.iter().sum::<f64>() / chunk.len() as f64))
        .collect();

    AggregateResult {
        summed_graph,
        tickers,
        averaged_graph,
    }
}

/// Round half-away-from-zero to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
