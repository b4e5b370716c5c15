//! Favorites Service
//!
//! Joins stored favorites with freshly fetched market data and runs the
//! graph aggregation. A symbol whose fetch fails degrades to an
//! error-marked entry; it never fails the whole request.

use crate::aggregate::{self, round2, AggregateResult, FavoriteSeries};
use crate::error::Result;
use crate::state::AppState;
use serde::Serialize;
use tracing::warn;

/// One favorite enriched with market data
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteStockView {
    pub id: i64,
    pub symbol: String,
    pub desired_price: Option<f64>,
    pub target_price: Option<f64>,
    pub analyst_rating: Option<String>,
    /// Last close, absent when the fetch failed
    pub price: Option<f64>,
    /// Percent change over the fetched window
    pub fluctuation: Option<f64>,
    pub graph: Option<Vec<f64>>,
    /// Chance (0-100) the desired price is reached, judged against the
    /// analyst target
    pub probability: Option<f64>,
    /// Set when the data source failed for this symbol
    pub error: Option<String>,
}

/// Favorites service for business logic
pub struct FavoritesService;

impl FavoritesService {
    /// List a user's favorites enriched with market data
    pub async fn favorites_with_market_data(
        state: &AppState,
        user_id: i64,
    ) -> Result<Vec<FavoriteStockView>> {
        let favorites = state.db.list_favorites(user_id)?;

        let mut views = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            let probability =
                Self::estimate_probability(favorite.desired_price, favorite.target_price);

            let view = match state.market.fetch_stock_data(&favorite.symbol).await {
                Ok(data) => FavoriteStockView {
                    id: favorite.id,
                    symbol: favorite.symbol,
                    desired_price: favorite.desired_price,
                    target_price: favorite.target_price,
                    analyst_rating: favorite.analyst_rating,
                    price: Some(data.price),
                    fluctuation: Some(data.fluctuation),
                    graph: Some(data.graph),
                    probability,
                    error: None,
                },
                Err(e) => {
                    warn!("Market data fetch failed for {}: {}", favorite.symbol, e);
                    FavoriteStockView {
                        id: favorite.id,
                        symbol: favorite.symbol,
                        desired_price: favorite.desired_price,
                        target_price: favorite.target_price,
                        analyst_rating: favorite.analyst_rating,
                        price: None,
                        fluctuation: None,
                        graph: None,
                        probability,
                        error: Some("Stock data unavailable".to_string()),
                    }
                }
            };
            views.push(view);
        }

        Ok(views)
    }

    /// Sum and downsample the price graphs of a user's favorites
    pub async fn summed_graph(state: &AppState, user_id: i64) -> Result<AggregateResult> {
        let favorites = state.db.list_favorites(user_id)?;

        let mut series = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            let graph = match state.market.fetch_stock_data(&favorite.symbol).await {
                Ok(data) => Some(data.graph),
                Err(e) => {
                    warn!("Market data fetch failed for {}: {}", favorite.symbol, e);
                    None
                }
            };
            series.push(FavoriteSeries {
                symbol: favorite.symbol,
                graph,
            });
        }

        Ok(aggregate::aggregate(&series))
    }

    /// Chance (0-100, 2 decimals) that the desired price is reached,
    /// judged by its distance to the analyst target. `None` without a
    /// usable pair.
    pub fn estimate_probability(desired: Option<f64>, target: Option<f64>) -> Option<f64> {
        let desired = desired.filter(|d| *d != 0.0)?;
        let target = target.filter(|t| *t != 0.0)?;

        let ratio = (desired - target).abs() / target;
        Some(round2(((1.0 - ratio) * 100.0).clamp(0.0, 100.0)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::SqliteDb;
    use crate::error::AppError;
    use crate::market::types::StockData;
    use crate::market::StockDataProvider;
    use crate::scraper::{AnalystRatingSource, TargetEstimate};
    use crate::security::SecurityManager;
    use crate::state::TickerTable;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Provider serving canned graphs; unknown symbols fail
    pub(crate) struct MockProvider {
        graphs: HashMap<String, Vec<f64>>,
    }

    impl MockProvider {
        pub(crate) fn new(graphs: &[(&str, &[f64])]) -> Self {
            Self {
                graphs: graphs
                    .iter()
                    .map(|(s, g)| (s.to_string(), g.to_vec()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl StockDataProvider for MockProvider {
        fn id(&self) -> &'static str {
            "mock"
        }

        async fn fetch_stock_data(&self, symbol: &str) -> crate::error::Result<StockData> {
            let graph = self
                .graphs
                .get(symbol)
                .cloned()
                .ok_or_else(|| AppError::MarketData(format!("no data for {symbol}")))?;
            let price = *graph.last().unwrap();
            Ok(StockData {
                symbol: symbol.to_string(),
                price,
                fluctuation: 0.0,
                graph,
            })
        }
    }

    /// Analyst source serving canned estimates
    pub(crate) struct MockAnalyst {
        estimates: HashMap<String, TargetEstimate>,
    }

    impl MockAnalyst {
        pub(crate) fn new(estimates: &[(&str, f64, &str)]) -> Self {
            Self {
                estimates: estimates
                    .iter()
                    .map(|(s, p, r)| {
                        (
                            s.to_string(),
                            TargetEstimate {
                                target_price: *p,
                                rating: r.to_string(),
                            },
                        )
                    })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl AnalystRatingSource for MockAnalyst {
        fn id(&self) -> &'static str {
            "mock"
        }

        async fn fetch_target(
            &self,
            symbol: &str,
        ) -> crate::error::Result<Option<TargetEstimate>> {
            Ok(self.estimates.get(symbol).cloned())
        }
    }

    pub(crate) fn test_state(
        dir: &TempDir,
        market: Arc<dyn StockDataProvider>,
        analyst: Arc<dyn AnalystRatingSource>,
    ) -> AppState {
        let data_dir = dir.path().to_path_buf();
        AppState {
            config: Config {
                host: "127.0.0.1".to_string(),
                port: 0,
                data_dir: data_dir.clone(),
                ticker_snapshot: data_dir.join("tickers.csv"),
                refresh_interval_secs: 3600,
                session_ttl_hours: 24,
            },
            db: Arc::new(SqliteDb::new(&data_dir.join("finwatch.db")).unwrap()),
            security: Arc::new(SecurityManager::new_for_testing().unwrap()),
            market,
            analyst,
            tickers: Arc::new(TickerTable::new(Vec::new())),
        }
    }

    fn state_with_graphs(dir: &TempDir, graphs: &[(&str, &[f64])]) -> AppState {
        test_state(
            dir,
            Arc::new(MockProvider::new(graphs)),
            Arc::new(MockAnalyst::new(&[])),
        )
    }

    async fn seed_user(state: &AppState) -> i64 {
        state
            .db
            .create_user("Test", "test@example.com", "pw", &state.security)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_summed_graph_two_favorites() {
        let dir = TempDir::new().unwrap();
        let state = state_with_graphs(&dir, &[("A", &[1.0, 2.0, 3.0]), ("B", &[4.0, 5.0])]);
        let user_id = seed_user(&state).await;
        state.db.add_favorite(user_id, "A", None).unwrap();
        state.db.add_favorite(user_id, "B", None).unwrap();

        let result = FavoritesService::summed_graph(&state, user_id).await.unwrap();

        assert_eq!(result.summed_graph, vec![5.0, 7.0]);
        assert_eq!(result.tickers, vec!["A", "B"]);
        assert_eq!(result.averaged_graph, vec![6.0]);
    }

    #[tokio::test]
    async fn test_summed_graph_no_favorites() {
        let dir = TempDir::new().unwrap();
        let state = state_with_graphs(&dir, &[]);
        let user_id = seed_user(&state).await;

        let result = FavoritesService::summed_graph(&state, user_id).await.unwrap();

        assert!(result.summed_graph.is_empty());
        assert!(result.tickers.is_empty());
        assert!(result.averaged_graph.is_empty());
    }

    #[tokio::test]
    async fn test_summed_graph_failed_symbol_excluded() {
        let dir = TempDir::new().unwrap();
        let state = state_with_graphs(&dir, &[("A", &[1.0, 2.0])]);
        let user_id = seed_user(&state).await;
        state.db.add_favorite(user_id, "A", None).unwrap();
        state.db.add_favorite(user_id, "DEAD", None).unwrap();

        let result = FavoritesService::summed_graph(&state, user_id).await.unwrap();

        assert_eq!(result.summed_graph, vec![1.0, 2.0]);
        assert_eq!(result.tickers, vec!["A", "DEAD"]);
    }

    #[tokio::test]
    async fn test_favorites_view_marks_failures() {
        let dir = TempDir::new().unwrap();
        let state = state_with_graphs(&dir, &[("A", &[10.0, 11.0])]);
        let user_id = seed_user(&state).await;
        state.db.add_favorite(user_id, "A", Some(12.0)).unwrap();
        state.db.add_favorite(user_id, "DEAD", None).unwrap();

        let views = FavoritesService::favorites_with_market_data(&state, user_id)
            .await
            .unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].symbol, "A");
        assert_eq!(views[0].price, Some(11.0));
        assert!(views[0].error.is_none());

        assert_eq!(views[1].symbol, "DEAD");
        assert!(views[1].price.is_none());
        assert!(views[1].graph.is_none());
        assert_eq!(views[1].error.as_deref(), Some("Stock data unavailable"));
    }

    #[tokio::test]
    async fn test_favorites_view_carries_probability() {
        let dir = TempDir::new().unwrap();
        let state = state_with_graphs(&dir, &[("A", &[10.0])]);
        let user_id = seed_user(&state).await;
        state.db.add_favorite(user_id, "A", Some(95.0)).unwrap();
        state.db.update_target(user_id, "A", 100.0, "buy").unwrap();

        let views = FavoritesService::favorites_with_market_data(&state, user_id)
            .await
            .unwrap();

        assert_eq!(views[0].probability, Some(95.0));
        assert_eq!(views[0].analyst_rating.as_deref(), Some("buy"));
    }

    #[test]
    fn test_probability_basic() {
        assert_eq!(
            FavoritesService::estimate_probability(Some(95.0), Some(100.0)),
            Some(95.0)
        );
        assert_eq!(
            FavoritesService::estimate_probability(Some(100.0), Some(100.0)),
            Some(100.0)
        );
    }

    #[test]
    fn test_probability_clamped_to_zero() {
        // Desired price more than twice the target
        assert_eq!(
            FavoritesService::estimate_probability(Some(300.0), Some(100.0)),
            Some(0.0)
        );
    }

    #[test]
    fn test_probability_requires_both_prices() {
        assert!(FavoritesService::estimate_probability(None, Some(100.0)).is_none());
        assert!(FavoritesService::estimate_probability(Some(95.0), None).is_none());
        assert!(FavoritesService::estimate_probability(Some(0.0), Some(100.0)).is_none());
        assert!(FavoritesService::estimate_probability(Some(95.0), Some(0.0)).is_none());
    }
}
