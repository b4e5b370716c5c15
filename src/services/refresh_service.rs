//! Refresh Service
//!
//! Pulls analyst target estimates and persists them onto stored
//! favorites. Individual symbols failing is expected; the run continues
//! and reports how many favorites were updated.

use crate::error::Result;
use crate::state::AppState;
use tracing::{info, warn};

/// Refresh service for analyst target updates
pub struct RefreshService;

impl RefreshService {
    /// Refresh targets for every favorite of one user.
    ///
    /// Returns the number of favorites updated.
    pub async fn refresh_user_targets(state: &AppState, user_id: i64) -> Result<usize> {
        let favorites = state.db.list_favorites(user_id)?;

        let mut updated = 0;
        for favorite in favorites {
            match state.analyst.fetch_target(&favorite.symbol).await {
                Ok(Some(estimate)) => {
                    state.db.update_target(
                        user_id,
                        &favorite.symbol,
                        estimate.target_price,
                        &estimate.rating,
                    )?;
                    updated += 1;
                }
                Ok(None) => {
                    warn!("No analyst estimate for {}", favorite.symbol);
                }
                Err(e) => {
                    warn!("Target fetch failed for {}: {}", favorite.symbol, e);
                }
            }
        }

        Ok(updated)
    }

    /// Refresh targets for every distinct favorited symbol across all
    /// users, fetching each symbol once.
    ///
    /// Returns the number of favorite rows updated.
    pub async fn refresh_all_targets(state: &AppState) -> Result<usize> {
        let symbols = state.db.distinct_favorite_symbols()?;
        if symbols.is_empty() {
            return Ok(0);
        }

        info!("Refreshing analyst targets for {} symbols", symbols.len());

        let mut updated = 0;
        for symbol in symbols {
            match state.analyst.fetch_target(&symbol).await {
                Ok(Some(estimate)) => {
                    updated += state.db.update_target_for_symbol(
                        &symbol,
                        estimate.target_price,
                        &estimate.rating,
                    )?;
                }
                Ok(None) => {
                    warn!("No analyst estimate for {}", symbol);
                }
                Err(e) => {
                    warn!("Target fetch failed for {}: {}", symbol, e);
                }
            }
        }

        info!("Analyst target refresh updated {} favorites", updated);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::favorites_service::tests::{test_state, MockAnalyst, MockProvider};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn state_with_estimates(dir: &TempDir, estimates: &[(&str, f64, &str)]) -> AppState {
        test_state(
            dir,
            Arc::new(MockProvider::new(&[])),
            Arc::new(MockAnalyst::new(estimates)),
        )
    }

    fn seed_user(state: &AppState, email: &str) -> i64 {
        state
            .db
            .create_user("Test", email, "pw", &state.security)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_refresh_user_targets() {
        let dir = TempDir::new().unwrap();
        let state = state_with_estimates(&dir, &[("AAPL", 210.0, "buy")]);
        let user_id = seed_user(&state, "a@example.com");
        state.db.add_favorite(user_id, "AAPL", None).unwrap();
        state.db.add_favorite(user_id, "NOCOV", None).unwrap();

        let updated = RefreshService::refresh_user_targets(&state, user_id)
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let favorites = state.db.list_favorites(user_id).unwrap();
        assert_eq!(favorites[0].target_price, Some(210.0));
        assert_eq!(favorites[0].analyst_rating.as_deref(), Some("buy"));
        assert!(favorites[1].target_price.is_none());
    }

    #[tokio::test]
    async fn test_refresh_all_updates_every_user() {
        let dir = TempDir::new().unwrap();
        let state = state_with_estimates(&dir, &[("GME", 30.5, "hold")]);
        let a = seed_user(&state, "a@example.com");
        let b = seed_user(&state, "b@example.com");
        state.db.add_favorite(a, "GME", None).unwrap();
        state.db.add_favorite(b, "GME", None).unwrap();

        let updated = RefreshService::refresh_all_targets(&state).await.unwrap();
        assert_eq!(updated, 2);

        assert_eq!(
            state.db.list_favorites(b).unwrap()[0].target_price,
            Some(30.5)
        );
    }

    #[tokio::test]
    async fn test_refresh_all_with_no_favorites() {
        let dir = TempDir::new().unwrap();
        let state = state_with_estimates(&dir, &[]);

        assert_eq!(RefreshService::refresh_all_targets(&state).await.unwrap(), 0);
    }
}
