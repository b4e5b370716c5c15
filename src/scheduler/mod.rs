//! Background analyst-target refresh
//!
//! Keeps stored target prices and ratings current without putting the
//! scrape on the request path. Runs once shortly after boot, then at
//! the configured interval. Expired sessions are pruned on the same
//! cadence.

use crate::services::RefreshService;
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Seconds to wait before the first refresh after boot
const INITIAL_DELAY_SECS: u64 = 10;

/// Periodic refresh scheduler
pub struct RefreshScheduler {
    state: Arc<AppState>,
}

impl RefreshScheduler {
    /// Create a new refresh scheduler
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start the scheduler as a background task
    pub fn start(self) {
        let interval = Duration::from_secs(self.state.config.refresh_interval_secs);

        tokio::spawn(async move {
            info!(
                "Refresh scheduler started, interval {}s",
                interval.as_secs()
            );

            tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

            loop {
                self.run_once().await;
                tokio::time::sleep(interval).await;
            }
        });
    }

    /// One refresh pass
    async fn run_once(&self) {
        if let Err(e) = RefreshService::refresh_all_targets(&self.state).await {
            warn!("Analyst target refresh failed: {}", e);
        }

        match self.state.db.prune_expired_sessions() {
            Ok(0) => {}
            Ok(pruned) => info!("Pruned {} expired sessions", pruned),
            Err(e) => warn!("Session pruning failed: {}", e),
        }
    }
}
