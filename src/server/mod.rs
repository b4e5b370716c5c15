//! HTTP server for the REST API
//!
//! Provides user, favorite, search, and aggregation endpoints with
//! bearer-token authentication.

mod auth;
mod handlers;
mod types;

pub use auth::AuthUser;

use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// API server manager
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Create a new server
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
        }
    }

    /// Start the server
    pub async fn start(&mut self) -> crate::error::Result<()> {
        let host = &self.state.config.host;
        let port = self.state.config.port;

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| crate::error::AppError::Config(format!("Invalid address: {e}")))?;

        let app = build_router(self.state.clone());

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("Starting FinWatch API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        // Spawn server task
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });

        info!("FinWatch API server started successfully");
        Ok(())
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build the API router
pub fn build_router(state: Arc<AppState>) -> Router {
    // Allow all origins for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/", get(handlers::health_check))
        .route("/health", get(handlers::health_check))
        // Auth
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        // Users
        .route("/api/users", get(handlers::list_users))
        .route(
            "/api/users/:user_id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/api/user_info", get(handlers::user_info))
        // Ticker search
        .route("/api/search", get(handlers::search_tickers))
        // Favorites
        .route("/api/user/favorite_stocks", get(handlers::favorite_stocks))
        .route("/api/user/add_favorite", post(handlers::add_favorite))
        .route("/api/user/update_price", post(handlers::update_desired_price))
        .route(
            "/api/user/remove_favorite",
            delete(handlers::remove_favorite),
        )
        .route(
            "/api/user/favorite_stocks/refresh",
            post(handlers::refresh_targets),
        )
        .route(
            "/api/user/favorite_stocks/summed_graph",
            get(handlers::summed_graph),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
