//! Services Layer
//!
//! Business logic between the HTTP handlers and the database/providers.
//!
//! # Services
//!
//! - `FavoritesService` - Enriched favorite views, probability estimate,
//!   summed-graph aggregation
//! - `RefreshService` - Persist freshly scraped analyst targets

pub mod favorites_service;
pub mod refresh_service;

// Re-export commonly used types and services
pub use favorites_service::{FavoritesService, FavoriteStockView};
pub use refresh_service::RefreshService;
