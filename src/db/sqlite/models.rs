//! SQLite database models

use serde::{Deserialize, Serialize};

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

/// Favorite stock model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteStock {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub desired_price: Option<f64>,
    pub target_price: Option<f64>,
    pub analyst_rating: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
