//! REST API endpoint handlers

use crate::aggregate::AggregateResult;
use crate::db::sqlite::models::User;
use crate::error::AppError;
use crate::matcher::TickerRecord;
use crate::server::auth::AuthUser;
use crate::server::types::*;
use crate::services::{FavoritesService, FavoriteStockView, RefreshService};
use crate::state::AppState;
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Health
// ============================================================================

/// Health check endpoint - GET /health or GET /
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse::new("FinWatch API is running"))
}

// ============================================================================
// Auth
// ============================================================================

/// Register a new user - POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::Validation("name and email are required".to_string()).into());
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()).into());
    }

    let user = state.db.create_user(
        payload.name.trim(),
        payload.email.trim(),
        &payload.password,
        &state.security,
    )?;

    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for a session token - POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .db
        .verify_user(&payload.email, &payload.password, &state.security)?
        .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))?;

    let (token, token_hash) = state.security.generate_session_token();
    state
        .db
        .create_session(user.id, &token_hash, state.config.session_ttl_hours)?;

    Ok(Json(LoginResponse { token, user }))
}

/// Revoke the presenting session - POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    state.db.delete_session(&auth.token_hash)?;
    Ok(Json(MessageResponse::new("Logged out")))
}

// ============================================================================
// Users
// ============================================================================

/// List all users - GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.db.list_users()?))
}

/// Get one user - GET /api/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state
        .db
        .get_user(user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
    Ok(Json(user))
}

/// Update a user's name and/or email - PUT /api/users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .db
        .update_user(user_id, payload.name.as_deref(), payload.email.as_deref())?;
    Ok(Json(user))
}

/// Delete a user and their favorites - DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.delete_user(user_id)?;
    info!("Deleted user {}", user_id);
    Ok(Json(MessageResponse::new("User deleted")))
}

/// Current authenticated user - GET /api/user_info
pub async fn user_info(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}

// ============================================================================
// Ticker search
// ============================================================================

/// Fuzzy ticker search - GET /api/search?query=...
pub async fn search_tickers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<TickerRecord>> {
    let results = state
        .tickers
        .search(&params.query)
        .into_iter()
        .cloned()
        .collect();
    Json(results)
}

// ============================================================================
// Favorites
// ============================================================================

/// Favorites enriched with market data - GET /api/user/favorite_stocks
pub async fn favorite_stocks(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<FavoriteStockView>>> {
    let views = FavoritesService::favorites_with_market_data(&state, auth.user.id).await?;
    Ok(Json(views))
}

/// Add a favorite - POST /api/user/add_favorite
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<AddFavoriteRequest>,
) -> ApiResult<(StatusCode, Json<crate::db::sqlite::models::FavoriteStock>)> {
    let symbol = payload.symbol.trim();
    if symbol.is_empty() {
        return Err(AppError::Validation("symbol is required".to_string()).into());
    }

    // Validate against the ticker table when one is loaded; an empty
    // table means the snapshot was unavailable, not that every symbol
    // is wrong.
    let symbol = if state.tickers.is_empty() {
        symbol.to_uppercase()
    } else {
        state
            .tickers
            .get(symbol)
            .ok_or_else(|| AppError::NotFound(format!("unknown symbol {symbol}")))?
            .ticker
    };

    let favorite = state
        .db
        .add_favorite(auth.user.id, &symbol, payload.desired_price)?;

    Ok((StatusCode::CREATED, Json(favorite)))
}

/// Update the desired price of a favorite - POST /api/user/update_price
pub async fn update_desired_price(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<UpdatePriceRequest>,
) -> ApiResult<Json<crate::db::sqlite::models::FavoriteStock>> {
    let favorite =
        state
            .db
            .update_desired_price(auth.user.id, &payload.symbol, payload.desired_price)?;
    Ok(Json(favorite))
}

/// Remove a favorite - DELETE /api/user/remove_favorite
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<RemoveFavoriteRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.remove_favorite(auth.user.id, &payload.symbol)?;
    Ok(Json(MessageResponse::new(format!(
        "{} removed from favorites",
        payload.symbol
    ))))
}

/// Re-scrape analyst targets for the caller's favorites -
/// POST /api/user/favorite_stocks/refresh
pub async fn refresh_targets(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<RefreshResponse>> {
    let updated = RefreshService::refresh_user_targets(&state, auth.user.id).await?;
    Ok(Json(RefreshResponse { updated }))
}

/// Aggregate the caller's favorite graphs -
/// GET /api/user/favorite_stocks/summed_graph
pub async fn summed_graph(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<AggregateResult>> {
    let result = FavoritesService::summed_graph(&state, auth.user.id).await?;
    Ok(Json(result))
}
