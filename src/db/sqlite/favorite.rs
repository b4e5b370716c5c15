//! Favorite stock management

use crate::db::sqlite::models::FavoriteStock;
use crate::error::{AppError, Result};
use rusqlite::Connection;

fn row_to_favorite(row: &rusqlite::Row<'_>) -> rusqlite::Result<FavoriteStock> {
    Ok(FavoriteStock {
        id: row.get(0)?,
        user_id: row.get(1)?,
        symbol: row.get(2)?,
        desired_price: row.get(3)?,
        target_price: row.get(4)?,
        analyst_rating: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

const FAVORITE_COLUMNS: &str =
    "id, user_id, symbol, desired_price, target_price, analyst_rating, created_at, updated_at";

/// Add a favorite for a user
pub fn add_favorite(
    conn: &Connection,
    user_id: i64,
    symbol: &str,
    desired_price: Option<f64>,
) -> Result<FavoriteStock> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM favorite_stocks WHERE user_id = ?1 AND symbol = ?2)",
        rusqlite::params![user_id, symbol],
        |row| row.get(0),
    )?;
    if exists {
        return Err(AppError::Conflict(format!("{symbol} is already a favorite")));
    }

    conn.execute(
        "INSERT INTO favorite_stocks (user_id, symbol, desired_price) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, symbol, desired_price],
    )?;

    let id = conn.last_insert_rowid();
    conn.query_row(
        &format!("SELECT {FAVORITE_COLUMNS} FROM favorite_stocks WHERE id = ?"),
        [id],
        row_to_favorite,
    )
    .map_err(Into::into)
}

/// List a user's favorites in insertion order
pub fn list_favorites(conn: &Connection, user_id: i64) -> Result<Vec<FavoriteStock>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FAVORITE_COLUMNS} FROM favorite_stocks WHERE user_id = ? ORDER BY id"
    ))?;

    let favorites = stmt
        .query_map([user_id], row_to_favorite)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(favorites)
}

/// Update the desired price of one favorite
pub fn update_desired_price(
    conn: &Connection,
    user_id: i64,
    symbol: &str,
    desired_price: Option<f64>,
) -> Result<FavoriteStock> {
    let affected = conn.execute(
        "UPDATE favorite_stocks SET desired_price = ?1, updated_at = datetime('now')
         WHERE user_id = ?2 AND symbol = ?3",
        rusqlite::params![desired_price, user_id, symbol],
    )?;
    if affected == 0 {
        return Err(AppError::NotFound(format!("favorite {symbol}")));
    }

    conn.query_row(
        &format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorite_stocks WHERE user_id = ?1 AND symbol = ?2"
        ),
        rusqlite::params![user_id, symbol],
        row_to_favorite,
    )
    .map_err(Into::into)
}

/// Store a freshly scraped analyst target price and rating
pub fn update_target(
    conn: &Connection,
    user_id: i64,
    symbol: &str,
    target_price: f64,
    analyst_rating: &str,
) -> Result<()> {
    conn.execute(
        "UPDATE favorite_stocks
         SET target_price = ?1, analyst_rating = ?2, updated_at = datetime('now')
         WHERE user_id = ?3 AND symbol = ?4",
        rusqlite::params![target_price, analyst_rating, user_id, symbol],
    )?;
    Ok(())
}

/// Remove one favorite
pub fn remove_favorite(conn: &Connection, user_id: i64, symbol: &str) -> Result<()> {
    let affected = conn.execute(
        "DELETE FROM favorite_stocks WHERE user_id = ?1 AND symbol = ?2",
        rusqlite::params![user_id, symbol],
    )?;
    if affected == 0 {
        return Err(AppError::NotFound(format!("favorite {symbol}")));
    }
    Ok(())
}

/// Every distinct symbol any user tracks, for the background refresh
pub fn distinct_symbols(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT symbol FROM favorite_stocks ORDER BY symbol")?;

    let symbols = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(symbols)
}

/// Store a target estimate for every favorite of the given symbol
pub fn update_target_for_symbol(
    conn: &Connection,
    symbol: &str,
    target_price: f64,
    analyst_rating: &str,
) -> Result<usize> {
    let affected = conn.execute(
        "UPDATE favorite_stocks
         SET target_price = ?1, analyst_rating = ?2, updated_at = datetime('now')
         WHERE symbol = ?3",
        rusqlite::params![target_price, analyst_rating, symbol],
    )?;
    Ok(affected)
}
