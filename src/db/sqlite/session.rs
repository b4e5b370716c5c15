//! Session token storage
//!
//! Tokens are handed to clients once at login; only their SHA-256 hash
//! is persisted.

use crate::db::sqlite::models::User;
use crate::error::Result;
use chrono::{Duration, Utc};
use rusqlite::Connection;

/// Store a new session for a user
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    token_hash: &str,
    ttl_hours: i64,
) -> Result<()> {
    // Same format as sqlite's datetime('now') so expiry comparisons
    // stay plain string comparisons
    let expires_at = (Utc::now() + Duration::hours(ttl_hours))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    conn.execute(
        "INSERT INTO sessions (user_id, token_hash, expires_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, token_hash, expires_at],
    )?;
    Ok(())
}

/// Resolve a token hash to its user, ignoring expired sessions
pub fn user_for_token(conn: &Connection, token_hash: &str) -> Result<Option<User>> {
    let result = conn.query_row(
        "SELECT u.id, u.name, u.email, u.created_at
         FROM sessions s JOIN users u ON u.id = s.user_id
         WHERE s.token_hash = ?1 AND s.expires_at > datetime('now')",
        [token_hash],
        |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Revoke one session by token hash
pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE token_hash = ?", [token_hash])?;
    Ok(())
}

/// Drop sessions that are past their expiry
pub fn prune_expired(conn: &Connection) -> Result<usize> {
    let pruned = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )?;
    Ok(pruned)
}
