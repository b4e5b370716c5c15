//! User management

use crate::db::sqlite::models::User;
use crate::error::{AppError, Result};
use crate::security::SecurityManager;
use rusqlite::Connection;

/// Create a new user with a hashed password
pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password: &str,
    security: &SecurityManager,
) -> Result<User> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
        [email],
        |row| row.get(0),
    )?;
    if exists {
        return Err(AppError::Conflict(format!("user with email {email}")));
    }

    let password_hash = security.hash_password(password)?;

    conn.execute(
        "INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, email, password_hash],
    )?;

    let id = conn.last_insert_rowid();
    get_user(conn, id)?.ok_or_else(|| AppError::Internal("user vanished after insert".into()))
}

/// Verify credentials, returning the user on success
pub fn verify_user(
    conn: &Connection,
    email: &str,
    password: &str,
    security: &SecurityManager,
) -> Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?",
        [email],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        },
    );

    match result {
        Ok((id, name, email, password_hash, created_at)) => {
            if security.verify_password(password, &password_hash)? {
                Ok(Some(User {
                    id,
                    name,
                    email,
                    created_at,
                }))
            } else {
                Ok(None)
            }
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Get a user by id
pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, name, email, created_at FROM users WHERE id = ?",
        [id],
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

/// List all users
pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, name, email, created_at FROM users ORDER BY id")?;

    let users = stmt
        .query_map([], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(users)
}

/// Update a user's name and/or email
pub fn update_user(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<User> {
    let current =
        get_user(conn, id)?.ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    let name = name.unwrap_or(&current.name);
    let email = email.unwrap_or(&current.email);

    conn.execute(
        "UPDATE users SET name = ?1, email = ?2, updated_at = datetime('now') WHERE id = ?3",
        rusqlite::params![name, email, id],
    )?;

    get_user(conn, id)?.ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

/// Delete a user along with their favorites and sessions
pub fn delete_user(conn: &Connection, id: i64) -> Result<()> {
    let affected = conn.execute("DELETE FROM users WHERE id = ?", [id])?;
    if affected == 0 {
        return Err(AppError::NotFound(format!("user {id}")));
    }

    // Foreign keys cascade, but sqlite only enforces them when asked;
    // clean up explicitly so a misconfigured connection cannot leak rows.
    conn.execute("DELETE FROM favorite_stocks WHERE user_id = ?", [id])?;
    conn.execute("DELETE FROM sessions WHERE user_id = ?", [id])?;

    Ok(())
}
