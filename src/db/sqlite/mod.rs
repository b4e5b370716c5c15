//! SQLite database module

pub mod models;
mod favorite;
mod migrations;
mod session;
mod ticker;
mod user;

use crate::error::Result;
use crate::matcher::TickerRecord;
use crate::security::SecurityManager;
use models::{FavoriteStock, User};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Create new SQLite database connection
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        // Run migrations
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== User Methods ==========

    /// Create a new user
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        security: &SecurityManager,
    ) -> Result<User> {
        let conn = self.conn.lock();
        user::create_user(&conn, name, email, password, security)
    }

    /// Verify user credentials
    pub fn verify_user(
        &self,
        email: &str,
        password: &str,
        security: &SecurityManager,
    ) -> Result<Option<User>> {
        let conn = self.conn.lock();
        user::verify_user(&conn, email, password, security)
    }

    /// Get a user by id
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock();
        user::get_user(&conn, id)
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock();
        user::list_users(&conn)
    }

    /// Update a user's name and/or email
    pub fn update_user(&self, id: i64, name: Option<&str>, email: Option<&str>) -> Result<User> {
        let conn = self.conn.lock();
        user::update_user(&conn, id, name, email)
    }

    /// Delete a user along with their favorites and sessions
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock();
        user::delete_user(&conn, id)
    }

    // ========== Session Methods ==========

    /// Store a new session token hash
    pub fn create_session(&self, user_id: i64, token_hash: &str, ttl_hours: i64) -> Result<()> {
        let conn = self.conn.lock();
        session::create_session(&conn, user_id, token_hash, ttl_hours)
    }

    /// Resolve a token hash to its user, ignoring expired sessions
    pub fn user_for_token(&self, token_hash: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        session::user_for_token(&conn, token_hash)
    }

    /// Revoke one session
    pub fn delete_session(&self, token_hash: &str) -> Result<()> {
        let conn = self.conn.lock();
        session::delete_session(&conn, token_hash)
    }

    /// Drop expired sessions
    pub fn prune_expired_sessions(&self) -> Result<usize> {
        let conn = self.conn.lock();
        session::prune_expired(&conn)
    }

    // ========== Favorite Methods ==========

    /// Add a favorite for a user
    pub fn add_favorite(
        &self,
        user_id: i64,
        symbol: &str,
        desired_price: Option<f64>,
    ) -> Result<FavoriteStock> {
        let conn = self.conn.lock();
        favorite::add_favorite(&conn, user_id, symbol, desired_price)
    }

    /// List a user's favorites
    pub fn list_favorites(&self, user_id: i64) -> Result<Vec<FavoriteStock>> {
        let conn = self.conn.lock();
        favorite::list_favorites(&conn, user_id)
    }

    /// Update the desired price of one favorite
    pub fn update_desired_price(
        &self,
        user_id: i64,
        symbol: &str,
        desired_price: Option<f64>,
    ) -> Result<FavoriteStock> {
        let conn = self.conn.lock();
        favorite::update_desired_price(&conn, user_id, symbol, desired_price)
    }

    /// Store a scraped target price and rating for one user's favorite
    pub fn update_target(
        &self,
        user_id: i64,
        symbol: &str,
        target_price: f64,
        analyst_rating: &str,
    ) -> Result<()> {
        let conn = self.conn.lock();
        favorite::update_target(&conn, user_id, symbol, target_price, analyst_rating)
    }

    /// Remove one favorite
    pub fn remove_favorite(&self, user_id: i64, symbol: &str) -> Result<()> {
        let conn = self.conn.lock();
        favorite::remove_favorite(&conn, user_id, symbol)
    }

    /// Every distinct favorited symbol across all users
    pub fn distinct_favorite_symbols(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        favorite::distinct_symbols(&conn)
    }

    /// Store a target estimate for every favorite of the given symbol
    pub fn update_target_for_symbol(
        &self,
        symbol: &str,
        target_price: f64,
        analyst_rating: &str,
    ) -> Result<usize> {
        let conn = self.conn.lock();
        favorite::update_target_for_symbol(&conn, symbol, target_price, analyst_rating)
    }

    // ========== Ticker Methods ==========

    /// Replace the ticker snapshot
    pub fn store_tickers(&self, tickers: &[TickerRecord]) -> Result<()> {
        let mut conn = self.conn.lock();
        ticker::store_tickers(&mut conn, tickers)
    }

    /// Load all tickers in table order
    pub fn load_tickers(&self) -> Result<Vec<TickerRecord>> {
        let conn = self.conn.lock();
        ticker::load_tickers(&conn)
    }

    /// Count stored tickers
    pub fn count_tickers(&self) -> Result<i64> {
        let conn = self.conn.lock();
        ticker::count_tickers(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (TempDir, SqliteDb, SecurityManager) {
        let dir = TempDir::new().unwrap();
        let db = SqliteDb::new(&dir.path().join("finwatch.db")).unwrap();
        let security = SecurityManager::new_for_testing().unwrap();
        (dir, db, security)
    }

    #[test]
    fn test_user_crud() {
        let (_dir, db, security) = test_db();

        let user = db
            .create_user("Alice", "alice@example.com", "hunter2!", &security)
            .unwrap();
        assert_eq!(user.name, "Alice");

        let fetched = db.get_user(user.id).unwrap().unwrap();
        assert_eq!(fetched.email, "alice@example.com");

        let updated = db
            .update_user(user.id, Some("Alicia"), None)
            .unwrap();
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.email, "alice@example.com");

        assert_eq!(db.list_users().unwrap().len(), 1);

        db.delete_user(user.id).unwrap();
        assert!(db.get_user(user.id).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let (_dir, db, security) = test_db();

        db.create_user("Alice", "a@example.com", "pw", &security)
            .unwrap();
        let err = db
            .create_user("Alias", "a@example.com", "pw2", &security)
            .unwrap_err();
        assert!(matches!(err, crate::error::AppError::Conflict(_)));
    }

    #[test]
    fn test_verify_user() {
        let (_dir, db, security) = test_db();

        db.create_user("Bob", "bob@example.com", "secret", &security)
            .unwrap();

        assert!(db
            .verify_user("bob@example.com", "secret", &security)
            .unwrap()
            .is_some());
        assert!(db
            .verify_user("bob@example.com", "wrong", &security)
            .unwrap()
            .is_none());
        assert!(db
            .verify_user("nobody@example.com", "secret", &security)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_session_lifecycle() {
        let (_dir, db, security) = test_db();

        let user = db
            .create_user("Carol", "carol@example.com", "pw", &security)
            .unwrap();

        db.create_session(user.id, "hash-1", 24).unwrap();
        let resolved = db.user_for_token("hash-1").unwrap().unwrap();
        assert_eq!(resolved.id, user.id);

        assert!(db.user_for_token("hash-unknown").unwrap().is_none());

        db.delete_session("hash-1").unwrap();
        assert!(db.user_for_token("hash-1").unwrap().is_none());
    }

    #[test]
    fn test_expired_session_rejected() {
        let (_dir, db, security) = test_db();

        let user = db
            .create_user("Dan", "dan@example.com", "pw", &security)
            .unwrap();

        // Negative TTL expires the session immediately
        db.create_session(user.id, "hash-old", -1).unwrap();
        assert!(db.user_for_token("hash-old").unwrap().is_none());

        assert_eq!(db.prune_expired_sessions().unwrap(), 1);
    }

    #[test]
    fn test_favorite_crud() {
        let (_dir, db, security) = test_db();

        let user = db
            .create_user("Eve", "eve@example.com", "pw", &security)
            .unwrap();

        let favorite = db.add_favorite(user.id, "AAPL", Some(180.0)).unwrap();
        assert_eq!(favorite.symbol, "AAPL");
        assert_eq!(favorite.desired_price, Some(180.0));
        assert!(favorite.target_price.is_none());

        let err = db.add_favorite(user.id, "AAPL", None).unwrap_err();
        assert!(matches!(err, crate::error::AppError::Conflict(_)));

        let updated = db
            .update_desired_price(user.id, "AAPL", Some(200.0))
            .unwrap();
        assert_eq!(updated.desired_price, Some(200.0));

        db.update_target(user.id, "AAPL", 195.5, "buy").unwrap();
        let favorites = db.list_favorites(user.id).unwrap();
        assert_eq!(favorites[0].target_price, Some(195.5));
        assert_eq!(favorites[0].analyst_rating.as_deref(), Some("buy"));

        db.remove_favorite(user.id, "AAPL").unwrap();
        assert!(db.list_favorites(user.id).unwrap().is_empty());

        let err = db.remove_favorite(user.id, "AAPL").unwrap_err();
        assert!(matches!(err, crate::error::AppError::NotFound(_)));
    }

    #[test]
    fn test_delete_user_removes_favorites_and_sessions() {
        let (_dir, db, security) = test_db();

        let user = db
            .create_user("Frank", "frank@example.com", "pw", &security)
            .unwrap();
        db.add_favorite(user.id, "TSLA", None).unwrap();
        db.create_session(user.id, "hash-f", 24).unwrap();

        db.delete_user(user.id).unwrap();

        assert!(db.list_favorites(user.id).unwrap().is_empty());
        assert!(db.user_for_token("hash-f").unwrap().is_none());
    }

    #[test]
    fn test_distinct_symbols_and_bulk_target_update() {
        let (_dir, db, security) = test_db();

        let a = db
            .create_user("Gia", "gia@example.com", "pw", &security)
            .unwrap();
        let b = db
            .create_user("Hal", "hal@example.com", "pw", &security)
            .unwrap();
        db.add_favorite(a.id, "AAPL", None).unwrap();
        db.add_favorite(b.id, "AAPL", None).unwrap();
        db.add_favorite(b.id, "GME", None).unwrap();

        assert_eq!(db.distinct_favorite_symbols().unwrap(), vec!["AAPL", "GME"]);

        let affected = db.update_target_for_symbol("AAPL", 210.0, "hold").unwrap();
        assert_eq!(affected, 2);
    }

    #[test]
    fn test_ticker_snapshot_replace_and_load() {
        let (_dir, db, _security) = test_db();

        let first = vec![TickerRecord {
            ticker: "OLD".into(),
            name: "Old Corp".into(),
            exchange: "NYSE".into(),
        }];
        db.store_tickers(&first).unwrap();
        assert_eq!(db.count_tickers().unwrap(), 1);

        let second = vec![
            TickerRecord {
                ticker: "AAPL".into(),
                name: "Apple Inc.".into(),
                exchange: "NASDAQ".into(),
            },
            TickerRecord {
                ticker: "GME".into(),
                name: "GameStop Corp.".into(),
                exchange: "NYSE".into(),
            },
        ];
        db.store_tickers(&second).unwrap();

        let loaded = db.load_tickers().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].ticker, "AAPL");
        assert_eq!(loaded[1].ticker, "GME");
    }
}
