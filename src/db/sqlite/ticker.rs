//! Ticker snapshot storage
//!
//! The tickers table is replaced wholesale from a CSV snapshot at
//! startup and only read afterwards; runtime search goes through the
//! in-memory table in AppState.

use crate::error::Result;
use crate::matcher::TickerRecord;
use rusqlite::{params, Connection};

/// Replace the tickers table with a new snapshot (single transaction)
pub fn store_tickers(conn: &mut Connection, tickers: &[TickerRecord]) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM tickers", [])?;

    let mut stmt =
        tx.prepare("INSERT INTO tickers (ticker, name, exchange) VALUES (?1, ?2, ?3)")?;

    for record in tickers {
        stmt.execute(params![record.ticker, record.name, record.exchange])?;
    }

    drop(stmt);
    tx.commit()?;

    tracing::info!("Stored {} tickers in database", tickers.len());
    Ok(())
}

/// Load every ticker in table order (used to build the startup cache)
pub fn load_tickers(conn: &Connection) -> Result<Vec<TickerRecord>> {
    let mut stmt = conn.prepare("SELECT ticker, name, exchange FROM tickers ORDER BY id")?;

    let tickers = stmt
        .query_map([], |row| {
            Ok(TickerRecord {
                ticker: row.get(0)?,
                name: row.get(1)?,
                exchange: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    tracing::debug!("Loaded {} tickers from database", tickers.len());
    Ok(tickers)
}

/// Count rows in the tickers table
pub fn count_tickers(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM tickers", [], |row| row.get(0))?;
    Ok(count)
}
