//! Application state management

use crate::config::Config;
use crate::db::SqliteDb;
use crate::error::Result;
use crate::market::yahoo::YahooProvider;
use crate::market::StockDataProvider;
use crate::matcher::{self, TickerRecord};
use crate::scraper::{AnalystRatingSource, YahooAnalystSource};
use crate::security::SecurityManager;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;

/// Read-only ticker symbol table, built once before the server starts
/// and never mutated afterwards.
pub struct TickerTable {
    records: Vec<TickerRecord>,
    by_symbol: DashMap<String, TickerRecord>,
}

impl TickerTable {
    pub fn new(records: Vec<TickerRecord>) -> Self {
        let by_symbol = DashMap::new();
        for record in &records {
            by_symbol.insert(record.ticker.to_uppercase(), record.clone());
        }
        Self { records, by_symbol }
    }

    /// Fuzzy search over the table
    pub fn search(&self, query: &str) -> Vec<&TickerRecord> {
        matcher::search(query, &self.records)
    }

    /// Exact symbol lookup, case-insensitive
    pub fn get(&self, symbol: &str) -> Option<TickerRecord> {
        self.by_symbol.get(&symbol.to_uppercase()).map(|r| r.clone())
    }

    /// Whether the table knows this symbol
    pub fn contains(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(&symbol.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,

    /// SQLite database connection
    pub db: Arc<SqliteDb>,

    /// Password hashing and session tokens
    pub security: Arc<SecurityManager>,

    /// Price history provider
    pub market: Arc<dyn StockDataProvider>,

    /// Analyst target price source
    pub analyst: Arc<dyn AnalystRatingSource>,

    /// Ticker symbol table serving fuzzy search
    pub tickers: Arc<TickerTable>,
}

impl AppState {
    /// Create new application state with the production providers
    pub fn new(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        tracing::info!("Data directory: {:?}", config.data_dir);

        let db = Arc::new(SqliteDb::new(&config.data_dir.join("finwatch.db"))?);
        let security = Arc::new(SecurityManager::new(&config.data_dir)?);

        let tickers = Arc::new(build_ticker_table(&db, &config.ticker_snapshot)?);

        Ok(Self {
            config,
            db,
            security,
            market: Arc::new(YahooProvider::new()),
            analyst: Arc::new(YahooAnalystSource::new()),
            tickers,
        })
    }
}

/// Seed the tickers table from the CSV snapshot (when present) and load
/// it into memory. A missing snapshot is a storage-side degradation,
/// not a startup failure: search just returns nothing.
fn build_ticker_table(db: &SqliteDb, snapshot: &Path) -> Result<TickerTable> {
    if snapshot.exists() {
        let count = ingest_snapshot(db, snapshot)?;
        tracing::info!("Ingested {} tickers from {:?}", count, snapshot);
    } else if db.count_tickers()? == 0 {
        tracing::warn!(
            "Ticker snapshot {:?} not found and tickers table is empty; search will return nothing",
            snapshot
        );
    }

    let records = db.load_tickers()?;
    tracing::info!("Loaded {} tickers into memory", records.len());
    Ok(TickerTable::new(records))
}

/// Parse a CSV snapshot (`ticker,name,exchange` header) and replace the
/// tickers table with it. Rows with an empty ticker are skipped.
fn ingest_snapshot(db: &SqliteDb, path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: TickerRecord = row?;
        if record.ticker.is_empty() {
            tracing::warn!("Skipping snapshot row with empty ticker");
            continue;
        }
        records.push(record);
    }

    db.store_tickers(&records)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn record(ticker: &str) -> TickerRecord {
        TickerRecord {
            ticker: ticker.to_string(),
            name: String::new(),
            exchange: String::new(),
        }
    }

    #[test]
    fn test_table_search_and_lookup() {
        let table = TickerTable::new(vec![record("AAPL"), record("GME")]);

        assert_eq!(table.len(), 2);
        assert!(table.contains("aapl"));
        assert_eq!(table.get("gme").unwrap().ticker, "GME");
        assert!(table.get("TSLA").is_none());

        let results = table.search("AAP");
        assert_eq!(results[0].ticker, "AAPL");
    }

    #[test]
    fn test_empty_table() {
        let table = TickerTable::new(Vec::new());
        assert!(table.is_empty());
        assert!(table.search("AAPL").is_empty());
    }

    #[test]
    fn test_snapshot_ingestion() {
        let dir = TempDir::new().unwrap();
        let db = SqliteDb::new(&dir.path().join("finwatch.db")).unwrap();

        let snapshot = dir.path().join("tickers.csv");
        let mut file = std::fs::File::create(&snapshot).unwrap();
        writeln!(file, "ticker,name,exchange").unwrap();
        writeln!(file, "AAPL,Apple Inc.,NASDAQ").unwrap();
        writeln!(file, ",Ghost Corp,NYSE").unwrap();
        writeln!(file, "GME,GameStop Corp.,NYSE").unwrap();
        drop(file);

        let table = build_ticker_table(&db, &snapshot).unwrap();

        // The empty-ticker row is skipped
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("AAPL").unwrap().name, "Apple Inc.");
    }

    #[test]
    fn test_missing_snapshot_serves_empty_table() {
        let dir = TempDir::new().unwrap();
        let db = SqliteDb::new(&dir.path().join("finwatch.db")).unwrap();

        let table = build_ticker_table(&db, &dir.path().join("absent.csv")).unwrap();
        assert!(table.is_empty());
    }
}
