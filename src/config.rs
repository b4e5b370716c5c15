//! Server configuration
//!
//! All values come from the environment with sensible defaults, so the
//! binary runs with no flags in development.

use crate::error::{AppError, Result};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the API server binds to
    pub host: String,
    pub port: u16,

    /// Directory for the SQLite database and secrets file
    pub data_dir: PathBuf,

    /// CSV snapshot the ticker table is seeded from at startup.
    /// Defaults to `<data_dir>/tickers.csv`; a missing file leaves the
    /// table empty (search returns nothing).
    pub ticker_snapshot: PathBuf,

    /// Seconds between background analyst-target refresh runs
    pub refresh_interval_secs: u64,

    /// Hours a session token stays valid after login
    pub session_ttl_hours: i64,
}

impl Config {
    /// Build configuration from `FINWATCH_*` environment variables
    pub fn from_env() -> Result<Self> {
        let host = env_or("FINWATCH_HOST", DEFAULT_HOST);

        let port = match std::env::var("FINWATCH_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("Invalid FINWATCH_PORT: {v}")))?,
            Err(_) => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(env_or("FINWATCH_DATA_DIR", DEFAULT_DATA_DIR));

        let ticker_snapshot = std::env::var("FINWATCH_TICKER_SNAPSHOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("tickers.csv"));

        let refresh_interval_secs = match std::env::var("FINWATCH_REFRESH_INTERVAL_SECS") {
            Ok(v) => v.parse::<u64>().map_err(|_| {
                AppError::Config(format!("Invalid FINWATCH_REFRESH_INTERVAL_SECS: {v}"))
            })?,
            Err(_) => DEFAULT_REFRESH_INTERVAL_SECS,
        };

        let session_ttl_hours = match std::env::var("FINWATCH_SESSION_TTL_HOURS") {
            Ok(v) => v.parse::<i64>().map_err(|_| {
                AppError::Config(format!("Invalid FINWATCH_SESSION_TTL_HOURS: {v}"))
            })?,
            Err(_) => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            ticker_snapshot,
            refresh_interval_secs,
            session_ttl_hours,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Env-free construction uses documented defaults
        let config = Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            ticker_snapshot: PathBuf::from(DEFAULT_DATA_DIR).join("tickers.csv"),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        };
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_ttl_hours, 24);
    }

    #[test]
    fn test_snapshot_defaults_into_data_dir() {
        let data_dir = PathBuf::from("/tmp/fw");
        assert_eq!(data_dir.join("tickers.csv"), PathBuf::from("/tmp/fw/tickers.csv"));
    }
}
