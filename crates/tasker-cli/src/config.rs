use std::time::Duration;

use anyhow::{Context, Result};

use tasker_db::DbConfig;

const DEFAULT_DB_PATH: &str = "tasker.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
}

impl Config {
    /// Read `TASKER_DB_PATH` and `TASKER_DB_BUSY_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = lookup("TASKER_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into());

        let busy_timeout_ms: u64 = match lookup("TASKER_DB_BUSY_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("TASKER_DB_BUSY_TIMEOUT_MS is not a number: '{raw}'"))?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        Ok(Self {
            db: DbConfig::new(path).with_busy_timeout(Duration::from_millis(busy_timeout_ms)),
        })
    }
}
