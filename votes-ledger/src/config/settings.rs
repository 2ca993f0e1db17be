use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use votes_ledger_pipeline::relay::{DEFAULT_BATCH_SIZE, DEFAULT_POLL_INTERVAL};

use crate::errors::LedgerAppError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_HOST: [u8; 4] = [127, 0, 0, 1];
const DEFAULT_PORT: u16 = 8080;

/// Runtime settings read from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub run_migrations: bool,
    pub relay_batch_size: i64,
    pub relay_poll_interval: Duration,
}

impl LedgerConfig {
    /// Loads the configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; every other variable falls back to its
    /// default when unset.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `LedgerConfig` or a `LedgerAppError::Config`
    /// naming the missing or malformed variable.
    pub fn from_env() -> Result<Self, LedgerAppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| LedgerAppError::Config("DATABASE_URL must be set".to_string()))?;

        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let bind_addr = parse_var("LEDGER_BIND_ADDR", SocketAddr::from((DEFAULT_HOST, DEFAULT_PORT)))?;
        let run_migrations = parse_var("RUN_MIGRATIONS", true)?;
        let relay_batch_size = parse_var("RELAY_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let poll_ms = parse_var("RELAY_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL.as_millis() as u64)?;

        if relay_batch_size <= 0 {
            return Err(LedgerAppError::Config("RELAY_BATCH_SIZE must be positive".to_string()));
        }
        if poll_ms == 0 {
            return Err(LedgerAppError::Config("RELAY_POLL_INTERVAL_MS must be positive".to_string()));
        }

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            run_migrations,
            relay_batch_size,
            relay_poll_interval: Duration::from_millis(poll_ms),
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, LedgerAppError> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T, LedgerAppError> {
    raw.trim()
        .parse()
        .map_err(|_| LedgerAppError::Config(format!("{name} has an invalid value: {raw}")))
}
