//! Store API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file next to the binary is read first by `main`.
//!
//! | Variable             | Default        |
//! |----------------------|----------------|
//! | `HOST`               | `0.0.0.0`      |
//! | `PORT`               | `5000`         |
//! | `DATABASE_PATH`      | `./store.db`   |
//! | `DB_MAX_CONNECTIONS` | `5`            |
//! | `MAX_BODY_BYTES`     | `52428800`     |
//! | `BILLS_PAGE_LIMIT`   | `500`          |

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Serialize;

/// Store API configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// Interface to listen on
    pub host: IpAddr,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Largest accepted request body (item images arrive as base64)
    pub max_body_bytes: usize,

    /// Upper bound for `GET /bills?limit=`
    pub bills_page_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            database_path: PathBuf::from("./store.db"),
            db_max_connections: 5,
            max_body_bytes: 50 * 1024 * 1024, // 50MB
            bills_page_limit: 500,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            host: parse_or(&lookup, "HOST", defaults.host)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            database_path: lookup("DATABASE_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", defaults.max_body_bytes)?,
            bills_page_limit: parse_or(&lookup, "BILLS_PAGE_LIMIT", defaults.bills_page_limit)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.bills_page_limit == 0 {
            return Err(ConfigError::InvalidValue("BILLS_PAGE_LIMIT".to_string()));
        }

        Ok(config)
    }

    /// Socket address the server binds to.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
