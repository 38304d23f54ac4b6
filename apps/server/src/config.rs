//! # Server Configuration
//!
//! Environment-variable configuration for the HTTP server.
//!
//! ## Variables
//! ```text
//! STOCKBOOK_HOST        Bind address        (default: 127.0.0.1)
//! STOCKBOOK_PORT        Bind port           (default: 8080)
//! STOCKBOOK_DATABASE    SQLite file path    (default: stockbook.db)
//! STOCKBOOK_CURRENCY    ISO currency code   (default: USD)
//! RUST_LOG              Tracing filter      (default: info)
//! ```
//!
//! The currency code is display configuration only. Amounts are plain
//! integer cents everywhere; nothing converts between currencies.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value} ({reason})")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port the HTTP listener binds to.
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// ISO 4217 currency code used when formatting amounts.
    pub currency: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables, applying
    /// defaults suitable for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("STOCKBOOK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let host: IpAddr = host.parse().map_err(|_| ConfigError::Invalid {
            var: "STOCKBOOK_HOST".to_string(),
            value: host.clone(),
            reason: "not a valid IP address".to_string(),
        })?;

        let port = env::var("STOCKBOOK_PORT").unwrap_or_else(|_| "8080".to_string());
        let port: u16 = port.parse().map_err(|_| ConfigError::Invalid {
            var: "STOCKBOOK_PORT".to_string(),
            value: port.clone(),
            reason: "not a valid port number".to_string(),
        })?;

        let database_path = env::var("STOCKBOOK_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("stockbook.db"));

        let currency = env::var("STOCKBOOK_CURRENCY").unwrap_or_else(|_| "USD".to_string());

        Ok(ServerConfig {
            bind_addr: SocketAddr::new(host, port),
            database_path,
            currency,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: PathBuf::from("stockbook.db"),
            currency: "USD".to_string(),
        }
    }
}
