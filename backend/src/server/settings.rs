//! Process settings loaded via OrthoConfig.
//!
//! Values come from `BLOODBANK_*` environment variables, command-line flags
//! or a configuration file, in OrthoConfig's usual precedence. Session cookie
//! settings are read separately by
//! [`bloodbank::inbound::http::session_config`].

use std::net::SocketAddr;
use std::time::Duration;

use bloodbank::outbound::persistence::PoolConfig;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings that shape the server and its database pool.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOODBANK")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Largest number of pooled connections.
    pub pool_max_size: Option<u32>,
    /// Connections kept open while idle.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection before failing with 503.
    pub pool_timeout_secs: Option<u64>,
    /// Mount `POST /api/v1/login`, which trusts the identity it is sent.
    #[ortho_config(default = false)]
    pub dev_login: bool,
    /// Apply embedded migrations before accepting traffic.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

/// Settings that cannot be turned into a running server.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No database URL was configured.
    #[error("BLOODBANK_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// The bind address does not parse.
    #[error("invalid bind address {value:?}: {source}")]
    InvalidBindAddr {
        /// Configured value.
        value: String,
        /// Parser error.
        #[source]
        source: std::net::AddrParseError,
    },
}

impl AppSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Pool configuration built from the database settings.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        let mut config = PoolConfig::new(url);
        if let Some(max_size) = self.pool_max_size {
            config = config.with_max_size(max_size);
        }
        if let Some(min_idle) = self.pool_min_idle {
            config = config.with_min_idle(Some(min_idle));
        }
        if let Some(secs) = self.pool_timeout_secs {
            config = config.with_connection_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
