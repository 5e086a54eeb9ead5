//! Application configuration (server + store selection).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use eoi_infra::config::parse_or;
use eoi_infra::{ConfigError, DatabaseConfig};

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// `USE_PERSISTENT_STORES=true` selects Postgres; otherwise in-memory stores.
    pub use_persistent_stores: bool,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load from the process environment (and `.env`, via the database config).
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = DatabaseConfig::from_env()?;
        Self::with_database(|key| std::env::var(key).ok(), database)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database = DatabaseConfig::from_lookup(&lookup)?;
        Self::with_database(lookup, database)
    }

    fn with_database(
        lookup: impl Fn(&str) -> Option<String>,
        database: DatabaseConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: parse_or(
                "BIND_ADDR",
                lookup("BIND_ADDR"),
                IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            )?,
            port: parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?,
            use_persistent_stores: parse_or(
                "USE_PERSISTENT_STORES",
                lookup("USE_PERSISTENT_STORES"),
                false,
            )?,
            database,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
