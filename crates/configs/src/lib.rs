//! # configs
//!
//! Layered runtime configuration: built-in defaults, then an optional
//! `cleansight.toml` next to the binary, then `CLEANSIGHT_*` environment
//! variables (`CLEANSIGHT_SERVER__PORT=9000` style). A `.env` file is picked
//! up for local development before the environment layer is read.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    /// JSON snapshot loaded at startup and written on shutdown.
    /// No path means a purely in-memory run.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub log_json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080_i64)?
            .add_source(config::File::with_name("cleansight").required(false))
            .add_source(config::Environment::with_prefix("CLEANSIGHT").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_env() {
        let cfg = AppConfig::load().expect("defaults should satisfy the schema");
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.store.snapshot_path.is_none());
        assert!(!cfg.log_json);
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let cfg = AppConfig {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 9000,
            },
            store: StoreConfig::default(),
            log_json: true,
        };
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
    }
}
