//! Coupon API configuration module.
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. Built-in defaults ([`ApiConfig::default`])
//! 2. `coupon-api.toml` in the working directory (optional)
//! 3. Environment variables prefixed `COUPON_` (e.g. `COUPON_HTTP_PORT=9000`)

use std::net::{IpAddr, SocketAddr};

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use coupon_db::DbConfig;
use serde::{Deserialize, Serialize};

/// Optional configuration file, looked up without extension.
pub const CONFIG_FILE: &str = "coupon-api";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "COUPON";

/// Coupon API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Interface to listen on
    pub bind_addr: String,

    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Upper bound of the SQLite pool
    pub db_max_connections: u32,

    /// Request body limit in bytes (default: 16KB)
    pub max_body_bytes: usize,

    /// Clamp cart-wise per-item prices at zero
    pub floor_cart_wise_prices: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0".to_string(),
            http_port: 8080,
            database_path: "coupons.db".to_string(),
            db_max_connections: 5,
            max_body_bytes: 16 * 1024,
            floor_cart_wise_prices: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from the optional file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::new(CONFIG_FILE, FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: ApiConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidValue("bind_addr".to_string()))?;

        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("db_max_connections".to_string()));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue("max_body_bytes".to_string()));
        }

        Ok(())
    }

    /// Store settings; a `database_path` of `:memory:` gives a throwaway store.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path, self.db_max_connections)
    }

    /// Address the HTTP server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue("bind_addr".to_string()))?;
        Ok(SocketAddr::new(ip, self.http_port))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
