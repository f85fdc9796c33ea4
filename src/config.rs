use crate::constants::{DEFAULT_CURRENCY, DEFAULT_HTTP_PORT};
use crate::error::{StorefrontError, StorefrontResult};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for a storefront server instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path where the sled database is stored
    pub storage_path: PathBuf,
    /// HTTP listening address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Secret mixed into every session key
    #[serde(default)]
    pub secret_key: String,
    /// Currency used when a stock record does not carry one
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Upper bound on the number of items in a single basket
    #[serde(default)]
    pub max_basket_quantity_threshold: Option<u32>,
    /// Maximum level for the `log` facade
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> String {
    format!("127.0.0.1:{}", DEFAULT_HTTP_PORT)
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("data"),
            bind_address: default_bind_address(),
            secret_key: String::new(),
            default_currency: default_currency(),
            max_basket_quantity_threshold: None,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with the specified storage path
    pub fn new(storage_path: PathBuf) -> Self {
        Self {
            storage_path,
            ..Default::default()
        }
    }

    /// Set the HTTP listening address
    pub fn with_bind_address(mut self, address: &str) -> Self {
        self.bind_address = address.to_string();
        self
    }

    /// Set the session secret
    pub fn with_secret_key(mut self, secret: &str) -> Self {
        self.secret_key = secret.to_string();
        self
    }

    /// Limit how many items a basket may hold
    pub fn with_max_basket_quantity(mut self, threshold: u32) -> Self {
        self.max_basket_quantity_threshold = Some(threshold);
        self
    }

    /// Fill in a random secret when none was configured.
    ///
    /// Sessions issued under a generated secret do not survive a restart.
    pub fn ensure_secret_key(&mut self) {
        if self.secret_key.is_empty() {
            let mut bytes = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            self.secret_key = hex::encode(bytes);
            log::warn!("No secret_key configured; generated an ephemeral one");
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> StorefrontResult<()> {
        if self.default_currency.trim().is_empty() {
            return Err(StorefrontError::Config(
                "default_currency must not be empty".to_string(),
            ));
        }
        self.bind_address.parse::<SocketAddr>().map_err(|e| {
            StorefrontError::Config(format!(
                "Invalid bind_address '{}': {}",
                self.bind_address, e
            ))
        })?;
        if self.max_basket_quantity_threshold == Some(0) {
            return Err(StorefrontError::Config(
                "max_basket_quantity_threshold must be at least 1".to_string(),
            ));
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(StorefrontError::Config(format!(
                "Unknown log_level '{}'",
                self.log_level
            )));
        }
        Ok(())
    }
}

/// Load a server configuration from the given path or from the
/// `SERVER_CONFIG` environment variable.
///
/// If the file does not exist, a default [`ServerConfig`] is returned. When a
/// `port` is provided, the returned config listens on `127.0.0.1:<port>`.
pub fn load_server_config(
    path: Option<&str>,
    port: Option<u16>,
) -> Result<ServerConfig, std::io::Error> {
    use std::fs;

    let config_path = path
        .map(|p| p.to_string())
        .or_else(|| std::env::var("SERVER_CONFIG").ok())
        .unwrap_or_else(|| "config/server_config.json".to_string());

    let mut config = match fs::read_to_string(&config_path) {
        Ok(config_str) => match serde_json::from_str::<ServerConfig>(&config_str) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("Failed to parse server configuration: {}", e);
                return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e));
            }
        },
        Err(_) => {
            log::info!(
                "No configuration at {}, using defaults",
                config_path
            );
            ServerConfig::default()
        }
    };

    if let Some(p) = port {
        config.bind_address = format!("127.0.0.1:{}", p);
    }
    Ok(config)
}
