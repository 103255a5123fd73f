//! # Configuration
//!
//! Application configuration loading and management.
//!
//! # Configuration Sources
//!
//! Configuration is loaded in the following order (later sources override earlier):
//! 1. Default values
//! 2. Configuration file (if exists)
//! 3. Environment variables
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ETHER_RELAY_CONFIG_FILE` | Configuration file path | `config.toml` |
//! | `PORT` | HTTP server port | `3001` |
//! | `ETHER_RELAY_HOST` | HTTP server host | `0.0.0.0` |
//! | `ETHER_RELAY_CORS_ORIGIN` | Allowed CORS origin | `http://localhost:5173` |
//! | `ETHER_RELAY_LOG_LEVEL` | Log level | `info` |
//! | `ETHER_RELAY_LOG_FORMAT` | Log format (json/pretty) | `json` |
//! | `ETHER_RELAY_LOG_HEADERS` | Log redacted request headers | `false` |
//! | `MNEMONIC` | Wallet mnemonic | none, required |
//! | `INFURA_PROJECT_ID` | Substituted into the default RPC URLs | none |
//! | `ETHER_RELAY_RPC_URL` | HTTP RPC endpoint | Sepolia via Infura |
//! | `ETHER_RELAY_WS_URL` | WebSocket RPC endpoint | Sepolia via Infura |
//! | `ETHER_RELAY_CONTRACT_ADDRESS` | Contract address | `0x1dE0…56aD` |
//! | `ETHER_RELAY_CHAIN_ID` | Chain id used for signing | `11155111` |
//!
//! # Examples
//!
//! ```ignore
//! use ether_relay::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

use crate::infrastructure::blockchain::{ChainConfig, ChainConfigError};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse configuration.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Invalid chain configuration.
    #[error("chain config: {0}")]
    Chain(#[from] ChainConfigError),
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The single origin allowed by CORS.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl ServerConfig {
    /// Returns the socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                field: "server.host:port".to_string(),
                message: format!("{e}"),
            })
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (structured logging).
    #[default]
    Json,
    /// Pretty format (human-readable).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include target (module path) in logs.
    #[serde(default = "default_true")]
    pub include_target: bool,

    /// Log request headers at debug level, with credentials redacted.
    #[serde(default)]
    pub log_headers: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Json,
            include_target: true,
            log_headers: false,
        }
    }
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Blockchain configuration.
    #[serde(default)]
    pub chain: ChainConfig,
}

impl AppConfig {
    /// Loads configuration from environment variables and optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let config_path = std::env::var("ETHER_RELAY_CONFIG_FILE")
            .unwrap_or_else(|_| "config.toml".to_string());

        if Path::new(&config_path).exists() {
            config = Self::from_file(&config_path)?;
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server configuration
        if let Some(port) = var("PORT")
            && let Ok(p) = port.parse()
        {
            self.server.port = p;
        }
        if let Some(host) = var("ETHER_RELAY_HOST") {
            self.server.host = host;
        }
        if let Some(origin) = var("ETHER_RELAY_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }

        // Logging configuration
        if let Some(level) = var("ETHER_RELAY_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = var("ETHER_RELAY_LOG_FORMAT") {
            self.log.format = match format.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                _ => LogFormat::Json,
            };
        }
        if let Some(headers) = var("ETHER_RELAY_LOG_HEADERS")
            && let Ok(enabled) = headers.parse()
        {
            self.log.log_headers = enabled;
        }

        // Chain configuration
        if let Some(mnemonic) = var("MNEMONIC") {
            self.chain.mnemonic = Some(mnemonic);
        }
        if let Some(url) = var("ETHER_RELAY_RPC_URL") {
            self.chain.rpc_url = url;
        }
        if let Some(url) = var("ETHER_RELAY_WS_URL") {
            self.chain.ws_url = url;
        }
        if let Some(address) = var("ETHER_RELAY_CONTRACT_ADDRESS") {
            self.chain.contract_address = address;
        }
        if let Some(chain_id) = var("ETHER_RELAY_CHAIN_ID")
            && let Ok(id) = chain_id.parse()
        {
            self.chain.chain_id = id;
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        let origin = &self.server.cors_origin;
        let is_http = origin.starts_with("http://") || origin.starts_with("https://");
        if !is_http || HeaderValue::from_str(origin).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "server.cors_origin".to_string(),
                message: format!("'{origin}' is not an http(s) origin"),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".to_string(),
                message: format!(
                    "invalid log level '{}', must be one of: {:?}",
                    self.log.level, valid_levels
                ),
            });
        }

        self.chain.validate()?;

        Ok(())
    }
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
