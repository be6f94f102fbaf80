//! Configuration management
//!
//! This module handles loading and validation of the library configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{IntegrationError, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Prefix of every environment override
const ENV_PREFIX: &str = "ARTISTSAID_";

/// Main configuration struct
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Credential issuance settings
    #[serde(default)]
    pub credentials: CredentialConfig,
    /// Webhook signing and delivery settings
    #[serde(default)]
    pub webhooks: WebhooksConfig,
    /// Store access settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| IntegrationError::config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| IntegrationError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(bytes) = env_parse::<usize>("SECRET_BYTES")? {
            config.credentials.secret_bytes = bytes;
        }
        if let Some(header) = env_parse::<String>("SIGNATURE_HEADER")? {
            config.webhooks.signature_header = header;
        }
        if let Some(secs) = env_parse::<u64>("WEBHOOK_TIMEOUT_SECS")? {
            config.webhooks.request_timeout_secs = secs;
        }
        if let Some(threshold) = env_parse::<u32>("WEBHOOK_ERROR_THRESHOLD")? {
            config.webhooks.error_threshold = threshold;
        }
        if let Some(allow) = env_parse::<bool>("WEBHOOK_ALLOW_PRIVATE_URLS")? {
            config.webhooks.allow_private_urls = allow;
        }
        if let Some(ms) = env_parse::<u64>("STORE_TIMEOUT_MS")? {
            config.store.timeout_ms = ms;
        }
        if let Some(level) = env_parse::<String>("LOG_LEVEL")? {
            config.logging.level = level;
        }
        if let Some(json) = env_parse::<bool>("LOG_JSON")? {
            config.logging.json = json;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.credentials
            .validate()
            .map_err(|e| IntegrationError::config(format!("Credential config error: {}", e)))?;

        self.webhooks
            .validate()
            .map_err(|e| IntegrationError::config(format!("Webhook config error: {}", e)))?;

        self.store
            .validate()
            .map_err(|e| IntegrationError::config(format!("Store config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| IntegrationError::config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    let key = format!("{}{}", ENV_PREFIX, name);
    match std::env::var(&key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| IntegrationError::config(format!("Invalid value for {}", key))),
        Err(_) => Ok(None),
    }
}
