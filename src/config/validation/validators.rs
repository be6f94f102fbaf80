//! Validators for each configuration section

use super::trait_def::Validate;
use crate::config::models::*;
use crate::utils::auth::crypto::keys::SECRET_BYTES;
use tracing::debug;

impl Validate for CredentialConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating credential configuration");

        if self.secret_bytes < SECRET_BYTES {
            return Err(format!(
                "secret_bytes must be at least {} (256 bits), got {}",
                SECRET_BYTES, self.secret_bytes
            ));
        }

        if self.secret_bytes > 1024 {
            return Err("secret_bytes should not exceed 1024".to_string());
        }

        Ok(())
    }
}

impl Validate for WebhooksConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating webhook configuration");

        for (name, value) in [
            ("signature_header", &self.signature_header),
            ("event_header", &self.event_header),
            ("delivery_id_header", &self.delivery_id_header),
            ("version_header", &self.version_header),
        ] {
            if value.is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
            if reqwest::header::HeaderName::from_bytes(value.as_bytes()).is_err() {
                return Err(format!("{} is not a valid header name: {}", name, value));
            }
        }

        if self.version.is_empty() {
            return Err("version cannot be empty".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }

        if self.error_threshold == 0 {
            return Err("error_threshold must be greater than 0".to_string());
        }

        if self.max_retry_delay_ms == 0 {
            return Err("max_retry_delay_ms must be greater than 0".to_string());
        }

        self.default_retry.validate()
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level '{}': {}", self.level, e))
    }
}
