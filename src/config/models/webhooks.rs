//! Webhook signing and delivery configuration

use crate::core::webhooks::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Webhook signing and delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhooksConfig {
    /// Header carrying the hex HMAC-SHA256 of the raw body
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
    /// Header carrying the event type
    #[serde(default = "default_event_header")]
    pub event_header: String,
    /// Header carrying the delivery id
    #[serde(default = "default_delivery_id_header")]
    pub delivery_id_header: String,
    /// Header carrying the protocol version
    #[serde(default = "default_version_header")]
    pub version_header: String,
    /// Protocol version assigned to new webhooks
    #[serde(default = "default_version")]
    pub version: String,
    /// User agent for outbound deliveries
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout for one delivery request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Consecutive failed deliveries that move a webhook to `error`
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
    /// Upper bound for a computed retry delay
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    /// Accept loopback and private network destinations
    #[serde(default)]
    pub allow_private_urls: bool,
    /// Retry policy for webhooks created without one
    #[serde(default)]
    pub default_retry: RetryConfig,
}

impl Default for WebhooksConfig {
    fn default() -> Self {
        Self {
            signature_header: default_signature_header(),
            event_header: default_event_header(),
            delivery_id_header: default_delivery_id_header(),
            version_header: default_version_header(),
            version: default_version(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            error_threshold: default_error_threshold(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            allow_private_urls: false,
            default_retry: RetryConfig::default(),
        }
    }
}

impl WebhooksConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }
}

fn default_signature_header() -> String {
    "X-ArtistsAid-Signature".to_string()
}

fn default_event_header() -> String {
    "X-ArtistsAid-Event".to_string()
}

fn default_delivery_id_header() -> String {
    "X-ArtistsAid-Delivery".to_string()
}

fn default_version_header() -> String {
    "X-ArtistsAid-Webhook-Version".to_string()
}

fn default_version() -> String {
    "v1".to_string()
}

fn default_user_agent() -> String {
    concat!("ArtistsAid-Webhooks/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_error_threshold() -> u32 {
    5
}

fn default_max_retry_delay_ms() -> u64 {
    60 * 60 * 1000
}
