//! Test fixtures and data factories
//!
//! Provides factory methods for creating handlers and requests with sensible
//! defaults. All factories create real objects over a `MemoryStore`.

use artistsaid_integrations::webhooks::CreateWebhookRequest;
use artistsaid_integrations::{Config, Integrations};

/// Facade over a fresh in-memory store with default settings
pub fn integrations() -> Integrations {
    Integrations::in_memory(Config::default()).expect("default config is valid")
}

/// Facade that accepts loopback webhook URLs, for local HTTP receivers
pub fn local_integrations() -> Integrations {
    let mut config = Config::default();
    config.webhooks.allow_private_urls = true;
    Integrations::in_memory(config).expect("local config is valid")
}

/// Factory for webhook registration requests
pub struct WebhookRequestFactory;

impl WebhookRequestFactory {
    /// Registration for `url` subscribed to `events`
    pub fn create(url: &str, events: &[&str]) -> CreateWebhookRequest {
        CreateWebhookRequest {
            integration_id: "integration-test".to_string(),
            url: url.to_string(),
            events: events.iter().map(|e| e.to_string()).collect(),
            created_by: Some("tester".to_string()),
            ..Default::default()
        }
    }
}
