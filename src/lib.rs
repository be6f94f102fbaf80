//! # ArtistsAid Integrations
//!
//! Credential issuance and webhook plumbing for third-party integrations of
//! the ArtistsAid platform.
//!
//! ## Features
//!
//! - **API keys**: opaque keys returned once, stored as SHA-256 digests,
//!   validated in constant time with atomic usage accounting
//! - **Webhooks**: per-endpoint signing secrets, HMAC-SHA256 payload
//!   signatures and an explicit `active`/`inactive`/`error` status machine
//! - **Delivery**: single signed delivery attempts with a computed retry
//!   decision; the retry loop stays with the caller
//! - **Pluggable storage**: async store traits with an in-memory store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use artistsaid_integrations::{Config, Integrations, Permission, Resource};
//! use artistsaid_integrations::webhooks::{CreateWebhookRequest, events};
//! use secrecy::ExposeSecret;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let integrations = Integrations::in_memory(Config::default())?;
//!
//!     let issued = integrations
//!         .api_keys()
//!         .issue("Stripe Sync", "stripe", vec![Permission::Read(Resource::Donations)])
//!         .await?;
//!     let key = integrations.api_keys().require(issued.raw_key.expose_secret()).await?;
//!     println!("authenticated {}", key.key_prefix);
//!
//!     integrations
//!         .webhooks()
//!         .create_webhook(CreateWebhookRequest {
//!             integration_id: "stripe".to_string(),
//!             url: "https://hooks.example.com/artistsaid".to_string(),
//!             events: vec![events::DONATION_COMPLETED.to_string()],
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let reports = integrations
//!         .dispatcher()
//!         .dispatch(&events::donation_completed("d-1", "a-1", 2500, "usd"))
//!         .await?;
//!     println!("{} deliveries", reports.len());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

pub use auth::{ApiKeyHandler, IssueApiKeyRequest, IssuedApiKey};
pub use config::Config;
pub use crate::core::models::{ApiKey, ApiKeyMetadata, ApiKeyStatus, Permission, Resource};
pub use crate::core::webhooks;
pub use storage::{ApiKeyStore, MemoryStore, WebhookStore};
pub use utils::auth::crypto::{sign, verify, verify_signature_header};
pub use utils::error::{IntegrationError, Result};

use crate::core::webhooks::{WebhookDispatcher, WebhookHandler};
use std::sync::Arc;
use tracing::info;

/// API key issuer, webhook handler and dispatcher sharing one configuration
/// and one store
#[derive(Debug, Clone)]
pub struct Integrations {
    api_keys: ApiKeyHandler,
    webhooks: WebhookHandler,
    dispatcher: WebhookDispatcher,
}

impl Integrations {
    /// Build all handlers over a store implementing both store contracts
    pub fn new<S>(config: Config, store: Arc<S>) -> Result<Self>
    where
        S: ApiKeyStore + WebhookStore + 'static,
    {
        config.validate()?;

        let api_keys = ApiKeyHandler::new(
            store.clone(),
            config.credentials.clone(),
            &config.store,
        );
        let webhooks = WebhookHandler::new(store, config.webhooks.clone(), &config.store)
            .with_secret_bytes(config.credentials.secret_bytes);
        let dispatcher = WebhookDispatcher::new(webhooks.clone())?;

        info!("Integrations initialized");
        Ok(Self {
            api_keys,
            webhooks,
            dispatcher,
        })
    }

    /// Build all handlers over a fresh `MemoryStore`
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    pub fn api_keys(&self) -> &ApiKeyHandler {
        &self.api_keys
    }

    pub fn webhooks(&self) -> &WebhookHandler {
        &self.webhooks
    }

    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.dispatcher
    }
}
