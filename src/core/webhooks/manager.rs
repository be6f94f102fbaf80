//! Webhook handler implementation
//!
//! This module contains the WebhookHandler struct: registration, lifecycle
//! and signing for webhook subscriptions.

use super::retry::RetryConfig;
use super::types::{
    DeliveryOutcome, RetryDecision, StatusChange, Webhook, WebhookFilter, WebhookPatch,
    WebhookStatus,
};
use crate::config::validation::validate_url_against_ssrf;
use crate::config::{StoreConfig, Validate, WebhooksConfig};
use crate::core::models::Metadata;
use crate::storage::{WebhookStore, with_timeout};
use crate::utils::auth::crypto::keys::SECRET_BYTES;
use crate::utils::auth::crypto::{self, SigningSecret};
use crate::utils::error::{IntegrationError, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Webhook registration request
#[derive(Debug, Clone, Default)]
pub struct CreateWebhookRequest {
    /// Owning integration
    pub integration_id: String,
    /// Destination URL
    pub url: String,
    /// Event types to subscribe to
    pub events: Vec<String>,
    /// Retry policy; the configured default when absent
    pub retry_config: Option<RetryConfig>,
    /// Payload filters
    pub filters: Vec<WebhookFilter>,
    /// Extra headers sent with each delivery
    pub headers: HashMap<String, String>,
    /// Free-form data
    pub attributes: HashMap<String, serde_json::Value>,
    /// Creating actor
    pub created_by: Option<String>,
}

/// Webhook handler
#[derive(Clone)]
pub struct WebhookHandler {
    /// Injected persistence
    pub(super) store: Arc<dyn WebhookStore>,
    /// Signing and delivery settings
    pub(super) config: WebhooksConfig,
    /// Bound for each store call
    pub(super) store_timeout: Duration,
    /// Random bytes per signing secret
    pub(super) secret_bytes: usize,
}

impl std::fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("config", &self.config)
            .field("store_timeout", &self.store_timeout)
            .field("secret_bytes", &self.secret_bytes)
            .finish_non_exhaustive()
    }
}

impl WebhookHandler {
    /// Create a new webhook handler
    pub fn new(
        store: Arc<dyn WebhookStore>,
        config: WebhooksConfig,
        store_config: &StoreConfig,
    ) -> Self {
        Self {
            store,
            config,
            store_timeout: store_config.timeout(),
            secret_bytes: SECRET_BYTES,
        }
    }

    /// Use `secret_bytes` random bytes for new signing secrets
    pub fn with_secret_bytes(mut self, secret_bytes: usize) -> Self {
        self.secret_bytes = secret_bytes;
        self
    }

    /// Settings this handler was built with
    pub fn config(&self) -> &WebhooksConfig {
        &self.config
    }

    /// Register a webhook.
    ///
    /// A fresh signing secret is generated here and never replaced; every
    /// delivery to this endpoint is signed with it.
    pub async fn create_webhook(&self, request: CreateWebhookRequest) -> Result<Webhook> {
        let integration_id = request.integration_id.trim();
        if integration_id.is_empty() {
            return Err(IntegrationError::validation(
                "Webhook integration id cannot be empty",
            ));
        }

        let url = self.validate_url(&request.url)?;
        let events = normalize_events(request.events)?;
        validate_headers(&request.headers)?;

        let retry_config = request
            .retry_config
            .unwrap_or_else(|| self.config.default_retry.clone());
        retry_config
            .validate()
            .map_err(|e| IntegrationError::validation(format!("Invalid retry config: {}", e)))?;

        let secret = SigningSecret::generate_with_len(self.secret_bytes)?;

        info!("Registering webhook: {} -> {}", integration_id, url);

        let webhook = Webhook {
            metadata: Metadata::new(),
            integration_id: integration_id.to_string(),
            url,
            events,
            secret,
            status: WebhookStatus::Active,
            version: self.config.version.clone(),
            retry_config,
            filters: request.filters,
            headers: request.headers,
            attributes: request.attributes,
            last_success_at: None,
            last_failure_at: None,
            success_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
            created_by: request.created_by.clone(),
            updated_by: request.created_by,
        };

        with_timeout(
            self.store_timeout,
            "insert_webhook",
            self.store.insert_webhook(webhook),
        )
        .await
    }

    /// Get a webhook; `NotFound` for unknown or deleted ids
    pub async fn get_webhook(&self, webhook_id: Uuid) -> Result<Webhook> {
        with_timeout(
            self.store_timeout,
            "find_webhook_by_id",
            self.store.find_webhook_by_id(webhook_id),
        )
        .await?
        .ok_or_else(|| IntegrationError::not_found(format!("Webhook not found: {}", webhook_id)))
    }

    /// List the webhooks of an integration
    pub async fn list_webhooks(&self, integration_id: &str) -> Result<Vec<Webhook>> {
        with_timeout(
            self.store_timeout,
            "list_webhooks_by_integration",
            self.store.list_webhooks_by_integration(integration_id),
        )
        .await
    }

    /// Every active webhook subscribed to `event_type`
    pub async fn find_active_webhooks_for_event(&self, event_type: &str) -> Result<Vec<Webhook>> {
        let webhooks = with_timeout(
            self.store_timeout,
            "find_active_webhooks_for_event",
            self.store.find_active_webhooks_for_event(event_type),
        )
        .await?;

        debug!("{} active webhooks for {}", webhooks.len(), event_type);
        Ok(webhooks)
    }

    /// Edit a webhook; every provided field is validated like on creation
    pub async fn update_webhook(&self, webhook_id: Uuid, mut patch: WebhookPatch) -> Result<Webhook> {
        if let Some(url) = patch.url.take() {
            patch.url = Some(self.validate_url(&url)?);
        }
        if let Some(events) = patch.events.take() {
            patch.events = Some(normalize_events(events)?);
        }
        if let Some(headers) = &patch.headers {
            validate_headers(headers)?;
        }
        if let Some(retry_config) = &patch.retry_config {
            retry_config
                .validate()
                .map_err(|e| IntegrationError::validation(format!("Invalid retry config: {}", e)))?;
        }

        info!("Updating webhook: {}", webhook_id);
        with_timeout(
            self.store_timeout,
            "update_webhook",
            self.store.update_webhook(webhook_id, patch),
        )
        .await
    }

    /// Re-enable an `inactive` webhook. Webhooks in `error` need `reactivate`.
    pub async fn enable(&self, webhook_id: Uuid, actor: &str) -> Result<Webhook> {
        let webhook = self.get_webhook(webhook_id).await?;
        if webhook.status == WebhookStatus::Error {
            return Err(IntegrationError::validation(
                "Webhook is in error state; reactivate it instead",
            ));
        }
        self.change_status(webhook_id, StatusChange::Reactivate, actor)
            .await
    }

    /// Stop deliveries to a webhook
    pub async fn disable(&self, webhook_id: Uuid, actor: &str) -> Result<Webhook> {
        self.change_status(webhook_id, StatusChange::Disable, actor)
            .await
    }

    /// Manual recovery from `error` (or `inactive`); resets the failure streak
    pub async fn reactivate(&self, webhook_id: Uuid, actor: &str) -> Result<Webhook> {
        self.change_status(webhook_id, StatusChange::Reactivate, actor)
            .await
    }

    async fn change_status(
        &self,
        webhook_id: Uuid,
        change: StatusChange,
        actor: &str,
    ) -> Result<Webhook> {
        let webhook = with_timeout(
            self.store_timeout,
            "update_webhook_status",
            self.store
                .update_webhook_status(webhook_id, change, Some(actor)),
        )
        .await?;

        info!(
            "Webhook {} is now {:?} ({:?} by {})",
            webhook_id, webhook.status, change, actor
        );
        Ok(webhook)
    }

    /// Tombstone a webhook
    pub async fn delete_webhook(&self, webhook_id: Uuid) -> Result<()> {
        info!("Deleting webhook: {}", webhook_id);
        with_timeout(
            self.store_timeout,
            "soft_delete_webhook",
            self.store.soft_delete_webhook(webhook_id, Utc::now()),
        )
        .await
    }

    /// Sign a payload with the webhook's secret
    pub fn sign_payload(&self, webhook: &Webhook, payload: &[u8]) -> Result<String> {
        crypto::sign(payload, webhook.secret.expose())
    }

    /// Verify a received signature header against the webhook's secret
    pub fn verify_payload(&self, webhook: &Webhook, payload: &[u8], signature: &str) -> Result<bool> {
        crypto::verify_signature_header(signature, payload, webhook.secret.expose())
    }

    /// Record the outcome of delivery attempt `attempt` and compute the
    /// retry decision from the webhook's policy
    pub async fn record_outcome(
        &self,
        webhook_id: Uuid,
        attempt: u32,
        success: bool,
        at: DateTime<Utc>,
    ) -> Result<(RetryDecision, Webhook)> {
        let webhook = with_timeout(
            self.store_timeout,
            "record_delivery_outcome",
            self.store.record_delivery_outcome(
                webhook_id,
                DeliveryOutcome { success, at },
                self.config.error_threshold,
            ),
        )
        .await?;

        if webhook.status == WebhookStatus::Error {
            warn!(
                "Webhook {} in error state after {} consecutive failures",
                webhook_id, webhook.consecutive_failures
            );
        }

        let decision = self.retry_decision(&webhook, attempt, success);
        Ok((decision, webhook))
    }

    /// Retry decision for attempt `attempt`; never retries a webhook that
    /// stopped being deliverable
    pub fn retry_decision(&self, webhook: &Webhook, attempt: u32, success: bool) -> RetryDecision {
        match webhook
            .retry_config
            .decide(success, attempt, self.config.max_retry_delay())
        {
            RetryDecision::RetryAfter(_) if !webhook.is_deliverable() => RetryDecision::GiveUp,
            decision => decision,
        }
    }

    fn validate_url(&self, raw: &str) -> Result<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(IntegrationError::validation("Webhook URL cannot be empty"));
        }

        let url = Url::parse(raw)
            .map_err(|e| IntegrationError::validation(format!("Invalid webhook URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(IntegrationError::validation(
                "Webhook URL must be HTTP or HTTPS",
            ));
        }
        if url.host_str().is_none() {
            return Err(IntegrationError::validation("Webhook URL must have a host"));
        }

        if !self.config.allow_private_urls {
            validate_url_against_ssrf(raw, "Webhook URL").map_err(IntegrationError::validation)?;
        }

        Ok(url.to_string())
    }
}

/// Trim, drop duplicates, keep first-seen order; at least one event required
fn normalize_events(events: Vec<String>) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(events.len());
    for event in events {
        let event = event.trim();
        if event.is_empty() {
            return Err(IntegrationError::validation("Event type cannot be empty"));
        }
        if !normalized.iter().any(|e| e == event) {
            normalized.push(event.to_string());
        }
    }

    if normalized.is_empty() {
        return Err(IntegrationError::validation(
            "Webhook must subscribe to at least one event",
        ));
    }
    Ok(normalized)
}

fn validate_headers(headers: &HashMap<String, String>) -> Result<()> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            IntegrationError::validation(format!("Invalid webhook header name: {}", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            IntegrationError::validation(format!("Invalid value for webhook header: {}", name))
        })?;
    }
    Ok(())
}
