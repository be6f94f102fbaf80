//! Storage contracts
//!
//! The credential issuer and the webhook subsystem never own persistence.
//! They are handed a store implementing these traits at construction time;
//! `MemoryStore` is the in-process implementation.

pub mod memory;

pub use memory::MemoryStore;

use crate::core::models::{ApiKey, Permission};
use crate::core::webhooks::{DeliveryOutcome, StatusChange, Webhook, WebhookPatch};
use crate::utils::error::{IntegrationError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

/// Field edits for an API key; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct ApiKeyUpdate {
    pub permissions: Option<Vec<Permission>>,
    /// `Some(None)` clears the expiry
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Persistence contract for API keys.
///
/// Tombstoned keys behave as if they did not exist.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Persist a new key; `Conflict` if the id or digest is already present
    async fn insert_api_key(&self, api_key: ApiKey) -> Result<ApiKey>;

    async fn find_api_key_by_id(&self, key_id: Uuid) -> Result<Option<ApiKey>>;

    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>>;

    async fn list_api_keys_by_creator(&self, created_by: &str) -> Result<Vec<ApiKey>>;

    /// Atomically check that the key matches `candidate_hash` and is usable at
    /// `at`, and if so increment its usage counter and set its last-used time.
    /// Returns the updated key, or `None` if the check failed.
    async fn record_api_key_use(
        &self,
        key_id: Uuid,
        candidate_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<ApiKey>>;

    /// Revoke the key; revoking a revoked key returns it unchanged
    async fn revoke_api_key(
        &self,
        key_id: Uuid,
        actor: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<ApiKey>;

    async fn update_api_key(&self, key_id: Uuid, update: ApiKeyUpdate) -> Result<ApiKey>;

    async fn soft_delete_api_key(&self, key_id: Uuid, at: DateTime<Utc>) -> Result<()>;
}

/// Persistence contract for webhook subscriptions.
///
/// Tombstoned webhooks behave as if they did not exist.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    async fn insert_webhook(&self, webhook: Webhook) -> Result<Webhook>;

    async fn find_webhook_by_id(&self, webhook_id: Uuid) -> Result<Option<Webhook>>;

    async fn list_webhooks_by_integration(&self, integration_id: &str) -> Result<Vec<Webhook>>;

    /// Every active webhook subscribed to `event_type`, each exactly once, in
    /// a stable order (creation time, then id)
    async fn find_active_webhooks_for_event(&self, event_type: &str) -> Result<Vec<Webhook>>;

    async fn update_webhook(&self, webhook_id: Uuid, patch: WebhookPatch) -> Result<Webhook>;

    async fn update_webhook_status(
        &self,
        webhook_id: Uuid,
        change: StatusChange,
        actor: Option<&str>,
    ) -> Result<Webhook>;

    /// Update counters, timestamps and status for one delivery attempt
    async fn record_delivery_outcome(
        &self,
        webhook_id: Uuid,
        outcome: DeliveryOutcome,
        error_threshold: u32,
    ) -> Result<Webhook>;

    async fn soft_delete_webhook(&self, webhook_id: Uuid, at: DateTime<Utc>) -> Result<()>;
}

/// Bound a store call; an elapsed call fails with `StoreUnavailable`.
///
/// The store future is dropped on timeout, so implementations must apply a
/// mutation only at their final, non-suspending step.
pub async fn with_timeout<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(IntegrationError::store_unavailable(format!(
            "{} timed out after {}ms",
            operation,
            limit.as_millis()
        ))),
    }
}
