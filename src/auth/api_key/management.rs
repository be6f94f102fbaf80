//! API key management operations
//!
//! This module provides methods for managing API keys (revoke, rotate, update, list).

use super::creation::ApiKeyHandler;
use super::types::{IssueApiKeyRequest, IssuedApiKey};
use crate::core::models::{ApiKey, Permission};
use crate::storage::{ApiKeyUpdate, with_timeout};
use crate::utils::error::{IntegrationError, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Revocation reason recorded by `rotate_key`
pub const ROTATION_REASON: &str = "rotated";

/// Revocation reason for a replacement key whose rotation did not complete
pub const ROTATION_ABORTED_REASON: &str = "rotation aborted";

impl ApiKeyHandler {
    /// Revoke an API key.
    ///
    /// Revoking an already revoked key returns it unchanged.
    pub async fn revoke(&self, key_id: Uuid, actor: &str, reason: &str) -> Result<ApiKey> {
        let api_key = with_timeout(
            self.store_timeout,
            "revoke_api_key",
            self.store.revoke_api_key(key_id, actor, reason, Utc::now()),
        )
        .await?;

        info!("API key revoked: {} by {}", key_id, actor);
        Ok(api_key)
    }

    /// Issue a replacement with the same properties, then revoke the old key
    pub async fn rotate_key(&self, key_id: Uuid, actor: &str) -> Result<IssuedApiKey> {
        info!("Rotating API key: {}", key_id);

        let old_key = self
            .get_key(key_id)
            .await?
            .ok_or_else(|| IntegrationError::not_found(format!("API key not found: {}", key_id)))?;

        if old_key.is_revoked() {
            return Err(IntegrationError::validation(
                "Revoked API keys cannot be rotated",
            ));
        }

        let issued = self
            .issue_with_options(IssueApiKeyRequest {
                name: old_key.name.clone(),
                provider: old_key.provider.clone(),
                permissions: old_key.permissions.clone(),
                expires_at: old_key.expires_at,
                attributes: old_key.attributes.clone(),
                created_by: Some(actor.to_string()),
            })
            .await?;

        // Only one of the two keys may stay active
        if let Err(e) = self.revoke(key_id, actor, ROTATION_REASON).await {
            warn!("Rotation of API key {} failed, revoking replacement: {}", key_id, e);
            if let Err(rollback) = self
                .revoke(issued.api_key.id(), actor, ROTATION_ABORTED_REASON)
                .await
            {
                error!(
                    "Replacement API key {} is still active: {}",
                    issued.api_key.id(),
                    rollback
                );
            }
            return Err(e);
        }

        info!(
            "API key rotated: {} -> {}",
            key_id,
            issued.api_key.id()
        );
        Ok(issued)
    }

    /// Replace the permissions of a key
    pub async fn update_permissions(
        &self,
        key_id: Uuid,
        permissions: Vec<Permission>,
    ) -> Result<ApiKey> {
        info!("Updating permissions for API key: {}", key_id);
        self.update(
            key_id,
            ApiKeyUpdate {
                permissions: Some(permissions),
                ..Default::default()
            },
        )
        .await
    }

    /// Set or clear the expiry of a key
    pub async fn update_expiration(
        &self,
        key_id: Uuid,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ApiKey> {
        info!("Updating expiration for API key: {}", key_id);
        self.update(
            key_id,
            ApiKeyUpdate {
                expires_at: Some(expires_at),
                ..Default::default()
            },
        )
        .await
    }

    async fn update(&self, key_id: Uuid, update: ApiKeyUpdate) -> Result<ApiKey> {
        with_timeout(
            self.store_timeout,
            "update_api_key",
            self.store.update_api_key(key_id, update),
        )
        .await
    }

    /// Get API key by ID
    pub async fn get_key(&self, key_id: Uuid) -> Result<Option<ApiKey>> {
        with_timeout(
            self.store_timeout,
            "find_api_key_by_id",
            self.store.find_api_key_by_id(key_id),
        )
        .await
    }

    /// List the keys created by an actor
    pub async fn list_keys(&self, created_by: &str) -> Result<Vec<ApiKey>> {
        debug!("Listing API keys for: {}", created_by);
        with_timeout(
            self.store_timeout,
            "list_api_keys_by_creator",
            self.store.list_api_keys_by_creator(created_by),
        )
        .await
    }

    /// Tombstone a key
    pub async fn delete_key(&self, key_id: Uuid) -> Result<()> {
        info!("Deleting API key: {}", key_id);
        with_timeout(
            self.store_timeout,
            "soft_delete_api_key",
            self.store.soft_delete_api_key(key_id, Utc::now()),
        )
        .await
    }
}
