//! API key issuance and validation
//!
//! This module provides methods for issuing and validating API keys.

use super::types::{IssueApiKeyRequest, IssuedApiKey};
use crate::config::{CredentialConfig, StoreConfig};
use crate::core::models::{ApiKey, ApiKeyStatus, Metadata, Permission};
use crate::storage::{ApiKeyStore, with_timeout};
use crate::utils::auth::crypto::keys::{extract_key_prefix, generate_secret_with_len, hash_secret};
use crate::utils::error::{IntegrationError, Result};
use chrono::Utc;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// API key handler for issuance and validation
#[derive(Clone)]
pub struct ApiKeyHandler {
    /// Injected persistence
    pub(super) store: Arc<dyn ApiKeyStore>,
    /// Issuance settings
    pub(super) config: CredentialConfig,
    /// Bound for each store call
    pub(super) store_timeout: Duration,
}

impl std::fmt::Debug for ApiKeyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyHandler")
            .field("config", &self.config)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}

impl ApiKeyHandler {
    /// Create a new API key handler
    pub fn new(
        store: Arc<dyn ApiKeyStore>,
        config: CredentialConfig,
        store_config: &StoreConfig,
    ) -> Self {
        Self {
            store,
            config,
            store_timeout: store_config.timeout(),
        }
    }

    /// Issue a new API key
    pub async fn issue(
        &self,
        name: &str,
        provider: &str,
        permissions: Vec<Permission>,
    ) -> Result<IssuedApiKey> {
        self.issue_with_options(IssueApiKeyRequest {
            name: name.to_string(),
            provider: provider.to_string(),
            permissions,
            ..Default::default()
        })
        .await
    }

    /// Issue an API key with full options.
    ///
    /// The raw key is generated, digested and dropped from the record in one
    /// step, so no caller can persist a key without its digest.
    pub async fn issue_with_options(&self, request: IssueApiKeyRequest) -> Result<IssuedApiKey> {
        let name = request.name.trim();
        let provider = request.provider.trim();

        if name.is_empty() {
            return Err(IntegrationError::validation("API key name must not be empty"));
        }
        if provider.is_empty() {
            return Err(IntegrationError::validation(
                "API key provider must not be empty",
            ));
        }

        let raw_key = generate_secret_with_len(self.config.secret_bytes)?;
        let key_hash = hash_secret(raw_key.expose_secret());
        let key_prefix = extract_key_prefix(raw_key.expose_secret());

        let api_key = ApiKey {
            metadata: Metadata::new(),
            name: name.to_string(),
            key_hash,
            key_prefix,
            provider: provider.to_string(),
            status: ApiKeyStatus::Active,
            expires_at: request.expires_at,
            last_used_at: None,
            usage_count: 0,
            permissions: request.permissions,
            attributes: request.attributes,
            created_by: request.created_by,
            revocation: None,
        };

        let stored = with_timeout(
            self.store_timeout,
            "insert_api_key",
            self.store.insert_api_key(api_key),
        )
        .await?;

        info!("API key issued: {} (provider={})", stored.id(), stored.provider);
        Ok(IssuedApiKey {
            api_key: stored,
            raw_key,
        })
    }

    /// Validate a candidate key against a record.
    ///
    /// On success the usage counter and last-used time are updated in the
    /// same store operation as the check. Mismatch, expiry, non-active status
    /// and a missing record all yield `Ok(false)`; only store failures error.
    pub async fn validate(&self, candidate: &str, record: &ApiKey) -> Result<bool> {
        if candidate.is_empty() {
            return Ok(false);
        }

        let candidate_hash = hash_secret(candidate);
        let used = with_timeout(
            self.store_timeout,
            "record_api_key_use",
            self.store
                .record_api_key_use(record.id(), &candidate_hash, Utc::now()),
        )
        .await?;

        debug!("API key validation for {}: {}", record.id(), used.is_some());
        Ok(used.is_some())
    }

    /// Look a key up by its digest and count the use.
    ///
    /// Returns the updated record, or `None` for any kind of rejection.
    pub async fn authenticate(&self, candidate: &str) -> Result<Option<ApiKey>> {
        if candidate.is_empty() {
            return Ok(None);
        }

        let candidate_hash = hash_secret(candidate);
        let Some(found) = with_timeout(
            self.store_timeout,
            "find_api_key_by_hash",
            self.store.find_api_key_by_hash(&candidate_hash),
        )
        .await?
        else {
            debug!("API key not found");
            return Ok(None);
        };

        with_timeout(
            self.store_timeout,
            "record_api_key_use",
            self.store
                .record_api_key_use(found.id(), &candidate_hash, Utc::now()),
        )
        .await
    }

    /// Like `authenticate`, but every rejection becomes the same
    /// `Unauthorized` error
    pub async fn require(&self, candidate: &str) -> Result<ApiKey> {
        self.authenticate(candidate)
            .await?
            .ok_or_else(IntegrationError::unauthorized)
    }
}
