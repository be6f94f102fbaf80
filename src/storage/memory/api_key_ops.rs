use super::types::{MemoryData, MemoryStore};
use crate::core::models::ApiKey;
use crate::storage::{ApiKeyStore, ApiKeyUpdate};
use crate::utils::error::{IntegrationError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

impl MemoryData {
    fn live_key_mut(&mut self, key_id: Uuid) -> Result<&mut ApiKey> {
        self.api_keys
            .get_mut(&key_id)
            .filter(|k| !k.metadata.is_deleted())
            .ok_or_else(|| IntegrationError::not_found(format!("API key not found: {}", key_id)))
    }
}

#[async_trait]
impl ApiKeyStore for MemoryStore {
    async fn insert_api_key(&self, api_key: ApiKey) -> Result<ApiKey> {
        let mut data = self.data.write().await;

        if data.api_keys.contains_key(&api_key.id()) {
            return Err(IntegrationError::conflict(format!(
                "API key id already exists: {}",
                api_key.id()
            )));
        }
        if data.key_hashes.contains_key(&api_key.key_hash) {
            return Err(IntegrationError::conflict("API key digest already exists"));
        }

        data.key_hashes.insert(api_key.key_hash.clone(), api_key.id());
        data.api_keys.insert(api_key.id(), api_key.clone());
        Ok(api_key)
    }

    async fn find_api_key_by_id(&self, key_id: Uuid) -> Result<Option<ApiKey>> {
        let data = self.data.read().await;
        Ok(data
            .api_keys
            .get(&key_id)
            .filter(|k| !k.metadata.is_deleted())
            .cloned())
    }

    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        let data = self.data.read().await;
        Ok(data
            .key_hashes
            .get(key_hash)
            .and_then(|id| data.api_keys.get(id))
            .filter(|k| !k.metadata.is_deleted())
            .cloned())
    }

    async fn list_api_keys_by_creator(&self, created_by: &str) -> Result<Vec<ApiKey>> {
        let data = self.data.read().await;
        let mut keys: Vec<ApiKey> = data
            .api_keys
            .values()
            .filter(|k| !k.metadata.is_deleted())
            .filter(|k| k.created_by.as_deref() == Some(created_by))
            .cloned()
            .collect();
        keys.sort_by(|a, b| {
            a.metadata
                .created_at
                .cmp(&b.metadata.created_at)
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(keys)
    }

    async fn record_api_key_use(
        &self,
        key_id: Uuid,
        candidate_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<ApiKey>> {
        let mut data = self.data.write().await;

        let Some(api_key) = data
            .api_keys
            .get_mut(&key_id)
            .filter(|k| !k.metadata.is_deleted())
        else {
            return Ok(None);
        };

        if !api_key.matches_digest(candidate_hash) || !api_key.is_usable_at(at) {
            debug!("API key use rejected: {}", key_id);
            return Ok(None);
        }

        api_key.record_use(at);
        Ok(Some(api_key.clone()))
    }

    async fn revoke_api_key(
        &self,
        key_id: Uuid,
        actor: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<ApiKey> {
        let mut data = self.data.write().await;
        let api_key = data.live_key_mut(key_id)?;
        api_key.revoke(actor, reason, at);
        Ok(api_key.clone())
    }

    async fn update_api_key(&self, key_id: Uuid, update: ApiKeyUpdate) -> Result<ApiKey> {
        let mut data = self.data.write().await;
        let api_key = data.live_key_mut(key_id)?;

        if let Some(permissions) = update.permissions {
            api_key.permissions = permissions;
        }
        if let Some(expires_at) = update.expires_at {
            api_key.expires_at = expires_at;
        }
        api_key.metadata.touch();

        Ok(api_key.clone())
    }

    async fn soft_delete_api_key(&self, key_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut data = self.data.write().await;
        data.live_key_mut(key_id)?.metadata.mark_deleted(at);
        Ok(())
    }
}
