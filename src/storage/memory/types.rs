use crate::core::models::ApiKey;
use crate::core::webhooks::Webhook;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory implementation of `ApiKeyStore` and `WebhookStore`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub(super) data: Arc<RwLock<MemoryData>>,
}

/// Consolidated store data, one lock for everything
#[derive(Debug, Default)]
pub(super) struct MemoryData {
    pub api_keys: HashMap<Uuid, ApiKey>,
    /// Digest uniqueness index, tombstoned keys included
    pub key_hashes: HashMap<String, Uuid>,
    pub webhooks: HashMap<Uuid, Webhook>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-tombstoned) API keys
    pub async fn api_key_count(&self) -> usize {
        let data = self.data.read().await;
        data.api_keys
            .values()
            .filter(|k| !k.metadata.is_deleted())
            .count()
    }
}
