use super::types::{MemoryData, MemoryStore};
use crate::core::webhooks::{DeliveryOutcome, StatusChange, Webhook, WebhookPatch};
use crate::storage::WebhookStore;
use crate::utils::error::{IntegrationError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

impl MemoryData {
    fn live_webhook_mut(&mut self, webhook_id: Uuid) -> Result<&mut Webhook> {
        self.webhooks
            .get_mut(&webhook_id)
            .filter(|w| !w.metadata.is_deleted())
            .ok_or_else(|| IntegrationError::not_found(format!("Webhook not found: {}", webhook_id)))
    }
}

fn sort_by_creation(webhooks: &mut [Webhook]) {
    webhooks.sort_by(|a, b| {
        a.metadata
            .created_at
            .cmp(&b.metadata.created_at)
            .then_with(|| a.id().cmp(&b.id()))
    });
}

#[async_trait]
impl WebhookStore for MemoryStore {
    async fn insert_webhook(&self, webhook: Webhook) -> Result<Webhook> {
        let mut data = self.data.write().await;
        if data.webhooks.contains_key(&webhook.id()) {
            return Err(IntegrationError::conflict(format!(
                "Webhook id already exists: {}",
                webhook.id()
            )));
        }
        data.webhooks.insert(webhook.id(), webhook.clone());
        Ok(webhook)
    }

    async fn find_webhook_by_id(&self, webhook_id: Uuid) -> Result<Option<Webhook>> {
        let data = self.data.read().await;
        Ok(data
            .webhooks
            .get(&webhook_id)
            .filter(|w| !w.metadata.is_deleted())
            .cloned())
    }

    async fn list_webhooks_by_integration(&self, integration_id: &str) -> Result<Vec<Webhook>> {
        let data = self.data.read().await;
        let mut webhooks: Vec<Webhook> = data
            .webhooks
            .values()
            .filter(|w| !w.metadata.is_deleted() && w.integration_id == integration_id)
            .cloned()
            .collect();
        sort_by_creation(&mut webhooks);
        Ok(webhooks)
    }

    async fn find_active_webhooks_for_event(&self, event_type: &str) -> Result<Vec<Webhook>> {
        let data = self.data.read().await;
        let mut webhooks: Vec<Webhook> = data
            .webhooks
            .values()
            .filter(|w| w.is_deliverable() && w.subscribes_to(event_type))
            .cloned()
            .collect();
        sort_by_creation(&mut webhooks);
        Ok(webhooks)
    }

    async fn update_webhook(&self, webhook_id: Uuid, patch: WebhookPatch) -> Result<Webhook> {
        let mut data = self.data.write().await;
        let webhook = data.live_webhook_mut(webhook_id)?;
        webhook.apply_patch(patch);
        Ok(webhook.clone())
    }

    async fn update_webhook_status(
        &self,
        webhook_id: Uuid,
        change: StatusChange,
        actor: Option<&str>,
    ) -> Result<Webhook> {
        let mut data = self.data.write().await;
        let webhook = data.live_webhook_mut(webhook_id)?;
        webhook.change_status(change, actor);
        Ok(webhook.clone())
    }

    async fn record_delivery_outcome(
        &self,
        webhook_id: Uuid,
        outcome: DeliveryOutcome,
        error_threshold: u32,
    ) -> Result<Webhook> {
        let mut data = self.data.write().await;
        let webhook = data.live_webhook_mut(webhook_id)?;
        webhook.apply_outcome(outcome, error_threshold);
        Ok(webhook.clone())
    }

    async fn soft_delete_webhook(&self, webhook_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut data = self.data.write().await;
        data.live_webhook_mut(webhook_id)?.metadata.mark_deleted(at);
        Ok(())
    }
}
