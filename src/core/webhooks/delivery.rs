//! Webhook delivery
//!
//! This module performs single delivery attempts: it serialises an event
//! once, signs those exact bytes and POSTs them to every matching webhook.

use super::manager::WebhookHandler;
use super::types::{DeliveryReport, RetryDecision, Webhook, WebhookEvent};
use crate::utils::error::{IntegrationError, Result};
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Sends events to subscribed webhooks, one attempt per call
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    handler: WebhookHandler,
    client: Client,
}

impl WebhookDispatcher {
    /// Create a dispatcher using the handler's delivery settings
    pub fn new(handler: WebhookHandler) -> Result<Self> {
        let client = Client::builder()
            .timeout(handler.config().request_timeout())
            .user_agent(handler.config().user_agent.clone())
            .build()?;

        Ok(Self { handler, client })
    }

    /// The handler deliveries are recorded through
    pub fn handler(&self) -> &WebhookHandler {
        &self.handler
    }

    /// Build an event and dispatch it
    pub async fn send_event(
        &self,
        event_type: &str,
        data: serde_json::Value,
    ) -> Result<Vec<DeliveryReport>> {
        self.dispatch(&WebhookEvent::new(event_type, data)).await
    }

    /// Deliver `event` to every active, subscribed webhook whose filters match.
    ///
    /// Attempts run concurrently and every matching webhook gets a report.
    /// Only failures before any request is sent (serialisation, lookup, an
    /// event type that cannot be sent as a header) are returned as errors, so
    /// an `Err` never hides a delivery that already went out.
    pub async fn dispatch(&self, event: &WebhookEvent) -> Result<Vec<DeliveryReport>> {
        let body = serde_json::to_vec(event)?;
        HeaderValue::from_str(&event.event_type).map_err(|_| {
            IntegrationError::validation(format!("Invalid event type: {}", event.event_type))
        })?;

        let webhooks: Vec<Webhook> = self
            .handler
            .find_active_webhooks_for_event(&event.event_type)
            .await?
            .into_iter()
            .filter(|webhook| webhook.accepts(&event.data))
            .collect();

        debug!(
            "Dispatching {} ({}) to {} webhooks",
            event.event_type,
            event.id,
            webhooks.len()
        );

        let body = body.as_slice();
        let event_type = event.event_type.as_str();
        let reports = join_all(webhooks.iter().map(|webhook| async move {
            match self.deliver(webhook, event_type, body, 1).await {
                Ok(report) => report,
                Err(e) => {
                    error!("Webhook {} not sent: {}", webhook.id(), e);
                    DeliveryReport {
                        webhook_id: webhook.id(),
                        delivery_id: Uuid::new_v4(),
                        attempt: 1,
                        status_code: None,
                        success: false,
                        error: Some(format!("Not sent: {}", e)),
                        decision: RetryDecision::GiveUp,
                        webhook_status: webhook.status,
                        record_error: None,
                    }
                }
            }
        }))
        .await;

        Ok(reports)
    }

    /// Make delivery attempt number `attempt` of `body` to one webhook and
    /// record its outcome.
    ///
    /// The caller owns any retry loop: `DeliveryReport::decision` says whether
    /// and when to call this again with `attempt + 1`. Errors are returned
    /// only when nothing was sent; once the request went out, a failure to
    /// record the outcome is carried in `DeliveryReport::record_error`.
    pub async fn deliver(
        &self,
        webhook: &Webhook,
        event_type: &str,
        body: &[u8],
        attempt: u32,
    ) -> Result<DeliveryReport> {
        let config = self.handler.config();
        let delivery_id = Uuid::new_v4();
        let delivery_id_value = delivery_id.to_string();
        let signature = self.handler.sign_payload(webhook, body)?;

        let mut headers = HeaderMap::with_capacity(webhook.headers.len() + 5);
        for (name, value) in &webhook.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Skipping invalid header {} on webhook {}", name, webhook.id()),
            }
        }

        // Inserted last so custom headers can never replace them
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in [
            (config.signature_header.as_str(), signature.as_str()),
            (config.event_header.as_str(), event_type),
            (config.delivery_id_header.as_str(), delivery_id_value.as_str()),
            (config.version_header.as_str(), webhook.version.as_str()),
        ] {
            let (name, value) = protocol_header(name, value)?;
            headers.insert(name, value);
        }

        let request = self
            .client
            .post(&webhook.url)
            .headers(headers)
            .body(body.to_vec());

        let (status_code, error) = match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    (Some(status.as_u16()), None)
                } else {
                    (
                        Some(status.as_u16()),
                        Some(format!("Webhook returned status {}", status.as_u16())),
                    )
                }
            }
            Err(e) => (e.status().map(|s| s.as_u16()), Some(e.to_string())),
        };
        let success = error.is_none();

        match &error {
            None => debug!(
                "Webhook delivered successfully: {} -> {}",
                webhook.id(),
                webhook.url
            ),
            Some(e) => warn!(
                "Webhook delivery {} to {} failed (attempt {}): {}",
                delivery_id,
                webhook.id(),
                attempt,
                e
            ),
        }

        let (decision, webhook_status, record_error) = match self
            .handler
            .record_outcome(webhook.id(), attempt, success, Utc::now())
            .await
        {
            Ok((decision, updated)) => (decision, updated.status, None),
            Err(e) => {
                error!(
                    "Failed to record outcome of delivery {}: {}",
                    delivery_id, e
                );
                let decision = match &e {
                    IntegrationError::NotFound(_) if !success => RetryDecision::GiveUp,
                    _ => self.handler.retry_decision(webhook, attempt, success),
                };
                (decision, webhook.status, Some(e.to_string()))
            }
        };

        Ok(DeliveryReport {
            webhook_id: webhook.id(),
            delivery_id,
            attempt,
            status_code,
            success,
            error,
            decision,
            webhook_status,
            record_error,
        })
    }

    /// Re-send a stored webhook by id; `NotFound` when it is gone
    pub async fn redeliver(
        &self,
        webhook_id: Uuid,
        event: &WebhookEvent,
        attempt: u32,
    ) -> Result<DeliveryReport> {
        let webhook = self.handler.get_webhook(webhook_id).await?;
        if !webhook.is_deliverable() {
            return Err(IntegrationError::validation(format!(
                "Webhook {} is not active",
                webhook_id
            )));
        }
        let body = serde_json::to_vec(event)?;
        self.deliver(&webhook, &event.event_type, &body, attempt)
            .await
    }
}

fn protocol_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| IntegrationError::config(format!("Invalid header name: {}", name)))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| IntegrationError::validation(format!("Invalid value for header {}", name)))?;
    Ok((header_name, header_value))
}
