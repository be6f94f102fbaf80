//! Webhook type definitions
//!
//! This module contains the webhook record, its status machine, payload
//! filters and the delivery envelope.

use super::retry::RetryConfig;
use crate::core::models::Metadata;
use crate::utils::auth::crypto::SigningSecret;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Webhook status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    /// Receiving deliveries
    Active,
    /// Explicitly disabled
    Inactive,
    /// Too many consecutive delivery failures
    Error,
}

/// Inputs of the webhook status machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// A delivery failed; `consecutive_failures` includes this one
    DeliveryFailed {
        consecutive_failures: u32,
        threshold: u32,
    },
    /// Manual reactivation (`error` or `inactive` back to `active`)
    Reactivate,
    /// Explicit disable
    Disable,
}

impl WebhookStatus {
    /// Next status after `change`. Every input is defined for every state.
    pub fn apply(self, change: StatusChange) -> WebhookStatus {
        match (self, change) {
            (
                WebhookStatus::Active,
                StatusChange::DeliveryFailed {
                    consecutive_failures,
                    threshold,
                },
            ) if consecutive_failures >= threshold => WebhookStatus::Error,
            (status, StatusChange::DeliveryFailed { .. }) => status,
            (_, StatusChange::Reactivate) => WebhookStatus::Active,
            (_, StatusChange::Disable) => WebhookStatus::Inactive,
        }
    }
}

/// Only deliver events whose data has `equals` at the dotted `field` path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookFilter {
    /// Dotted path into the event data, e.g. `campaign.id`
    pub field: String,
    /// Required value
    pub equals: serde_json::Value,
}

impl WebhookFilter {
    pub fn matches(&self, data: &serde_json::Value) -> bool {
        data.pointer(&self.json_pointer()) == Some(&self.equals)
    }

    /// RFC 6901 pointer for `field`, one reference token per dotted segment
    fn json_pointer(&self) -> String {
        self.field
            .split('.')
            .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
            .collect()
    }
}

/// Result of a single delivery attempt as reported to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub at: DateTime<Utc>,
}

/// Field edits accepted by `update_webhook`; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct WebhookPatch {
    pub url: Option<String>,
    pub events: Option<Vec<String>>,
    pub filters: Option<Vec<WebhookFilter>>,
    pub headers: Option<HashMap<String, String>>,
    pub retry_config: Option<RetryConfig>,
    pub updated_by: Option<String>,
}

/// Webhook subscription record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    /// Metadata
    #[serde(flatten)]
    pub metadata: Metadata,
    /// Owning integration
    pub integration_id: String,
    /// Destination URL
    pub url: String,
    /// Subscribed event types
    pub events: Vec<String>,
    /// HMAC key for every delivery to this endpoint
    pub secret: SigningSecret,
    /// Status
    pub status: WebhookStatus,
    /// Protocol version tag
    pub version: String,
    /// Retry policy
    pub retry_config: RetryConfig,
    /// Payload filters, all of which must match
    #[serde(default)]
    pub filters: Vec<WebhookFilter>,
    /// Extra headers sent with each delivery
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Free-form data
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub success_count: u64,
    pub failure_count: u64,
    /// Failures since the last success
    #[serde(default)]
    pub consecutive_failures: u32,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl Webhook {
    pub fn id(&self) -> Uuid {
        self.metadata.id
    }

    /// Active and not tombstoned
    pub fn is_deliverable(&self) -> bool {
        self.status == WebhookStatus::Active && !self.metadata.is_deleted()
    }

    pub fn subscribes_to(&self, event_type: &str) -> bool {
        self.events.iter().any(|e| e == event_type)
    }

    /// Whether every filter matches the event data
    pub fn accepts(&self, data: &serde_json::Value) -> bool {
        self.filters.iter().all(|f| f.matches(data))
    }

    /// Apply a status change. Returns the previous status when it changed.
    /// Reactivation also clears the failure streak.
    pub fn change_status(&mut self, change: StatusChange, actor: Option<&str>) -> Option<WebhookStatus> {
        let previous = self.status;
        self.status = previous.apply(change);
        if change == StatusChange::Reactivate {
            self.consecutive_failures = 0;
        }
        if let Some(actor) = actor {
            self.updated_by = Some(actor.to_string());
        }
        self.metadata.touch();
        (previous != self.status).then_some(previous)
    }

    /// Update counters and timestamps for one delivery attempt, moving the
    /// webhook to `error` once `error_threshold` consecutive failures are reached.
    /// Returns the previous status when it changed.
    pub fn apply_outcome(
        &mut self,
        outcome: DeliveryOutcome,
        error_threshold: u32,
    ) -> Option<WebhookStatus> {
        if outcome.success {
            self.success_count += 1;
            self.last_success_at = Some(outcome.at);
            self.consecutive_failures = 0;
            self.metadata.touch();
            return None;
        }

        self.failure_count += 1;
        self.last_failure_at = Some(outcome.at);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.change_status(
            StatusChange::DeliveryFailed {
                consecutive_failures: self.consecutive_failures,
                threshold: error_threshold,
            },
            None,
        )
    }

    /// Apply field edits; validation happens before the patch reaches the store
    pub fn apply_patch(&mut self, patch: WebhookPatch) {
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(events) = patch.events {
            self.events = events;
        }
        if let Some(filters) = patch.filters {
            self.filters = filters;
        }
        if let Some(headers) = patch.headers {
            self.headers = headers;
        }
        if let Some(retry_config) = patch.retry_config {
            self.retry_config = retry_config;
        }
        if patch.updated_by.is_some() {
            self.updated_by = patch.updated_by;
        }
        self.metadata.touch();
    }
}

/// Delivered event envelope; this is the signed request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event id
    pub id: Uuid,
    /// Event type, e.g. `donation.completed`
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event timestamp
    pub created_at: DateTime<Utc>,
    /// Event data
    pub data: serde_json::Value,
}

impl WebhookEvent {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            created_at: Utc::now(),
            data,
        }
    }
}

/// What the caller should do after a delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Delivered, nothing left to do
    Delivered,
    /// Try again after the delay
    RetryAfter(Duration),
    /// Policy exhausted
    GiveUp,
}

/// Result of one delivery attempt to one webhook
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub webhook_id: Uuid,
    pub delivery_id: Uuid,
    pub attempt: u32,
    pub status_code: Option<u16>,
    pub success: bool,
    pub error: Option<String>,
    pub decision: RetryDecision,
    /// Webhook status after the outcome was recorded, or as loaded when
    /// recording failed
    pub webhook_status: WebhookStatus,
    /// Set when the attempt happened but its outcome could not be recorded
    pub record_error: Option<String>,
}
