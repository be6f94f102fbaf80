//! Webhook integration system
//!
//! This module provides webhook registration, payload signing and delivery
//! for external system integration.

mod delivery;
pub mod events;
mod manager;
mod retry;
mod types;

pub use delivery::WebhookDispatcher;
pub use manager::{CreateWebhookRequest, WebhookHandler};
pub use retry::RetryConfig;
pub use types::{
    DeliveryOutcome, DeliveryReport, RetryDecision, StatusChange, Webhook, WebhookEvent,
    WebhookFilter, WebhookPatch, WebhookStatus,
};
