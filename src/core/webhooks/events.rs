//! Webhook event builders
//!
//! This module provides convenience functions for building the platform's
//! common webhook events.

use super::types::WebhookEvent;

pub const DONATION_COMPLETED: &str = "donation.completed";
pub const DONATION_REFUNDED: &str = "donation.refunded";
pub const CAMPAIGN_GOAL_REACHED: &str = "campaign.goal_reached";
pub const PAYOUT_SENT: &str = "payout.sent";

/// Build donation completed event
pub fn donation_completed(
    donation_id: &str,
    artist_id: &str,
    amount: u64,
    currency: &str,
) -> WebhookEvent {
    WebhookEvent::new(
        DONATION_COMPLETED,
        serde_json::json!({
            "donation_id": donation_id,
            "artist_id": artist_id,
            "amount": amount,
            "currency": currency,
        }),
    )
}

/// Build donation refunded event
pub fn donation_refunded(donation_id: &str, artist_id: &str, reason: &str) -> WebhookEvent {
    WebhookEvent::new(
        DONATION_REFUNDED,
        serde_json::json!({
            "donation_id": donation_id,
            "artist_id": artist_id,
            "reason": reason,
        }),
    )
}

/// Build campaign goal reached event
pub fn campaign_goal_reached(
    campaign_id: &str,
    artist_id: &str,
    goal: u64,
    raised: u64,
) -> WebhookEvent {
    WebhookEvent::new(
        CAMPAIGN_GOAL_REACHED,
        serde_json::json!({
            "campaign_id": campaign_id,
            "artist_id": artist_id,
            "goal": goal,
            "raised": raised,
        }),
    )
}

/// Build payout sent event
pub fn payout_sent(payout_id: &str, artist_id: &str, amount: u64, currency: &str) -> WebhookEvent {
    WebhookEvent::new(
        PAYOUT_SENT,
        serde_json::json!({
            "payout_id": payout_id,
            "artist_id": artist_id,
            "amount": amount,
            "currency": currency,
        }),
    )
}
