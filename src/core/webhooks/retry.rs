//! Retry policy for webhook deliveries
//!
//! The policy only computes decisions; sleeping and re-sending is left to the
//! caller.

use super::types::RetryDecision;
use crate::config::Validate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration stored with each webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Factor applied to the delay after each failed attempt
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Delay after the first failed attempt
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_multiplier: default_backoff_multiplier(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// Delay to wait after failed attempt number `attempt` (1-based), capped
    pub fn delay_for_attempt(&self, attempt: u32, cap: Duration) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);

        if !millis.is_finite() || millis >= cap.as_millis() as f64 {
            cap
        } else {
            Duration::from_millis(millis as u64)
        }
    }

    /// Delay before the next attempt, or `None` once `failed_attempt` used up the policy
    pub fn next_retry(&self, failed_attempt: u32, cap: Duration) -> Option<Duration> {
        if failed_attempt >= self.max_attempts {
            return None;
        }
        Some(self.delay_for_attempt(failed_attempt, cap))
    }

    /// Decide what follows attempt number `attempt`
    pub fn decide(&self, success: bool, attempt: u32, cap: Duration) -> RetryDecision {
        if success {
            return RetryDecision::Delivered;
        }
        match self.next_retry(attempt, cap) {
            Some(delay) => RetryDecision::RetryAfter(delay),
            None => RetryDecision::GiveUp,
        }
    }
}

impl Validate for RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err("backoff_multiplier must be a finite number >= 1.0".to_string());
        }
        if self.initial_delay_ms == 0 {
            return Err("initial_delay_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_initial_delay_ms() -> u64 {
    1000
}
