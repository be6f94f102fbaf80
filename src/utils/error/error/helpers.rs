//! Helper functions for creating specific error types

use super::types::IntegrationError;

/// Message used for every rejected credential, whatever the reason.
pub(crate) const GENERIC_REJECTION: &str = "invalid credentials";

/// Helper functions for creating specific errors
impl IntegrationError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn store_unavailable<S: Into<String>>(message: S) -> Self {
        Self::StoreUnavailable(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn crypto<S: Into<String>>(message: S) -> Self {
        Self::Crypto(message.into())
    }

    /// The single rejection returned for unknown, expired, inactive or revoked keys
    pub fn unauthorized() -> Self {
        Self::Unauthorized(GENERIC_REJECTION.to_string())
    }

    /// Whether the caller may retry the failed operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::HttpClient(_))
    }
}
