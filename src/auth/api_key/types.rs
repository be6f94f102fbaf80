//! API key types and data structures
//!
//! This module contains request/response types for API key issuance.

use crate::core::models::{ApiKey, ApiKeyMetadata, Permission};
use crate::utils::auth::crypto::RawSecret;
use chrono::{DateTime, Utc};

/// API key issuance request
#[derive(Debug, Clone, Default)]
pub struct IssueApiKeyRequest {
    /// Display name
    pub name: String,
    /// Issuing provider / scope tag
    pub provider: String,
    /// Permissions for the key
    pub permissions: Vec<Permission>,
    /// Expiration date
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-form data
    pub attributes: ApiKeyMetadata,
    /// Creating actor
    pub created_by: Option<String>,
}

/// A freshly issued key.
///
/// `raw_key` exists only in this value; dropping it makes the key
/// unrecoverable. Its `Debug` output is redacted.
#[derive(Debug)]
pub struct IssuedApiKey {
    /// The persisted record (digest only)
    pub api_key: ApiKey,
    /// The raw key, returned exactly once
    pub raw_key: RawSecret,
}
