//! API key record

use super::{Metadata, Permission};
use crate::utils::auth::crypto::hmac::constant_time_eq;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// API key lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatus {
    Active,
    Inactive,
    /// Terminal
    Revoked,
}

/// Who revoked a key, when and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revocation {
    pub revoked_by: String,
    pub revoked_at: DateTime<Utc>,
    pub reason: String,
}

/// Free-form data attached to a key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyMetadata {
    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque provider-specific data
    #[serde(default)]
    pub provider_data: HashMap<String, serde_json::Value>,
}

/// API key information
///
/// Only the SHA-256 digest of the raw key is kept; the raw key leaves the
/// issuer once and is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Metadata
    #[serde(flatten)]
    pub metadata: Metadata,
    /// Display name
    pub name: String,
    /// Hex SHA-256 digest of the raw key
    pub key_hash: String,
    /// Masked form of the raw key for identification
    pub key_prefix: String,
    /// Issuing provider / scope tag
    pub provider: String,
    /// Lifecycle status
    pub status: ApiKeyStatus,
    /// Expiration date
    pub expires_at: Option<DateTime<Utc>>,
    /// Last successful validation
    pub last_used_at: Option<DateTime<Utc>>,
    /// Number of successful validations
    pub usage_count: u64,
    /// Granted permissions
    pub permissions: Vec<Permission>,
    /// Free-form data
    #[serde(default)]
    pub attributes: ApiKeyMetadata,
    /// Creating actor
    pub created_by: Option<String>,
    /// Set once the key is revoked
    pub revocation: Option<Revocation>,
}

impl ApiKey {
    pub fn id(&self) -> uuid::Uuid {
        self.metadata.id
    }

    /// Active, not expired at `now` and not tombstoned
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ApiKeyStatus::Active
            && !self.metadata.is_deleted()
            && self.expires_at.is_none_or(|expires_at| now < expires_at)
    }

    /// Compare a candidate digest against the stored one in constant time
    pub fn matches_digest(&self, digest: &str) -> bool {
        constant_time_eq(self.key_hash.as_bytes(), digest.as_bytes())
    }

    pub fn is_revoked(&self) -> bool {
        self.status == ApiKeyStatus::Revoked
    }

    /// Move the key to `Revoked`. Returns `false` if it already was.
    pub fn revoke(&mut self, actor: &str, reason: &str, at: DateTime<Utc>) -> bool {
        if self.is_revoked() {
            return false;
        }

        self.status = ApiKeyStatus::Revoked;
        self.revocation = Some(Revocation {
            revoked_by: actor.to_string(),
            revoked_at: at,
            reason: reason.to_string(),
        });
        self.metadata.touch();
        true
    }

    /// Count one successful use
    pub fn record_use(&mut self, at: DateTime<Utc>) {
        self.usage_count += 1;
        self.last_used_at = Some(at);
    }
}
