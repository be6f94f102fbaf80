//! Core data models
//!
//! This module defines the persisted records shared by the credential issuer
//! and the webhook subsystem.

pub mod api_key;
pub mod permissions;

// Re-export commonly used types
pub use api_key::*;
pub use permissions::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common metadata for all records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Unique identifier
    pub id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Version for optimistic locking
    pub version: i64,
    /// Tombstone; set records are invisible to every regular operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Default for Metadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            version: 1,
            deleted_at: None,
        }
    }
}

impl Metadata {
    /// Create new metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the timestamp and increment version
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }

    /// Tombstone the record
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.touch();
    }

    /// Whether the record has been tombstoned
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
