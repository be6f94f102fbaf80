//! Credential issuance configuration

use crate::utils::auth::crypto::keys::SECRET_BYTES;
use serde::{Deserialize, Serialize};

/// Credential issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Random bytes per generated secret
    #[serde(default = "default_secret_bytes")]
    pub secret_bytes: usize,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            secret_bytes: default_secret_bytes(),
        }
    }
}

fn default_secret_bytes() -> usize {
    SECRET_BYTES
}
