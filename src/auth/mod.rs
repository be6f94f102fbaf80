//! Authentication
//!
//! Credential issuance and validation for API keys.

pub mod api_key;

pub use api_key::creation::ApiKeyHandler;
pub use api_key::types::{IssueApiKeyRequest, IssuedApiKey};
