//! Error types for the integrations library

use thiserror::Error;

/// Result type alias for the integrations library
pub type Result<T> = std::result::Result<T, IntegrationError>;

/// Main error type for the integrations library
///
/// Signature and key mismatches are not represented here: they are reported
/// as `false` by the verification functions.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Malformed input (empty name or provider, malformed URL, empty event set)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors (zero-length secret, missing required config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence timed out or the store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Record does not exist or has been tombstoned
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation in the store
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Generic credential rejection
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Crypto errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}
