//! Authentication and security utilities
//!
//! This module provides the cryptographic primitives behind credential issuance
//! and webhook signing.

pub mod crypto;

// Re-export commonly used types and functions
pub use crypto::*;
