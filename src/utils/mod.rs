//! Utility modules
//!
//! - **auth**: signing, secret generation and digesting
//! - **error**: the crate error type
//! - **logging**: subscriber setup and redaction

pub mod auth;
pub mod error;
pub mod logging;
