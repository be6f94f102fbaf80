//! API key issuance and management
//!
//! This module provides API key issuance, validation, revocation and
//! permission checks.

pub mod creation;
pub mod management;
pub mod permissions;
pub mod types;
