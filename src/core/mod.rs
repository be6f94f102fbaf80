//! Core functionality
//!
//! This module contains the persisted records and the webhook subsystem.

pub mod models;
pub mod webhooks;
