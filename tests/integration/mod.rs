//! Integration tests for artistsaid-integrations
//!
//! These tests drive the public API over real stores and a local HTTP
//! receiver, without mocking crate internals.

pub mod api_key_tests;
pub mod delivery_tests;
pub mod store_timeout_tests;
pub mod webhook_tests;
