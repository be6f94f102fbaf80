//! Configuration data models
//!
//! This module defines all configuration structures used by the library.

#![allow(missing_docs)]

pub mod credentials;
pub mod logging;
pub mod store;
pub mod webhooks;

// Re-export all configuration types
pub use credentials::*;
pub use logging::*;
pub use store::*;
pub use webhooks::*;
