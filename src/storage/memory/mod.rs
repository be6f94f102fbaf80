//! In-memory store
//!
//! All records live behind a single `RwLock`, which serialises mutations of
//! any one record. Every trait method completes its mutation without
//! suspending once the lock is held.

mod api_key_ops;
mod types;
mod webhook_ops;

pub use types::MemoryStore;
