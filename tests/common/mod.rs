//! Common test utilities for artistsaid-integrations
//!
//! # Usage
//!
//! ```rust
//! use crate::common::fixtures;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let integrations = fixtures::integrations();
//!     // ...
//! }
//! ```

pub mod fixtures;

pub use slow_store::SlowStore;

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err and return the error
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
