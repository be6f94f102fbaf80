//! Cryptographic utilities
//!
//! Secret generation and digesting for API keys, HMAC-SHA256 signing and
//! constant-time verification for webhook payloads. Everything here is pure:
//! no I/O, no shared state, safe to call from any task.

pub mod hmac;
pub mod keys;
pub mod secret;

pub use self::hmac::{sign, verify, verify_signature_header};
pub use keys::{extract_key_prefix, generate_secret, generate_secret_with_len, hash_secret};
pub use secret::{RawSecret, SigningSecret};
