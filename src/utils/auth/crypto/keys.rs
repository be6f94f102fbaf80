//! Secret generation and digesting

use super::secret::RawSecret;
use crate::utils::error::{IntegrationError, Result};
use crate::utils::logging::mask_secret;
use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::Secret;
use sha2::{Digest, Sha256};

/// Default entropy of generated secrets (256 bits)
pub const SECRET_BYTES: usize = 32;

/// Generate a 256-bit secret from the OS CSPRNG, hex encoded (64 chars)
pub fn generate_secret() -> RawSecret {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Secret::new(hex::encode(bytes))
}

/// Generate a secret of `len` random bytes; anything under 256 bits is refused
pub fn generate_secret_with_len(len: usize) -> Result<RawSecret> {
    if len < SECRET_BYTES {
        return Err(IntegrationError::config(format!(
            "Secrets need at least {} random bytes, got {}",
            SECRET_BYTES, len
        )));
    }

    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    Ok(Secret::new(hex::encode(bytes)))
}

/// SHA-256 digest of a raw secret, hex encoded, for storage
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Masked form of a raw key for display (`...wxyz`)
pub fn extract_key_prefix(raw: &str) -> String {
    mask_secret(raw)
}
