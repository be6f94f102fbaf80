//! HMAC signature creation and verification

use crate::utils::error::{IntegrationError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Prefix some providers put in front of the hex digest
const SHA256_PREFIX: &str = "sha256=";

fn keyed_mac(secret: &str) -> Result<HmacSha256> {
    if secret.is_empty() {
        return Err(IntegrationError::config(
            "Signing secret must not be empty",
        ));
    }

    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| IntegrationError::crypto(format!("Invalid HMAC key: {}", e)))
}

/// Sign the exact payload bytes, returning the lowercase hex HMAC-SHA256 digest
pub fn sign(payload: &[u8], secret: &str) -> Result<String> {
    let mut mac = keyed_mac(secret)?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex signature over the payload.
///
/// Returns `Ok(false)` for any mismatch, including malformed hex or a digest
/// of the wrong length. Only an empty secret is an error.
pub fn verify(signature: &str, payload: &[u8], secret: &str) -> Result<bool> {
    let mut mac = keyed_mac(secret)?;
    mac.update(payload);

    let Ok(supplied) = hex::decode(signature.trim()) else {
        return Ok(false);
    };

    // verify_slice compares in constant time and rejects length mismatches
    Ok(mac.verify_slice(&supplied).is_ok())
}

/// Verify a signature header that carries either the bare hex digest or
/// the `sha256=<hex>` form
pub fn verify_signature_header(header: &str, payload: &[u8], secret: &str) -> Result<bool> {
    let header = header.trim();
    let signature = header.strip_prefix(SHA256_PREFIX).unwrap_or(header);
    verify(signature, payload, secret)
}

/// Constant-time byte comparison; differing lengths return early
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
