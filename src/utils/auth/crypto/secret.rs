//! Secret wrappers that keep raw values out of `Debug` output and logs

use secrecy::{ExposeSecret, Secret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A freshly minted credential, handed to the caller exactly once
pub type RawSecret = SecretString;

/// Per-webhook HMAC key.
///
/// Unlike an API key this secret has to be stored as-is, since every delivery
/// is signed with it. It still never shows up in `Debug` output.
#[derive(Clone)]
pub struct SigningSecret(SecretString);

impl SigningSecret {
    /// Wrap an already generated secret
    pub fn new(raw: RawSecret) -> Self {
        Self(raw)
    }

    /// Generate a fresh secret with the default entropy
    pub fn generate() -> Self {
        Self(super::keys::generate_secret())
    }

    /// Generate a fresh secret of `len` random bytes; under 32 is refused
    pub fn generate_with_len(len: usize) -> crate::utils::error::Result<Self> {
        super::keys::generate_secret_with_len(len).map(Self)
    }

    /// Borrow the secret for signing
    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_str()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

impl Serialize for SigningSecret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for SigningSecret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self(Secret::new(value)))
    }
}
