// Shared-secret API key for programmatic access
// Decision: One process-wide secret presented in the X-API-Key header
// Decision: Compare SHA-256 digests so timing does not reveal the matching prefix

use std::fmt;

use sha2::{Digest, Sha256};

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Hash an API key for comparison
pub fn hash_api_key(key: &str) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(key.as_bytes()));
    digest
}

/// The configured shared secret.
///
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone)]
pub struct SharedSecret {
    value: String,
    digest: [u8; 32],
}

impl SharedSecret {
    /// Wrap a secret; empty strings are not a usable secret
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            return None;
        }
        let digest = hash_api_key(&value);
        Some(Self { value, digest })
    }

    /// Check a presented key. An empty key never matches.
    pub fn matches(&self, presented: &str) -> bool {
        if presented.is_empty() {
            return false;
        }
        let presented = hash_api_key(presented);
        presented
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Raw secret bytes, for deriving the session signing key
    pub(crate) fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}
