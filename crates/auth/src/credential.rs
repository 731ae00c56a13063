//! Credential hashing primitives.
//!
//! A credential is a long-lived opaque bearer token held by exactly one
//! actor. Only its digest is ever stored or compared; the raw value exists
//! transiently in the request path and once at issuance time.

use core::str::FromStr;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crewdesk_core::DomainError;

/// Size of a credential digest in bytes (SHA-256).
pub const HASH_SIZE: usize = 32;

/// One-way digest of a credential.
///
/// Equality is constant-time so a lookup verification cannot leak how many
/// digest bytes matched.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHash([u8; HASH_SIZE]);

impl CredentialHash {
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl PartialEq for CredentialHash {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for CredentialHash {}

impl core::hash::Hash for CredentialHash {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Hex form, as persisted by store adapters.
impl core::fmt::Display for CredentialHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for CredentialHash {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| DomainError::validation(format!("credential hash: {e}")))?;
        let bytes: [u8; HASH_SIZE] = bytes
            .try_into()
            .map_err(|_| DomainError::validation("credential hash: wrong length"))?;
        Ok(Self(bytes))
    }
}

/// Deterministic credential hasher.
///
/// Digest = SHA-256(pepper ‖ raw). The pepper is a deployment-wide secret,
/// never a per-credential salt: lookups go *by* digest, so equal raw tokens
/// must produce equal digests within one deployment. The same hasher is used
/// at issuance and at authentication time.
#[derive(Clone)]
pub struct TokenHasher {
    pepper: Vec<u8>,
}

impl core::fmt::Debug for TokenHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // The pepper is a secret; keep it out of debug output.
        f.debug_struct("TokenHasher").finish_non_exhaustive()
    }
}

impl TokenHasher {
    pub fn new(pepper: impl Into<Vec<u8>>) -> Self {
        Self {
            pepper: pepper.into(),
        }
    }

    /// Hash a raw credential. The raw value is not retained.
    pub fn hash(&self, raw: &str) -> CredentialHash {
        let mut hasher = Sha256::new();
        hasher.update(&self.pepper);
        hasher.update(raw.as_bytes());
        CredentialHash(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_raw_and_pepper_hash_equal() {
        let hasher = TokenHasher::new(b"pepper".to_vec());
        assert_eq!(hasher.hash("token-a"), hasher.hash("token-a"));
    }

    #[test]
    fn different_raw_hashes_differ() {
        let hasher = TokenHasher::new(b"pepper".to_vec());
        assert_ne!(hasher.hash("token-a"), hasher.hash("token-b"));
    }

    #[test]
    fn different_pepper_hashes_differ() {
        let a = TokenHasher::new(b"pepper-a".to_vec());
        let b = TokenHasher::new(b"pepper-b".to_vec());
        assert_ne!(a.hash("token"), b.hash("token"));
    }

    #[test]
    fn hex_round_trip() {
        let hash = TokenHasher::new(b"pepper".to_vec()).hash("token");
        let parsed: CredentialHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn wrong_length_hex_is_rejected() {
        assert!("deadbeef".parse::<CredentialHash>().is_err());
        assert!("zz".parse::<CredentialHash>().is_err());
    }

    #[test]
    fn debug_does_not_leak_pepper() {
        let hasher = TokenHasher::new(b"super-secret".to_vec());
        let debug = format!("{hasher:?}");
        assert!(!debug.contains("super-secret"));
    }
}
