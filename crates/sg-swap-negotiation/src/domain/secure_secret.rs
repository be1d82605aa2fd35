//! # Secure Secret Type
//!
//! HTLC preimage held by the initiating side of a swap. The bytes are zeroed
//! when the last copy is dropped and never appear in `Debug` output.

use super::errors::{Hash, Secret};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 32-byte swap secret that zeroizes on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureSecret {
    inner: Secret,
}

impl SecureSecret {
    /// Wrap existing secret bytes.
    pub fn new(bytes: Secret) -> Self {
        Self { inner: bytes }
    }

    /// Copy from a slice; `None` unless it is exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let inner: Secret = slice.try_into().ok()?;
        Some(Self { inner })
    }

    /// Borrow the preimage. Do not keep the reference around.
    pub fn as_bytes(&self) -> &Secret {
        &self.inner
    }

    /// SHA-256 of the preimage.
    pub fn hash_lock(&self) -> Hash {
        crate::algorithms::create_hash_lock(&self.inner)
    }
}

impl std::fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecureSecret(***)")
    }
}
