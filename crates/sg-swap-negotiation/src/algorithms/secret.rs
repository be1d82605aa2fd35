//! # Secret Generation and Verification
//!
//! Hash-lock material for the initiator contract.

use crate::domain::{Hash, SecureSecret, Secret};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure random secret.
pub fn generate_random_secret() -> SecureSecret {
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    let wrapped = SecureSecret::new(secret);
    zeroize::Zeroize::zeroize(&mut secret);
    wrapped
}

/// Create a hashlock from a secret using SHA-256.
pub fn create_hash_lock(secret: &Secret) -> Hash {
    Sha256::digest(secret).into()
}

/// Verify that a secret matches a hashlock.
pub fn verify_secret(secret: &Secret, hash_lock: &Hash) -> bool {
    create_hash_lock(secret) == *hash_lock
}
