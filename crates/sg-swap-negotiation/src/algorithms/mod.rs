//! # Algorithms Module
//!
//! Pure functions: matching, hash locks and time locks.

pub mod matcher;
pub mod secret;
pub mod timelock;

pub use matcher::{first_complement, matches};
pub use secret::{create_hash_lock, generate_random_secret, verify_secret};
pub use timelock::{
    initiator_timelock, participant_timelock, seconds_until, validate_counterparty_timelock,
};
