//! # Swap Configuration
//!
//! Lock durations and resource limits, with environment overrides.

use super::errors::SwapError;
use super::invariants::invariant_timelock_ordering;
use std::env;

/// Default initiator HTLC lock (24 hours).
pub const DEFAULT_CONTRACT_LOCK_SECS: u64 = 24 * 3600;

/// Default participant HTLC lock (12 hours).
pub const DEFAULT_PARTICIPANT_LOCK_SECS: u64 = 12 * 3600;

/// Minimum gap between the two time locks (6 hours).
pub const MIN_TIMELOCK_MARGIN_SECS: u64 = 6 * 3600;

/// Swap negotiation configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapConfig {
    /// Lock on the contract created at `swap_address_ack`; also the refund deadline.
    pub contract_lock_secs: u64,
    /// Lock on the reciprocal contract created at `contract_created`.
    pub participant_lock_secs: u64,
    /// Required gap between the two locks.
    pub min_timelock_margin_secs: u64,
    /// How many (order, sender) pairs the relay filter remembers.
    pub relay_cache_size: usize,
    /// Largest accepted encoded message.
    pub max_message_bytes: u64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            contract_lock_secs: DEFAULT_CONTRACT_LOCK_SECS,
            participant_lock_secs: DEFAULT_PARTICIPANT_LOCK_SECS,
            min_timelock_margin_secs: MIN_TIMELOCK_MARGIN_SECS,
            relay_cache_size: 4096,
            max_message_bytes: 64 * 1024,
        }
    }
}

impl SwapConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SG_CONTRACT_LOCK_SECS` (default: 86400)
    /// - `SG_PARTICIPANT_LOCK_SECS` (default: 43200)
    /// - `SG_MIN_TIMELOCK_MARGIN_SECS` (default: 21600)
    /// - `SG_RELAY_CACHE_SIZE` (default: 4096)
    /// - `SG_MAX_MESSAGE_BYTES` (default: 65536)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            contract_lock_secs: env_or("SG_CONTRACT_LOCK_SECS", defaults.contract_lock_secs),
            participant_lock_secs: env_or(
                "SG_PARTICIPANT_LOCK_SECS",
                defaults.participant_lock_secs,
            ),
            min_timelock_margin_secs: env_or(
                "SG_MIN_TIMELOCK_MARGIN_SECS",
                defaults.min_timelock_margin_secs,
            ),
            relay_cache_size: env_or("SG_RELAY_CACHE_SIZE", defaults.relay_cache_size),
            max_message_bytes: env_or("SG_MAX_MESSAGE_BYTES", defaults.max_message_bytes),
        }
    }

    /// Reject configurations that could never complete a swap safely.
    pub fn validate(&self) -> Result<(), SwapError> {
        if self.participant_lock_secs == 0 {
            return Err(SwapError::InvalidConfig(
                "participant_lock_secs must be positive".to_string(),
            ));
        }
        if self.relay_cache_size == 0 {
            return Err(SwapError::InvalidConfig(
                "relay_cache_size must be positive".to_string(),
            ));
        }
        if self.max_message_bytes < 64 {
            return Err(SwapError::InvalidConfig(format!(
                "max_message_bytes {} is too small",
                self.max_message_bytes
            )));
        }
        // Both locks start from roughly the same instant.
        invariant_timelock_ordering(
            self.contract_lock_secs,
            self.participant_lock_secs,
            self.min_timelock_margin_secs,
        )
        .map_err(|e| SwapError::InvalidConfig(e.to_string()))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
