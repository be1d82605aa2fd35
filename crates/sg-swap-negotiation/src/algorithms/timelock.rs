//! # Time Lock Calculation
//!
//! The initiator contract must outlive the participant contract by at least
//! the configured margin.

use crate::domain::{invariant_timelock_ordering, SwapConfig, SwapError};

/// Lock for the contract created on `swap_address_ack`.
pub fn initiator_timelock(config: &SwapConfig, now: u64) -> u64 {
    now.saturating_add(config.contract_lock_secs)
}

/// Lock for the reciprocal contract created on `contract_created`.
pub fn participant_timelock(config: &SwapConfig, now: u64) -> u64 {
    now.saturating_add(config.participant_lock_secs)
}

/// Check a counter-party's initiator lock against the lock we would use.
pub fn validate_counterparty_timelock(
    config: &SwapConfig,
    counterparty_lock: u64,
    now: u64,
) -> Result<u64, SwapError> {
    let ours = participant_timelock(config, now);
    invariant_timelock_ordering(counterparty_lock, ours, config.min_timelock_margin_secs)?;
    Ok(ours)
}

/// Seconds from `now` until `deadline`, zero if already passed.
pub fn seconds_until(deadline: u64, now: u64) -> u64 {
    deadline.saturating_sub(now)
}
