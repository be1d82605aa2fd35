//! # Domain Invariants
//!
//! Business rules for orders and HTLC pairs.

use super::errors::{PeerAddress, SwapError};
use super::value_objects::Ticker;

/// Invariant: the sender is a routable endpoint.
///
/// Port must be non-zero and the IP must not be the unspecified address.
pub fn invariant_valid_sender(sender: &PeerAddress) -> bool {
    sender.port() != 0 && !sender.ip().is_unspecified()
}

/// Invariant: both sides of an order carry a strictly positive amount.
pub fn invariant_positive_amounts(base_amount: u64, rel_amount: u64) -> bool {
    base_amount > 0 && rel_amount > 0
}

/// Invariant: an order exchanges two different assets.
pub fn invariant_distinct_assets(base: &Ticker, rel: &Ticker) -> bool {
    base != rel
}

/// Invariant: the initiator lock expires strictly later than the
/// participant lock plus `min_margin_secs`.
///
/// Works on absolute timestamps and on bare durations alike.
pub fn invariant_timelock_ordering(
    initiator_timelock: u64,
    participant_timelock: u64,
    min_margin_secs: u64,
) -> Result<(), SwapError> {
    if initiator_timelock <= participant_timelock.saturating_add(min_margin_secs) {
        return Err(SwapError::InvalidTimelockMargin {
            initiator_timelock,
            participant_timelock,
            required_margin: min_margin_secs,
        });
    }
    Ok(())
}
