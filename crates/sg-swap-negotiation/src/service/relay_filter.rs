//! # Relay Filter
//!
//! Remembers which `(order, sender)` pairs were already relayed so a
//! flooded `create_order` is forwarded at most once per node. Matching does
//! not consult it.

use crate::domain::{Order, OrderId, PeerAddress};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Bounded set of recently seen orders.
pub struct RelayFilter {
    seen: Mutex<LruCache<(OrderId, PeerAddress), ()>>,
}

impl RelayFilter {
    /// Filter remembering up to `capacity` pairs (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            seen: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Record `order`; `true` the first time the pair is seen.
    pub fn first_sighting(&self, order: &Order) -> bool {
        self.seen.lock().put((order.id(), order.sender), ()).is_none()
    }

    /// Has the pair been seen (without refreshing it)?
    #[cfg(test)]
    pub fn contains(&self, order: &Order) -> bool {
        self.seen.lock().contains(&(order.id(), order.sender))
    }

    /// Pairs currently remembered.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// `true` if nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

impl std::fmt::Debug for RelayFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayFilter")
            .field("len", &self.len())
            .finish()
    }
}
