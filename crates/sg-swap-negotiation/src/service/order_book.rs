//! # Order Book
//!
//! Locally-owned orders and their negotiation state.
//!
//! One `RwLock` guards the entry list. Every state change goes through
//! [`OrderBook::commit`] (or one of the atomic helpers), which re-checks the
//! record is still in the book and still in the state the caller started
//! from. Ledger calls happen between a lookup and its commit with no lock
//! held, so a handler that loses a race gets [`SwapError::StaleState`] and
//! must not emit anything.

use crate::algorithms::{first_complement, matches};
use crate::domain::{
    LocalOrder, Order, OrderHandle, OrderSnapshot, PeerAddress, RecordId, SwapError, SwapProgress,
    SwapState,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Local order book.
#[derive(Debug, Default)]
pub struct OrderBook {
    entries: RwLock<Vec<OrderHandle>>,
    next_record: AtomicU64,
}

impl OrderBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append an order. Insertion order is iteration order.
    pub fn insert(&self, order: Order, created_at: u64) -> Result<OrderHandle, SwapError> {
        order.validate()?;
        let record = RecordId(self.next_record.fetch_add(1, Ordering::Relaxed) + 1);
        let handle = Arc::new(LocalOrder::new(record, order, created_at));
        self.entries.write().push(Arc::clone(&handle));
        debug!("[swap] book insert {} {}", record, handle.id());
        Ok(handle)
    }

    /// First stored order complementing `candidate`, whatever its state.
    pub fn find_complement(&self, candidate: &Order) -> Option<OrderHandle> {
        let entries = self.entries.read();
        first_complement(entries.iter(), candidate, |h: &OrderHandle| h.order()).cloned()
    }

    /// First complement of `candidate` currently in `state`.
    pub fn find_in_state(
        &self,
        candidate: &Order,
        state: SwapState,
    ) -> Result<OrderHandle, SwapError> {
        let entries = self.entries.read();
        entries
            .iter()
            .find(|h| matches(h.order(), candidate) && h.state() == state)
            .cloned()
            .ok_or_else(|| no_complement(candidate))
    }

    /// First complement of `candidate` in `state` whose bound counter-party
    /// is `candidate.sender`.
    pub fn find_bound(&self, candidate: &Order, state: SwapState) -> Result<OrderHandle, SwapError> {
        let entries = self.entries.read();
        entries
            .iter()
            .find(|h| {
                if !matches(h.order(), candidate) {
                    return false;
                }
                let progress = h.progress_mut();
                progress.state == state && progress.counterparty == Some(candidate.sender)
            })
            .cloned()
            .ok_or_else(|| no_complement(candidate))
    }

    /// Find the first complement in `from`, move it to `to` and bind
    /// `candidate.sender` as counter-party, in one critical section.
    ///
    /// A candidate already bound to one of our records is not bound again.
    pub fn bind_complement(
        &self,
        candidate: &Order,
        from: SwapState,
        to: SwapState,
    ) -> Result<OrderHandle, SwapError> {
        if !from.can_transition_to(to) {
            return Err(invalid_transition(from, to));
        }
        let entries = self.entries.write();
        let already_bound = entries.iter().any(|h| {
            h.counterparty() == Some(candidate.sender) && matches(h.order(), candidate)
        });
        if already_bound {
            return Err(SwapError::AlreadySeen(candidate.id().to_string()));
        }
        for handle in entries.iter() {
            if !matches(handle.order(), candidate) {
                continue;
            }
            let mut progress = handle.progress_mut();
            if progress.state != from {
                continue;
            }
            progress.state = to;
            progress.counterparty = Some(candidate.sender);
            return Ok(Arc::clone(handle));
        }
        Err(no_complement(candidate))
    }

    /// Compare-and-set transition `expected -> next`, applying `update` to
    /// the progress in the same critical section.
    pub fn commit<F>(
        &self,
        handle: &LocalOrder,
        expected: SwapState,
        next: SwapState,
        update: F,
    ) -> Result<(), SwapError>
    where
        F: FnOnce(&mut SwapProgress),
    {
        let entries = self.entries.write();
        if !contains_record(&entries, handle.record()) {
            return Err(stale(expected, None));
        }
        let mut progress = handle.progress_mut();
        if progress.state != expected {
            return Err(stale(expected, Some(progress.state)));
        }
        if !expected.can_transition_to(next) {
            return Err(invalid_transition(expected, next));
        }
        update(&mut *progress);
        progress.state = next;
        debug!("[swap] {} {} -> {}", handle.record(), expected, next);
        Ok(())
    }

    /// Move a funded record to `Refunding`.
    pub fn begin_refund(&self, handle: &LocalOrder) -> Result<SwapState, SwapError> {
        let entries = self.entries.write();
        if !contains_record(&entries, handle.record()) {
            return Err(SwapError::OrderNotFound(handle.record().to_string()));
        }
        let mut progress = handle.progress_mut();
        let from = progress.state;
        if !from.can_transition_to(SwapState::Refunding) {
            return Err(invalid_transition(from, SwapState::Refunding));
        }
        progress.state = SwapState::Refunding;
        Ok(from)
    }

    /// Remove by record identity. `false` if already gone.
    pub fn remove(&self, handle: &LocalOrder) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|h| h.record() != handle.record());
        before != entries.len()
    }

    /// Remove only if the record is still in `state`.
    pub fn remove_if(&self, handle: &LocalOrder, state: SwapState) -> Result<(), SwapError> {
        let mut entries = self.entries.write();
        let position = entries
            .iter()
            .position(|h| h.record() == handle.record())
            .ok_or_else(|| SwapError::OrderNotFound(handle.record().to_string()))?;
        let found = handle.state();
        if found != state {
            return Err(stale(state, Some(found)));
        }
        entries.remove(position);
        Ok(())
    }

    /// Remove a record that has no contract yet.
    pub fn remove_negotiable(&self, handle: &LocalOrder) -> Result<SwapState, SwapError> {
        let mut entries = self.entries.write();
        let position = entries
            .iter()
            .position(|h| h.record() == handle.record())
            .ok_or_else(|| SwapError::OrderNotFound(handle.record().to_string()))?;
        let state = handle.state();
        if !state.is_negotiable() {
            return Err(SwapError::CannotCancel(state.to_string()));
        }
        entries.remove(position);
        Ok(state)
    }

    /// Records bound to `peer`.
    #[cfg(test)]
    pub fn bound_to(&self, peer: PeerAddress) -> Vec<OrderHandle> {
        self.entries
            .read()
            .iter()
            .filter(|h| h.counterparty() == Some(peer))
            .cloned()
            .collect()
    }

    /// Remove every record bound to `peer` whose state satisfies `filter`.
    pub fn remove_bound_to<F>(&self, peer: PeerAddress, filter: F) -> Vec<OrderHandle>
    where
        F: Fn(SwapState) -> bool,
    {
        let mut entries = self.entries.write();
        let mut removed = Vec::new();
        entries.retain(|h| {
            let progress = h.progress_mut();
            let evict = progress.counterparty == Some(peer) && filter(progress.state);
            if evict {
                removed.push(Arc::clone(h));
            }
            !evict
        });
        removed
    }

    /// Is the record still in the book?
    pub fn contains(&self, handle: &LocalOrder) -> bool {
        contains_record(&self.entries.read(), handle.record())
    }

    /// Look up a record.
    pub fn get(&self, record: RecordId) -> Option<OrderHandle> {
        self.entries
            .read()
            .iter()
            .find(|h| h.record() == record)
            .cloned()
    }

    /// Consistent view of every record.
    pub fn snapshot(&self) -> Vec<OrderSnapshot> {
        self.entries.read().iter().map(|h| h.snapshot()).collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// `true` if the book is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn contains_record(entries: &[OrderHandle], record: RecordId) -> bool {
    entries.iter().any(|h| h.record() == record)
}

fn no_complement(candidate: &Order) -> SwapError {
    SwapError::NoComplementaryOrder {
        order: candidate.to_string(),
    }
}

fn stale(expected: SwapState, found: Option<SwapState>) -> SwapError {
    SwapError::StaleState {
        expected: expected.to_string(),
        found: found.map_or_else(|| "removed".to_string(), |s| s.to_string()),
    }
}

fn invalid_transition(from: SwapState, to: SwapState) -> SwapError {
    SwapError::InvalidStateTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}
