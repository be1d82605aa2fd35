//! Counters for swap negotiation
//!
//! Lock-free counters updated by the engine and the refund scheduler.
//! Hosts read them through [`SwapMetrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Swap negotiation counters.
#[derive(Debug, Default)]
pub struct SwapMetrics {
    /// Messages handed to the engine (decoded or raw)
    pub messages_received: AtomicU64,
    /// Messages dropped for any reason
    pub messages_dropped: AtomicU64,
    /// Orders placed locally
    pub orders_placed: AtomicU64,
    /// Remote orders relayed onward
    pub orders_relayed: AtomicU64,
    /// Remote orders bound to a local one
    pub matches_found: AtomicU64,
    /// HTLCs we funded
    pub contracts_created: AtomicU64,
    /// Handshakes finished on this side
    pub swaps_completed: AtomicU64,
    /// Refunds reported
    pub refunds_triggered: AtomicU64,
    /// Orders cancelled locally or on disconnect
    pub cancellations: AtomicU64,
}

/// Point-in-time copy of [`SwapMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// See [`SwapMetrics::messages_received`]
    pub messages_received: u64,
    /// See [`SwapMetrics::messages_dropped`]
    pub messages_dropped: u64,
    /// See [`SwapMetrics::orders_placed`]
    pub orders_placed: u64,
    /// See [`SwapMetrics::orders_relayed`]
    pub orders_relayed: u64,
    /// See [`SwapMetrics::matches_found`]
    pub matches_found: u64,
    /// See [`SwapMetrics::contracts_created`]
    pub contracts_created: u64,
    /// See [`SwapMetrics::swaps_completed`]
    pub swaps_completed: u64,
    /// See [`SwapMetrics::refunds_triggered`]
    pub refunds_triggered: u64,
    /// See [`SwapMetrics::cancellations`]
    pub cancellations: u64,
}

impl SwapMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inbound message
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped message
    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a locally placed order
    pub fn record_placed(&self) {
        self.orders_placed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a relayed order
    pub fn record_relayed(&self) {
        self.orders_relayed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a match
    pub fn record_match(&self) {
        self.matches_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a funded contract
    pub fn record_contract(&self) {
        self.contracts_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished handshake
    pub fn record_completed(&self) {
        self.swaps_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a refund report
    pub fn record_refund(&self) {
        self.refunds_triggered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` cancellations
    pub fn record_cancelled(&self, count: u64) {
        self.cancellations.fetch_add(count, Ordering::Relaxed);
    }

    /// Read every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            orders_placed: self.orders_placed.load(Ordering::Relaxed),
            orders_relayed: self.orders_relayed.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
            contracts_created: self.contracts_created.load(Ordering::Relaxed),
            swaps_completed: self.swaps_completed.load(Ordering::Relaxed),
            refunds_triggered: self.refunds_triggered.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }
}
