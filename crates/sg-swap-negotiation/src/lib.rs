//! # Swap Negotiation
//!
//! Peer-to-peer order book and hashed-timelock swap negotiation.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Nodes advertise orders offering one asset for another, discover an exact
//! complement held by another node, and walk both sides through a six-message
//! handshake that ends with two HTLCs sharing one hash lock:
//!
//! | Message | Sent by | Carries |
//! |---------|---------|---------|
//! | `create_order` | order owner, then relays | order |
//! | `order_match` | holder of the complement | its order |
//! | `request_swap_address` | owner | order, receiving address |
//! | `swap_address_ack` | holder | order, receiving address |
//! | `contract_created` | owner | order, initiator HTLC |
//! | `contract_ack` | holder | order, participant HTLC |
//!
//! ## Safety
//!
//! | Rule | Where |
//! |------|-------|
//! | Contracts verified on chain before acting on them | `SwapEngine` |
//! | Initiator lock > participant lock + margin | `algorithms::timelock` |
//! | One counter-party per order, bound atomically | `OrderBook::bind_complement` |
//! | Funded orders refund after their deadline | `RefundScheduler` |
//!
//! ## Module Structure
//!
//! ```text
//! sg-swap-negotiation/
//! ├── domain/          # Order, SwapState, config, errors, invariants
//! ├── algorithms/      # matcher, hash locks, time locks
//! ├── events/          # SwapMessage and its bincode codec
//! ├── ports/           # SwapProtocolApi, LedgerClient, PeerMessenger, ...
//! ├── service/         # OrderBook, RelayFilter, RefundScheduler, SwapEngine
//! ├── adapters/        # in-memory ledger, network, clocks, reporters
//! └── metrics.rs       # counters
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::{create_hash_lock, generate_random_secret, matches, verify_secret};
pub use domain::{
    ContractDetails, ContractParams, ContractReference, ErrorKind, LocalOrder, Order, OrderHandle,
    OrderId, OrderSnapshot, PeerAddress, ReceivingAddress, RecordId, RefundNotice, RemoteOrder,
    SecureSecret, SwapConfig, SwapError, SwapState, Ticker,
};
pub use events::{SwapCodec, SwapMessage};
pub use metrics::{MetricsSnapshot, SwapMetrics};
pub use ports::{
    LedgerClient, LedgerClientRegistry, MockPeerMessenger, NetworkClock, PeerMessenger,
    RefundReporter, SentMessage, SwapProtocolApi,
};
pub use service::{OrderBook, RefundScheduler, RelayFilter, SwapDependencies, SwapEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
