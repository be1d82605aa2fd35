//! # Adapters
//!
//! In-memory implementations of the outbound ports.

pub mod clock;
pub mod in_memory_network;
pub mod ledger_registry;
pub mod refund_reporter;
pub mod simulated_ledger;

pub use clock::{AdjustedClock, ManualClock, SystemClock, MAX_TIME_ADJUSTMENT_SECS};
pub use in_memory_network::{
    spawn_receiver, Envelope, InMemoryNetwork, NetworkMessenger, DEFAULT_INBOX_CAPACITY,
};
pub use ledger_registry::InMemoryLedgerRegistry;
pub use refund_reporter::{ChannelRefundReporter, LoggingRefundReporter};
pub use simulated_ledger::{ContractStatus, SimulatedContract, SimulatedLedger};
