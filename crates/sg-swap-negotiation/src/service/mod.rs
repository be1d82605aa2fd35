//! # Service Layer
//!
//! Order book, relay filter, refund timers and the engine tying them to the
//! ports.

pub mod order_book;
pub mod refund_scheduler;
pub mod relay_filter;
pub mod swap_engine;

pub use order_book::OrderBook;
pub use refund_scheduler::RefundScheduler;
pub use relay_filter::RelayFilter;
pub use swap_engine::{SwapDependencies, SwapEngine};
