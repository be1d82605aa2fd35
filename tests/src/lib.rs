//! # Swapgate Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs     # Shared ledgers, clocks, engines
//! │   └── integration/    # Cross-component flows
//! │       ├── handshake.rs    # Two and three nodes over the in-memory network
//! │       ├── refund.rs       # Deadlines firing against simulated ledgers
//! │       ├── concurrency.rs  # Racing create_order deliveries
//! │       └── robustness.rs   # Unrelated, malformed and orphan messages
//! └── benches/
//!     └── matching_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sg-tests
//!
//! # One flow
//! cargo test -p sg-tests integration::handshake
//!
//! # Benchmarks
//! cargo bench -p sg-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
