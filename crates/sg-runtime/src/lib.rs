//! # Swapgate Runtime Library
//!
//! Exposes the simulator's pieces for testing. The entry point is the
//! `swap-sim` binary.
//!
//! - `config` - simulator settings from the environment
//! - `node` - one swap engine wired to the in-memory network
//! - `scenario` - the two-node swap run end to end

#![warn(missing_docs)]

pub mod config;
pub mod node;
pub mod scenario;

pub use config::SimConfig;
pub use node::SimNode;
pub use scenario::{run_swap, SwapReport};
