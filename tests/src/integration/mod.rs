//! Cross-component integration flows.

mod concurrency;
mod handshake;
mod refund;
mod robustness;
