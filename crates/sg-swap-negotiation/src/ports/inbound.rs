//! # Inbound Ports
//!
//! What the host (transport, UI, wallet) can ask of the swap engine.

use crate::domain::{Order, OrderHandle, OrderSnapshot, PeerAddress, SwapError};
use crate::events::SwapMessage;
use async_trait::async_trait;

/// Swap protocol API - inbound port.
#[async_trait]
pub trait SwapProtocolApi: Send + Sync {
    /// Dispatch a decoded message from `from`.
    async fn handle_message(&self, from: PeerAddress, message: SwapMessage)
        -> Result<(), SwapError>;

    /// Decode then dispatch a raw payload from `from`.
    async fn handle_bytes(&self, from: PeerAddress, bytes: &[u8]) -> Result<(), SwapError>;

    /// Place a local order and advertise it.
    async fn place_order(&self, order: Order) -> Result<OrderHandle, SwapError>;

    /// Withdraw a local order that has no contract yet.
    fn cancel_order(&self, handle: &OrderHandle) -> Result<(), SwapError>;

    /// Drop unfunded negotiations with a departed peer. Returns how many.
    fn handle_peer_disconnected(&self, peer: PeerAddress) -> usize;

    /// Host confirmed the refund of a timed-out swap.
    fn complete_refund(&self, handle: &OrderHandle) -> Result<(), SwapError>;

    /// Current book contents.
    fn snapshot(&self) -> Vec<OrderSnapshot>;
}
