//! # Outbound Ports
//!
//! Capabilities the swap engine needs from its host: per-ledger clients,
//! the P2P transport, network time and a sink for refund reports.

use crate::domain::{
    ContractDetails, ContractParams, ContractReference, PeerAddress, ReceivingAddress,
    RefundNotice, SecureSecret, SwapError, Ticker,
};
use crate::events::SwapMessage;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Client for one ledger - outbound port.
///
/// Implementations talk to a wallet or node for that ledger. Every call may
/// block on I/O, so the engine never holds a lock across one.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Ledger this client serves.
    fn ticker(&self) -> &Ticker;

    /// Fresh address we control on this ledger.
    async fn generate_receiving_address(&self) -> Result<ReceivingAddress, SwapError>;

    /// Whether `address` is acceptable on this ledger.
    async fn is_valid_address(&self, address: &ReceivingAddress) -> Result<bool, SwapError>;

    /// Fund a new HTLC.
    async fn create_contract(&self, params: ContractParams)
        -> Result<ContractReference, SwapError>;

    /// Look up an existing HTLC. An error means the contract is not usable.
    async fn verify_contract(
        &self,
        contract: &ContractReference,
    ) -> Result<ContractDetails, SwapError>;

    /// Redeem an HTLC with its preimage.
    async fn redeem_contract(
        &self,
        contract: &ContractReference,
        secret: &SecureSecret,
    ) -> Result<bool, SwapError>;
}

/// Ticker to ledger client lookup - outbound port.
pub trait LedgerClientRegistry: Send + Sync {
    /// Client for `ticker`, if one is configured.
    fn resolve(&self, ticker: &Ticker) -> Option<Arc<dyn LedgerClient>>;
}

/// P2P transport - outbound port.
#[async_trait]
pub trait PeerMessenger: Send + Sync {
    /// Send to one peer.
    async fn send(&self, peer: PeerAddress, message: SwapMessage) -> Result<(), SwapError>;

    /// Send to every connected peer except `exclude`.
    async fn broadcast(
        &self,
        message: SwapMessage,
        exclude: Option<PeerAddress>,
    ) -> Result<(), SwapError>;
}

/// Network-adjusted time source - outbound port.
pub trait NetworkClock: Send + Sync {
    /// Current adjusted time (unix seconds).
    fn adjusted_time(&self) -> u64;
}

/// Receives refund reports - outbound port.
pub trait RefundReporter: Send + Sync {
    /// A refund deadline passed before the swap completed.
    fn report_refund(&self, notice: RefundNotice);
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// A message captured by [`MockPeerMessenger`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SentMessage {
    /// Direct send.
    Direct(PeerAddress, SwapMessage),
    /// Broadcast with optional exclusion.
    Broadcast(SwapMessage, Option<PeerAddress>),
}

/// Messenger that records instead of sending.
#[derive(Default)]
pub struct MockPeerMessenger {
    sent: Mutex<Vec<SentMessage>>,
    /// Should fail?
    pub should_fail: bool,
}

impl MockPeerMessenger {
    /// Everything sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Drain the record.
    pub fn take(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.sent.lock())
    }
}

#[async_trait]
impl PeerMessenger for MockPeerMessenger {
    async fn send(&self, peer: PeerAddress, message: SwapMessage) -> Result<(), SwapError> {
        if self.should_fail {
            return Err(SwapError::Messenger("Mock failure".to_string()));
        }
        self.sent.lock().push(SentMessage::Direct(peer, message));
        Ok(())
    }

    async fn broadcast(
        &self,
        message: SwapMessage,
        exclude: Option<PeerAddress>,
    ) -> Result<(), SwapError> {
        if self.should_fail {
            return Err(SwapError::Messenger("Mock failure".to_string()));
        }
        self.sent
            .lock()
            .push(SentMessage::Broadcast(message, exclude));
        Ok(())
    }
}
