//! # Domain Errors
//!
//! Error types for swap negotiation.
//!
//! Every error a message handler can produce falls into one [`ErrorKind`].
//! None of them is fatal: the message is dropped and the handshake stalls
//! until the refund deadline or an explicit cancel resolves it.

use std::net::SocketAddr;
use thiserror::Error;

/// Hash type (32-byte SHA-256).
pub type Hash = [u8; 32];

/// Secret type (32-byte HTLC preimage).
pub type Secret = [u8; 32];

/// Network address of a peer (also the declared sender of an order).
pub type PeerAddress = SocketAddr;

/// Swap negotiation error types.
#[derive(Debug, Error)]
pub enum SwapError {
    /// No local order complements the received one.
    #[error("No complementary local order for {order}")]
    NoComplementaryOrder {
        /// Rendered remote order
        order: String,
    },

    /// This (order, sender) pair was already seen; not matched or relayed again.
    #[error("Order already seen: {0}")]
    AlreadySeen(String),

    /// The local order moved on (or left the book) while a step was in flight.
    #[error("Stale order state: expected {expected}, found {found}")]
    StaleState {
        /// State the handler started from
        expected: String,
        /// State found at commit time ("removed" if gone)
        found: String,
    },

    /// Counter-party address failed ledger validation.
    #[error("Invalid {ticker} address: {address}")]
    InvalidAddress {
        /// Ledger ticker
        ticker: String,
        /// Offending address
        address: String,
    },

    /// Counter-party contract failed verification.
    #[error("Invalid {ticker} contract {contract}: {reason}")]
    InvalidContract {
        /// Ledger ticker
        ticker: String,
        /// Contract reference
        contract: String,
        /// What did not check out
        reason: String,
    },

    /// Initiator contract does not leave enough time for the reciprocal one.
    #[error("Invalid timelock margin: initiator={initiator_timelock}, participant={participant_timelock}, required={required_margin}")]
    InvalidTimelockMargin {
        /// Initiator HTLC timelock
        initiator_timelock: u64,
        /// Participant HTLC timelock
        participant_timelock: u64,
        /// Required margin in seconds
        required_margin: u64,
    },

    /// No ledger client is registered for the ticker.
    #[error("No ledger client for {0}")]
    UnsupportedTicker(String),

    /// Payload could not be decoded.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Order violates an entry invariant.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Ticker symbol is not well formed.
    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    /// Address or contract token is not well formed.
    #[error("Invalid {kind}: {reason}")]
    InvalidToken {
        /// Token kind (address, contract)
        kind: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Swap state may only move forward.
    #[error("Invalid swap transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current state
        from: String,
        /// Attempted state
        to: String,
    },

    /// Order already has an on-chain contract.
    #[error("Order cannot be cancelled in state {0}")]
    CannotCancel(String),

    /// Order is not in the book.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Ledger client call failed.
    #[error("Ledger error ({ticker}): {message}")]
    Ledger {
        /// Ledger ticker
        ticker: String,
        /// Client message
        message: String,
    },

    /// Transport refused the message.
    #[error("Messenger error: {0}")]
    Messenger(String),

    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification used for logging and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// No complementary order, or the order moved on.
    ProtocolMismatch,
    /// Address or contract failed validation.
    InvalidEvidence,
    /// No ledger client for a ticker.
    MissingCapability,
    /// Payload or order rejected before the state machine.
    Malformed,
    /// Ledger or transport failure.
    External,
    /// Local API misuse.
    Local,
}

impl SwapError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoComplementaryOrder { .. } | Self::AlreadySeen(_) | Self::StaleState { .. } => {
                ErrorKind::ProtocolMismatch
            }
            Self::InvalidAddress { .. }
            | Self::InvalidContract { .. }
            | Self::InvalidTimelockMargin { .. } => ErrorKind::InvalidEvidence,
            Self::UnsupportedTicker(_) => ErrorKind::MissingCapability,
            Self::MalformedMessage(_)
            | Self::InvalidOrder(_)
            | Self::InvalidTicker(_)
            | Self::InvalidToken { .. } => ErrorKind::Malformed,
            Self::Ledger { .. } | Self::Messenger(_) => ErrorKind::External,
            Self::InvalidStateTransition { .. }
            | Self::CannotCancel(_)
            | Self::OrderNotFound(_)
            | Self::InvalidConfig(_) => ErrorKind::Local,
        }
    }

    pub(crate) fn ledger(ticker: impl ToString, message: impl ToString) -> Self {
        Self::Ledger {
            ticker: ticker.to_string(),
            message: message.to_string(),
        }
    }
}
