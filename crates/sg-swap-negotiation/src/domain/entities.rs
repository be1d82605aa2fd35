//! # Domain Entities
//!
//! Orders, book records and the contract descriptions exchanged with ledger
//! clients.

use super::errors::{Hash, PeerAddress, SwapError};
use super::invariants::{
    invariant_distinct_assets, invariant_positive_amounts, invariant_valid_sender,
};
use super::secure_secret::SecureSecret;
use super::value_objects::{
    ContractReference, OrderId, ReceivingAddress, RecordId, SwapState, Ticker,
};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// A standing offer: `base_amount` of `base` for `rel_amount` of `rel`.
///
/// Field order is the wire order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Asset offered.
    pub base: Ticker,
    /// Asset wanted.
    pub rel: Ticker,
    /// Quantity offered, in base units of `base`.
    pub base_amount: u64,
    /// Quantity wanted, in base units of `rel`.
    pub rel_amount: u64,
    /// Network address of the originating node.
    pub sender: PeerAddress,
}

/// A peer's order carried by a protocol message. Never stored in the book.
pub type RemoteOrder = Order;

impl Order {
    /// Create an order.
    pub fn new(
        base: Ticker,
        rel: Ticker,
        base_amount: u64,
        rel_amount: u64,
        sender: PeerAddress,
    ) -> Self {
        Self {
            base,
            rel,
            base_amount,
            rel_amount,
            sender,
        }
    }

    /// Content hash over the economic terms (sender excluded).
    ///
    /// Double SHA-256 of the length-prefixed tickers followed by both
    /// amounts in little-endian.
    pub fn id(&self) -> OrderId {
        let mut hasher = Sha256::new();
        for ticker in [&self.base, &self.rel] {
            hasher.update([ticker.as_str().len() as u8]);
            hasher.update(ticker.as_str().as_bytes());
        }
        hasher.update(self.base_amount.to_le_bytes());
        hasher.update(self.rel_amount.to_le_bytes());
        let first = hasher.finalize();

        let mut id = [0u8; 32];
        id.copy_from_slice(&Sha256::digest(first));
        OrderId(id)
    }

    /// Check the entry invariants.
    pub fn validate(&self) -> Result<(), SwapError> {
        if !invariant_valid_sender(&self.sender) {
            return Err(SwapError::InvalidOrder(format!(
                "sender {} is not a routable address",
                self.sender
            )));
        }
        if !invariant_positive_amounts(self.base_amount, self.rel_amount) {
            return Err(SwapError::InvalidOrder(format!(
                "amounts must be positive: {}",
                self
            )));
        }
        if !invariant_distinct_assets(&self.base, &self.rel) {
            return Err(SwapError::InvalidOrder(format!(
                "base and rel are both {}",
                self.base
            )));
        }
        Ok(())
    }

    /// The exact complement of this order, originating from `sender`.
    pub fn mirror(&self, sender: PeerAddress) -> Self {
        Self {
            base: self.rel.clone(),
            rel: self.base.clone(),
            base_amount: self.rel_amount,
            rel_amount: self.base_amount,
            sender,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {} (from {})",
            self.base_amount, self.base, self.rel_amount, self.rel, self.sender
        )
    }
}

/// Negotiation progress of a book record.
#[derive(Clone, Debug, Default)]
pub struct SwapProgress {
    /// Current state.
    pub state: SwapState,
    /// Declared sender of the remote order bound to this one.
    pub counterparty: Option<PeerAddress>,
    /// Where we receive the `rel` asset.
    pub our_address: Option<ReceivingAddress>,
    /// Where the counter-party receives our `base` asset.
    pub counterparty_address: Option<ReceivingAddress>,
    /// HTLC we funded.
    pub our_contract: Option<ContractReference>,
    /// HTLC the counter-party funded.
    pub counterparty_contract: Option<ContractReference>,
    /// Shared hash lock.
    pub hash_lock: Option<Hash>,
    /// Preimage (initiator side only).
    pub secret: Option<SecureSecret>,
    /// Refund deadline (unix seconds, adjusted network time).
    pub refund_deadline: Option<u64>,
}

/// A locally-owned order record.
///
/// Terms are immutable. Progress is only mutated by the
/// [`OrderBook`](crate::service::OrderBook) while it holds its own lock.
#[derive(Debug)]
pub struct LocalOrder {
    record: RecordId,
    id: OrderId,
    order: Order,
    created_at: u64,
    progress: Mutex<SwapProgress>,
}

/// Shared handle to a book record, valid after removal for as long as held.
pub type OrderHandle = Arc<LocalOrder>;

impl LocalOrder {
    pub(crate) fn new(record: RecordId, order: Order, created_at: u64) -> Self {
        Self {
            record,
            id: order.id(),
            order,
            created_at,
            progress: Mutex::new(SwapProgress::default()),
        }
    }

    /// Book record identity.
    pub fn record(&self) -> RecordId {
        self.record
    }

    /// Content hash of the terms.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// The order terms.
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Creation timestamp (unix seconds).
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Current state.
    pub fn state(&self) -> SwapState {
        self.progress.lock().state
    }

    /// Bound counter-party, if any.
    pub fn counterparty(&self) -> Option<PeerAddress> {
        self.progress.lock().counterparty
    }

    /// HTLC we funded, if any.
    pub fn our_contract(&self) -> Option<ContractReference> {
        self.progress.lock().our_contract.clone()
    }

    /// HTLC the counter-party funded, if seen.
    pub fn counterparty_contract(&self) -> Option<ContractReference> {
        self.progress.lock().counterparty_contract.clone()
    }

    pub(crate) fn progress(&self) -> SwapProgress {
        self.progress.lock().clone()
    }

    pub(crate) fn progress_mut(&self) -> MutexGuard<'_, SwapProgress> {
        self.progress.lock()
    }

    pub(crate) fn snapshot(&self) -> OrderSnapshot {
        let progress = self.progress.lock();
        OrderSnapshot {
            record: self.record,
            id: self.id,
            order: self.order.clone(),
            created_at: self.created_at,
            state: progress.state,
            counterparty: progress.counterparty,
        }
    }
}

/// Point-in-time view of a book record, for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSnapshot {
    /// Record identity.
    pub record: RecordId,
    /// Content hash.
    pub id: OrderId,
    /// Terms.
    pub order: Order,
    /// Creation timestamp.
    pub created_at: u64,
    /// State at snapshot time.
    pub state: SwapState,
    /// Bound counter-party.
    pub counterparty: Option<PeerAddress>,
}

/// What a ledger client is asked to lock in a new HTLC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractParams {
    /// Who can redeem with the preimage.
    pub recipient: ReceivingAddress,
    /// Where funds return after the time lock.
    pub refund_to: ReceivingAddress,
    /// Amount locked.
    pub amount: u64,
    /// SHA-256 of the secret.
    pub hash_lock: Hash,
    /// Unix timestamp after which refund is allowed.
    pub time_lock: u64,
}

/// What a ledger client reports about an existing HTLC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractDetails {
    /// The contract looked up.
    pub contract: ContractReference,
    /// Redeemer.
    pub recipient: ReceivingAddress,
    /// Amount locked.
    pub amount: u64,
    /// SHA-256 of the secret.
    pub hash_lock: Hash,
    /// Unix timestamp after which refund is allowed.
    pub time_lock: u64,
}

/// Raised when a refund deadline fires before the swap completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefundNotice {
    /// Record that timed out.
    pub record: RecordId,
    /// Content hash.
    pub order_id: OrderId,
    /// Terms.
    pub order: Order,
    /// Ledger holding our contract (the order's `base`).
    pub ticker: Ticker,
    /// Our contract, if one was recorded.
    pub contract: Option<ContractReference>,
    /// Deadline that fired.
    pub deadline: u64,
}
