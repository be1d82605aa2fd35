//! # Domain Value Objects
//!
//! Immutable value types for swap negotiation.

use super::errors::{Hash, SwapError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted ticker symbol.
pub const MAX_TICKER_LEN: usize = 12;

/// Longest accepted receiving address or contract reference.
pub const MAX_TOKEN_LEN: usize = 128;

/// Asset symbol (e.g. `BTC`, `LUX`).
///
/// 1 to [`MAX_TICKER_LEN`] upper-case ASCII letters or digits. Checked on
/// construction and when decoded off the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Create a ticker, rejecting malformed symbols.
    pub fn new(symbol: impl Into<String>) -> Result<Self, SwapError> {
        let symbol = symbol.into();
        let well_formed = !symbol.is_empty()
            && symbol.len() <= MAX_TICKER_LEN
            && symbol
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !well_formed {
            return Err(SwapError::InvalidTicker(symbol));
        }
        Ok(Self(symbol))
    }

    /// Symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = SwapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl FromStr for Ticker {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_token(kind: &'static str, value: &str) -> Result<(), SwapError> {
    if value.is_empty() {
        return Err(SwapError::InvalidToken {
            kind,
            reason: "empty".to_string(),
        });
    }
    if value.len() > MAX_TOKEN_LEN {
        return Err(SwapError::InvalidToken {
            kind,
            reason: format!("{} bytes exceeds {}", value.len(), MAX_TOKEN_LEN),
        });
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SwapError::InvalidToken {
            kind,
            reason: "contains whitespace".to_string(),
        });
    }
    Ok(())
}

/// Ledger address a counter-party should pay into.
///
/// Only the shape is checked here; whether the ledger accepts it is asked of
/// the ledger client.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReceivingAddress(String);

impl ReceivingAddress {
    /// Create an address token.
    pub fn new(value: impl Into<String>) -> Result<Self, SwapError> {
        let value = value.into();
        check_token("address", &value)?;
        Ok(Self(value))
    }

    /// Address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ReceivingAddress {
    type Error = SwapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReceivingAddress> for String {
    fn from(address: ReceivingAddress) -> Self {
        address.0
    }
}

impl fmt::Display for ReceivingAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to an on-chain HTLC (typically the funding txid).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractReference(String);

impl ContractReference {
    /// Create a contract reference token.
    pub fn new(value: impl Into<String>) -> Result<Self, SwapError> {
        let value = value.into();
        check_token("contract", &value)?;
        Ok(Self(value))
    }

    /// Reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContractReference {
    type Error = SwapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContractReference> for String {
    fn from(contract: ContractReference) -> Self {
        contract.0
    }
}

impl fmt::Display for ContractReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hash of an order's economic terms.
///
/// Two orders with the same terms share an id whatever their sender.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub Hash);

impl OrderId {
    /// Raw hash bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Full hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..6]))
    }
}

impl fmt::Debug for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderId({})", self)
    }
}

/// Identity of one book record. Assigned on insert, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Swap negotiation state machine.
///
/// Each side of a handshake visits a different subset of these states, so a
/// transition may skip ahead but never go back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapState {
    /// Standing offer, no counter-party bound.
    #[default]
    Open,
    /// A remote order matched; `order_match` sent to its owner.
    MatchFound,
    /// Our receiving address sent, waiting for theirs.
    SwapRequested,
    /// Addresses exchanged, waiting for the initiator contract.
    SwapAcknowledged,
    /// Our HTLC is on chain; refund deadline armed.
    ContractCreated,
    /// Reciprocal HTLC created against the counter-party's.
    ContractAcknowledged,
    /// Deadline passed before completion; refund pending.
    Refunding,
}

impl SwapState {
    fn rank(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::MatchFound => 1,
            Self::SwapRequested => 2,
            Self::SwapAcknowledged => 3,
            Self::ContractCreated => 4,
            Self::ContractAcknowledged => 5,
            Self::Refunding => 6,
        }
    }

    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: SwapState) -> bool {
        match (self, next) {
            (Self::Refunding, _) => false,
            (Self::ContractCreated | Self::ContractAcknowledged, Self::Refunding) => true,
            (_, Self::Refunding) => false,
            _ => next.rank() > self.rank(),
        }
    }

    /// No contract exists yet, so the order can still be dropped safely.
    pub fn is_negotiable(&self) -> bool {
        self.rank() < Self::ContractCreated.rank()
    }

    /// A counter-party is bound to the order.
    pub fn is_bound(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl fmt::Display for SwapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "OPEN",
            Self::MatchFound => "MATCH_FOUND",
            Self::SwapRequested => "SWAP_REQUESTED",
            Self::SwapAcknowledged => "SWAP_ACKNOWLEDGED",
            Self::ContractCreated => "CONTRACT_CREATED",
            Self::ContractAcknowledged => "CONTRACT_ACKNOWLEDGED",
            Self::Refunding => "REFUNDING",
        };
        f.write_str(name)
    }
}
