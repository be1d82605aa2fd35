//! # Protocol Messages
//!
//! The six swap negotiation messages. Every message carries the sender's
//! view of its own order, which the receiver uses to locate the local
//! complement.

use crate::domain::{ContractReference, Order, ReceivingAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A swap negotiation message. Variant and field order are the wire order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapMessage {
    /// Advertise an order to the network.
    CreateOrder(Order),
    /// Tell the owner of a remote order that we hold its complement.
    OrderMatch(Order),
    /// Ask the matcher for its receiving address, sending ours.
    RequestSwapAddress {
        /// Sender's order
        order: Order,
        /// Where the sender receives
        address: ReceivingAddress,
    },
    /// Answer with our receiving address.
    SwapAddressAck {
        /// Sender's order
        order: Order,
        /// Where the sender receives
        address: ReceivingAddress,
    },
    /// Initiator contract is on chain.
    ContractCreated {
        /// Sender's order
        order: Order,
        /// Initiator HTLC
        contract: ContractReference,
    },
    /// Reciprocal contract is on chain.
    ContractAck {
        /// Sender's order
        order: Order,
        /// Participant HTLC
        contract: ContractReference,
    },
}

impl SwapMessage {
    /// Protocol command name.
    pub fn command(&self) -> &'static str {
        match self {
            Self::CreateOrder(_) => "create_order",
            Self::OrderMatch(_) => "order_match",
            Self::RequestSwapAddress { .. } => "request_swap_address",
            Self::SwapAddressAck { .. } => "swap_address_ack",
            Self::ContractCreated { .. } => "contract_created",
            Self::ContractAck { .. } => "contract_ack",
        }
    }

    /// The order the message is about.
    pub fn order(&self) -> &Order {
        match self {
            Self::CreateOrder(order) | Self::OrderMatch(order) => order,
            Self::RequestSwapAddress { order, .. }
            | Self::SwapAddressAck { order, .. }
            | Self::ContractCreated { order, .. }
            | Self::ContractAck { order, .. } => order,
        }
    }
}

impl fmt::Display for SwapMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.command(), self.order())
    }
}
