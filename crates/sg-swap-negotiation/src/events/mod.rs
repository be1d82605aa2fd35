//! # Events Module
//!
//! Wire messages and their codec.

pub mod codec;
pub mod messages;

pub use codec::{SwapCodec, DEFAULT_MAX_MESSAGE_BYTES};
pub use messages::SwapMessage;
