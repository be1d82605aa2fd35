//! # Wire Codec
//!
//! bincode framing for [`SwapMessage`]: fixed-width integers, a hard size
//! limit, and no trailing bytes. Tickers and tokens are re-validated while
//! decoding, so a decoded message is always well formed.

use super::messages::SwapMessage;
use crate::domain::SwapError;
use bincode::Options;

/// Default decode limit.
pub const DEFAULT_MAX_MESSAGE_BYTES: u64 = 64 * 1024;

/// Encoder/decoder for swap messages.
#[derive(Clone, Copy, Debug)]
pub struct SwapCodec {
    max_bytes: u64,
}

impl Default for SwapCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_BYTES)
    }
}

impl SwapCodec {
    /// Codec refusing payloads above `max_bytes`.
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_limit(self.max_bytes)
            .reject_trailing_bytes()
    }

    /// Encode a message.
    pub fn encode(&self, message: &SwapMessage) -> Result<Vec<u8>, SwapError> {
        self.options()
            .serialize(message)
            .map_err(|e| SwapError::MalformedMessage(e.to_string()))
    }

    /// Decode a message.
    pub fn decode(&self, bytes: &[u8]) -> Result<SwapMessage, SwapError> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(SwapError::MalformedMessage(format!(
                "{} bytes exceeds limit of {}",
                bytes.len(),
                self.max_bytes
            )));
        }
        self.options()
            .deserialize(bytes)
            .map_err(|e| SwapError::MalformedMessage(e.to_string()))
    }
}
