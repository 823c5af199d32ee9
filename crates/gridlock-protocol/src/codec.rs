//! Codec trait and the JSON implementation.
//!
//! The transport carries text frames; a codec converts between Rust
//! types and frame strings. Everything above the transport addresses
//! messages through this trait, so a binary codec could be swapped in
//! without touching the gateway.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ProtocolError;

/// Converts protocol types to and from transport frames.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a frame string.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError>;

    /// Deserializes a frame string back into a value.
    fn decode<T: DeserializeOwned>(
        &self,
        frame: &str,
    ) -> Result<T, ProtocolError>;
}

/// JSON framing via `serde_json`. Human-readable, inspectable in
/// browser dev tools, and the format the store's pub/sub payloads
/// already use — one encoding end to end.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        frame: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}
