use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::inspect::inspect;

/// Strategy for turning structured values into record payload bytes.
///
/// Implementations must round-trip: `decode(encode(v)) == v` for every value
/// type they accept. A value that is itself absent (`None` or `()`) is refused
/// with [`CodecError::NilPayload`]; that decision is made from the value's
/// type, never from the encoded bytes, so every codec agrees on it. Present
/// values such as `Some(())` or a unit struct always encode.
pub trait PayloadCodec {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T>;

    /// Encode an optional value, failing with [`CodecError::NilPayload`] on `None`.
    fn encode_opt<T: Serialize>(&self, value: Option<&T>) -> CodecResult<Vec<u8>> {
        match value {
            Some(value) => self.encode(value),
            None => Err(CodecError::NilPayload),
        }
    }
}

/// Compact binary encoding via `bincode`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeCodec;

impl PayloadCodec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>> {
        if inspect(value, false)?.nil {
            return Err(CodecError::NilPayload);
        }
        bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Human-readable encoding via `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>> {
        let shape = inspect(value, true)?;
        if shape.nil {
            return Err(CodecError::NilPayload);
        }
        // serde_json silently writes NaN and infinities as `null`.
        if shape.non_finite {
            return Err(CodecError::Encode("non-finite float has no JSON representation".into()));
        }
        serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
