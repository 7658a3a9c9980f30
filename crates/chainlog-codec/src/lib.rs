//! Payload codecs for Chainlog.
//!
//! Records carry opaque bytes. Callers that want to store structured values
//! pick a [`PayloadCodec`] to turn them into bytes and back; the chain itself
//! never looks inside a payload and does not care which codec produced it.

pub mod codec;
pub mod error;
mod inspect;

pub use codec::{BincodeCodec, JsonCodec, PayloadCodec};
pub use error::{CodecError, CodecResult};
