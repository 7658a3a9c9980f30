use chainlog_codec::CodecError;
use chainlog_crypto::EncodingError;

/// Errors produced by ledger operations.
///
/// A digest mismatch is never an error: validation reports it as `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("hash computation failed: {0}")]
    HashComputation(#[from] EncodingError),

    #[error("index {index} out of range for ledger of {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("payload codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
