//! Cryptographic primitives for Chainlog.
//!
//! Provides the canonical record encoding, versioned 256-bit digest
//! algorithms (BLAKE3 and SHA-256), and hash chain verification.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod chain;
pub mod hasher;

pub use chain::{ChainError, ChainLink, HashChainVerifier};
pub use hasher::{DigestAlgorithm, EncodingError, ParseAlgorithmError, RecordFields, RecordHasher};
