//! Append-only, hash-chained record ledger.
//!
//! This crate is the heart of Chainlog. It provides:
//! - [`Record`], a logically immutable entry whose digest covers its id,
//!   timestamp, predecessor digest and payload
//! - [`Ledger`], the single-owner append/validate/rehash collection
//! - [`SharedLedger`], the same ledger behind a lock for multi-threaded callers
//! - Chain audits that report every self-consistency and linkage violation
//!
//! Detection is limited to partial tampering: a chain rewritten and fully
//! rehashed by someone with write access to every record validates cleanly.

pub mod audit;
pub mod config;
pub mod error;
pub mod ledger;
pub mod record;
pub mod shared;

pub use audit::{AuditReport, Violation, ViolationKind};
pub use config::{ConfigError, LedgerConfig};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use record::Record;
pub use shared::SharedLedger;

pub use chainlog_codec::{BincodeCodec, CodecError, JsonCodec, PayloadCodec};
pub use chainlog_crypto::{ChainError, DigestAlgorithm, EncodingError};
pub use chainlog_types::{Clock, Digest, ManualClock, SystemClock};
