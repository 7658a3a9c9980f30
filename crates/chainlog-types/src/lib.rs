//! Foundation types for Chainlog.
//!
//! This crate provides the value types shared by every other Chainlog crate.
//!
//! # Key Types
//!
//! - [`Digest`] — Fixed-length 32-byte hash output identifying a record
//! - [`Clock`] — Time source used when records are created
//! - [`SystemClock`] / [`ManualClock`] — Wall-clock and test clocks

pub mod clock;
pub mod digest;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use digest::{decimal_bytes, Digest, DIGEST_LEN};
pub use error::TypeError;
