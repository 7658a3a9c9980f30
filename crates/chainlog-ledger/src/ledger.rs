use std::fmt;
use std::sync::Arc;

use chainlog_codec::PayloadCodec;
use chainlog_crypto::{ChainError, HashChainVerifier};
use chainlog_types::{Clock, Digest, SystemClock};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit::AuditReport;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::record::Record;

/// Ordered, append-only sequence of hash-chained records.
///
/// Record identity is positional: a record's id equals its index, and every
/// lookup or validation call takes an index. There is no removal, so indices
/// stay stable for the life of the ledger.
///
/// Mutating operations take `&mut self`. Wrap the ledger in a
/// [`SharedLedger`](crate::SharedLedger) to append from several threads.
pub struct Ledger {
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    records: Vec<Record>,
}

impl Ledger {
    /// An empty ledger with the default config and the system clock.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// An empty ledger reading creation times from `clock`.
    pub fn with_clock(config: LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        let records = Vec::with_capacity(config.initial_capacity);
        Self {
            config,
            clock,
            records,
        }
    }

    /// Rebuild a ledger from previously exported records, as-is.
    ///
    /// Nothing is rehashed or checked; call [`Ledger::audit`] to find out
    /// whether the records still form a valid chain.
    pub fn from_records(config: LedgerConfig, records: Vec<Record>) -> Self {
        Self::from_records_with_clock(config, Arc::new(SystemClock), records)
    }

    /// Like [`Ledger::from_records`], with later appends reading `clock`.
    pub fn from_records_with_clock(
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            config,
            clock,
            records,
        }
    }

    /// Append a payload, returning the new record's position.
    ///
    /// The record is chained to the current head. If its digest cannot be
    /// computed the ledger is left exactly as it was.
    pub fn append(&mut self, data: impl Into<Vec<u8>>) -> Result<u64, LedgerError> {
        let id = self.records.len() as u64;
        let prev_digest = self.head_digest();
        let timestamp = self.clock.now();

        let record = Record::create(id, prev_digest, data.into(), timestamp, self.config.algorithm)
            .inspect_err(|e| warn!(id, error = %e, "record construction failed"))?;

        debug!(
            id,
            digest = %record.digest().short_hex(),
            len = record.data().len(),
            "appended record"
        );
        self.records.push(record);
        Ok(id)
    }

    /// Encode `value` with `codec` and append the resulting bytes.
    pub fn append_value<C, T>(&mut self, codec: &C, value: &T) -> Result<u64, LedgerError>
    where
        C: PayloadCodec,
        T: Serialize + ?Sized,
    {
        let data = codec.encode(value)?;
        self.append(data)
    }

    /// Self-consistency of the record at `index`, ignoring its neighbours.
    pub fn validate_at(&self, index: usize) -> Result<bool, LedgerError> {
        let record = self.records.get(index).ok_or(LedgerError::IndexOutOfRange {
            index,
            len: self.records.len(),
        })?;
        Ok(record.validate()?)
    }

    /// `true` iff every record is self-consistent. Stops at the first failure.
    ///
    /// This does not check predecessor linkage: an ancestor that was edited
    /// and rehashed passes. Use [`Ledger::validate_chain`] for both checks.
    pub fn validate_all(&self) -> Result<bool, LedgerError> {
        for (index, record) in self.records.iter().enumerate() {
            if !record.validate()? {
                warn!(index, "record failed self-validation");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `true` iff every `prev_digest` matches the current digest of its
    /// predecessor and the first record has none. No digests are recomputed.
    pub fn verify_links(&self) -> bool {
        match HashChainVerifier::verify_links(&self.records) {
            Ok(()) => true,
            Err(err) => {
                warn!(index = err.index(), error = %err, "chain link check failed");
                false
            }
        }
    }

    /// `true` iff every record is self-consistent and correctly linked.
    pub fn validate_chain(&self) -> Result<bool, LedgerError> {
        match self.verify_chain() {
            Ok(()) => Ok(true),
            Err(ChainError::Encoding { source, .. }) => Err(source.into()),
            Err(err) => {
                warn!(index = err.index(), error = %err, "chain validation failed");
                Ok(false)
            }
        }
    }

    /// Like [`Ledger::validate_chain`], but reports the first violation.
    pub fn verify_chain(&self) -> Result<(), ChainError> {
        HashChainVerifier::verify_chain(&self.records)
    }

    /// Check every record and collect all violations.
    pub fn audit(&self) -> Result<AuditReport, LedgerError> {
        let report = AuditReport::build(&self.records)?;
        info!(
            records = report.record_count,
            violations = report.violations.len(),
            "ledger audit complete"
        );
        Ok(report)
    }

    /// Recompute and overwrite every stored digest, in position order.
    ///
    /// Not atomic: on the first failure the call returns, leaving earlier
    /// records rehashed and later records untouched. Predecessor digests are
    /// not rewritten, so rehashing after an edit leaves the link check failing.
    pub fn recompute_all(&mut self) -> Result<(), LedgerError> {
        for (index, record) in self.records.iter_mut().enumerate() {
            let digest = record
                .rehash()
                .inspect_err(|e| warn!(index, error = %e, "rehash aborted"))?;
            debug!(index, digest = %digest.short_hex(), "rehashed record");
        }
        info!(records = self.records.len(), "recomputed all digests");
        Ok(())
    }

    /// All records in position order.
    pub fn get_all(&self) -> &[Record] {
        &self.records
    }

    /// The record at `index`, or `None` when out of range.
    pub fn get_at(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn head(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Digest of the most recent record; the next append chains to it.
    pub fn head_digest(&self) -> Option<Digest> {
        self.head().map(Record::digest)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Consume the ledger, returning its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .field("len", &self.records.len())
            .field("head", &self.head_digest())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
