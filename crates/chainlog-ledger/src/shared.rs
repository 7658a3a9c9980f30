use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chainlog_codec::PayloadCodec;
use chainlog_types::Digest;
use serde::Serialize;

use crate::audit::AuditReport;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::record::Record;

/// A [`Ledger`] behind a read-write lock, for use from several threads.
///
/// Append holds the write lock across the whole read-head, hash, push
/// sequence, so concurrent appenders never observe the same position or
/// chain to the same predecessor.
#[derive(Debug, Default)]
pub struct SharedLedger {
    inner: RwLock<Ledger>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: RwLock::new(ledger),
        }
    }

    pub fn append(&self, data: impl Into<Vec<u8>>) -> Result<u64, LedgerError> {
        self.write()?.append(data)
    }

    pub fn append_value<C, T>(&self, codec: &C, value: &T) -> Result<u64, LedgerError>
    where
        C: PayloadCodec,
        T: Serialize + ?Sized,
    {
        // Encode outside the lock; only the chaining step needs exclusion.
        let data = codec.encode(value)?;
        self.append(data)
    }

    pub fn validate_at(&self, index: usize) -> Result<bool, LedgerError> {
        self.read()?.validate_at(index)
    }

    pub fn validate_all(&self) -> Result<bool, LedgerError> {
        self.read()?.validate_all()
    }

    pub fn validate_chain(&self) -> Result<bool, LedgerError> {
        self.read()?.validate_chain()
    }

    pub fn audit(&self) -> Result<AuditReport, LedgerError> {
        self.read()?.audit()
    }

    /// See [`Ledger::recompute_all`]; the same partial-completion rules apply.
    pub fn recompute_all(&self) -> Result<(), LedgerError> {
        self.write()?.recompute_all()
    }

    /// A copy of the record at `index`, or `None` when out of range.
    pub fn get_at(&self, index: usize) -> Result<Option<Record>, LedgerError> {
        Ok(self.read()?.get_at(index).cloned())
    }

    /// A copy of every record, in position order.
    pub fn snapshot(&self) -> Result<Vec<Record>, LedgerError> {
        Ok(self.read()?.get_all().to_vec())
    }

    pub fn head_digest(&self) -> Result<Option<Digest>, LedgerError> {
        Ok(self.read()?.head_digest())
    }

    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.read()?.is_empty())
    }

    /// Unwrap the inner ledger.
    pub fn into_inner(self) -> Result<Ledger, LedgerError> {
        self.inner.into_inner().map_err(|_| LedgerError::LockPoisoned)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
