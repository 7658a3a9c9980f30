use std::fmt;

use chainlog_codec::{CodecResult, PayloadCodec};
use chainlog_crypto::{ChainLink, DigestAlgorithm, EncodingError, RecordFields, RecordHasher};
use chainlog_types::{decimal_bytes, Digest};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One chained entry in a [`Ledger`](crate::Ledger).
///
/// The stored `digest` covers `id`, `timestamp`, `prev_digest` and `data`.
/// Records are created by the ledger at append time and never change
/// afterwards, apart from a bulk rehash overwriting the cached digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub(crate) id: u64,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) data: Vec<u8>,
    pub(crate) prev_digest: Option<Digest>,
    pub(crate) digest: Digest,
    pub(crate) algorithm: DigestAlgorithm,
}

impl Record {
    /// Build a record and compute its digest.
    pub fn create(
        id: u64,
        prev_digest: Option<Digest>,
        data: Vec<u8>,
        timestamp: DateTime<Utc>,
        algorithm: DigestAlgorithm,
    ) -> Result<Self, EncodingError> {
        let mut record = Self {
            id,
            timestamp,
            data,
            prev_digest,
            digest: Digest::from_hash([0; 32]),
            algorithm,
        };
        record.digest = record.recompute_digest()?;
        Ok(record)
    }

    /// Re-derive the digest from the record's current fields.
    pub fn recompute_digest(&self) -> Result<Digest, EncodingError> {
        RecordHasher::new(self.algorithm).compute_digest(&self.fields())
    }

    /// Whether the stored digest matches the current fields.
    ///
    /// Only checks this record; predecessor linkage is the ledger's concern.
    pub fn validate(&self) -> Result<bool, EncodingError> {
        Ok(self.recompute_digest()? == self.digest)
    }

    /// Overwrite the stored digest with one derived from the current fields.
    pub(crate) fn rehash(&mut self) -> Result<Digest, EncodingError> {
        self.digest = self.recompute_digest()?;
        Ok(self.digest)
    }

    /// Decode the payload with the codec that produced it.
    pub fn decode_data<C: PayloadCodec, T: DeserializeOwned>(&self, codec: &C) -> CodecResult<T> {
        codec.decode(&self.data)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn prev_digest(&self) -> Option<Digest> {
        self.prev_digest
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn fields(&self) -> RecordFields<'_> {
        RecordFields {
            id: self.id,
            timestamp: self.timestamp,
            prev_digest: self.prev_digest.as_ref(),
            data: &self.data,
        }
    }
}

impl ChainLink for Record {
    fn digest(&self) -> Digest {
        self.digest
    }

    fn prev_digest(&self) -> Option<Digest> {
        self.prev_digest
    }

    fn recompute_digest(&self) -> Result<Digest, EncodingError> {
        Record::recompute_digest(self)
    }
}

/// Diagnostic rendering for humans; not meant to be parsed back.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {}", self.id)?;
        writeln!(
            f,
            "timestamp: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
        )?;
        writeln!(f, "algorithm: {}", self.algorithm)?;
        writeln!(f, "digest: {}", self.digest.to_decimal_string())?;
        let prev = self
            .prev_digest
            .map(|d| d.to_decimal_string())
            .unwrap_or_else(|| decimal_bytes(&[]));
        writeln!(f, "prev digest: {prev}")?;
        writeln!(f, "data: {}", decimal_bytes(&self.data))
    }
}
