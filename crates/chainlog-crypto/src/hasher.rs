use std::fmt;
use std::str::FromStr;

use chainlog_types::Digest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::Digest as _;

/// Versioned 256-bit hash function used to derive record digests.
///
/// The version tag travels with every record. Digests produced by different
/// algorithms (or different versions of one) are never comparable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// BLAKE3, 32-byte output.
    #[default]
    #[serde(rename = "blake3-v1")]
    Blake3,
    /// SHA-256, for interoperability with systems that expect it.
    #[serde(rename = "sha256-v1")]
    Sha256,
}

impl DigestAlgorithm {
    /// All supported algorithms, default first.
    pub const ALL: [DigestAlgorithm; 2] = [DigestAlgorithm::Blake3, DigestAlgorithm::Sha256];

    /// Stable version tag, e.g. `"blake3-v1"`.
    pub const fn tag(&self) -> &'static str {
        match self {
            DigestAlgorithm::Blake3 => "blake3-v1",
            DigestAlgorithm::Sha256 => "sha256-v1",
        }
    }

    /// Hash raw bytes in a single pass.
    pub fn hash(&self, data: &[u8]) -> Digest {
        match self {
            DigestAlgorithm::Blake3 => Digest::from_hash(*blake3::hash(data).as_bytes()),
            DigestAlgorithm::Sha256 => Digest::from_hash(sha2::Sha256::digest(data).into()),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" | "blake3-v1" => Ok(DigestAlgorithm::Blake3),
            "sha256" | "sha-256" | "sha256-v1" => Ok(DigestAlgorithm::Sha256),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

/// The four hashed fields of a record, borrowed.
#[derive(Clone, Copy, Debug)]
pub struct RecordFields<'a> {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub prev_digest: Option<&'a Digest>,
    pub data: &'a [u8],
}

/// Derives record digests from a canonical field encoding.
///
/// The hash input is, in order:
///
/// ```text
/// id           u64, 8 bytes little-endian
/// timestamp    i64 nanoseconds since the UNIX epoch, 8 bytes little-endian
/// prev_digest  32 raw bytes, or nothing for the first record
/// data         raw payload bytes
/// ```
///
/// Fields are not length-prefixed and an absent predecessor contributes no
/// bytes, so `prev = Some(d), data = x` hashes the same as
/// `prev = None, data = d ‖ x`. A record's digest alone therefore does not
/// pin down where its predecessor ends and its payload begins; linkage
/// checks ([`HashChainVerifier`](crate::HashChainVerifier)) are what rule out
/// moving a predecessor digest into the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordHasher {
    algorithm: DigestAlgorithm,
}

impl RecordHasher {
    /// Hasher using BLAKE3.
    pub const BLAKE3: Self = Self::new(DigestAlgorithm::Blake3);
    /// Hasher using SHA-256.
    pub const SHA256: Self = Self::new(DigestAlgorithm::Sha256);

    pub const fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The algorithm this hasher feeds canonical bytes through.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Build the exact byte sequence that gets hashed for `fields`.
    pub fn canonical_bytes(&self, fields: &RecordFields<'_>) -> Result<Vec<u8>, EncodingError> {
        let nanos = fields
            .timestamp
            .timestamp_nanos_opt()
            .ok_or(EncodingError::TimestampOutOfRange {
                timestamp: fields.timestamp,
            })?;

        let prev_len = fields.prev_digest.map_or(0, |d| d.as_bytes().len());
        let mut buf = Vec::with_capacity(16 + prev_len + fields.data.len());
        buf.extend_from_slice(&fields.id.to_le_bytes());
        buf.extend_from_slice(&nanos.to_le_bytes());
        if let Some(prev) = fields.prev_digest {
            buf.extend_from_slice(prev.as_bytes());
        }
        buf.extend_from_slice(fields.data);
        Ok(buf)
    }

    /// Compute the digest of a record's fields.
    ///
    /// Pure: identical fields always produce identical digests.
    pub fn compute_digest(&self, fields: &RecordFields<'_>) -> Result<Digest, EncodingError> {
        let canonical = self.canonical_bytes(fields)?;
        Ok(self.algorithm.hash(&canonical))
    }
}

/// A record field could not be written into the canonical hash input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("timestamp {timestamp} cannot be represented as i64 nanoseconds")]
    TimestampOutOfRange { timestamp: DateTime<Utc> },
}

/// An algorithm name did not match any supported digest algorithm.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown digest algorithm: {0}")]
pub struct ParseAlgorithmError(pub String);

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn at_nanos(nanos: i64) -> DateTime<Utc> {
        Utc.timestamp_nanos(nanos)
    }

    fn fields<'a>(
        id: u64,
        nanos: i64,
        prev: Option<&'a Digest>,
        data: &'a [u8],
    ) -> RecordFields<'a> {
        RecordFields {
            id,
            timestamp: at_nanos(nanos),
            prev_digest: prev,
            data,
        }
    }

    #[test]
    fn canonical_layout_without_predecessor() {
        let bytes = RecordHasher::BLAKE3
            .canonical_bytes(&fields(1, 2, None, b"ab"))
            .unwrap();
        let mut expected = vec![1, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0];
        expected.extend_from_slice(b"ab");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn canonical_layout_with_predecessor() {
        let prev = Digest::from_hash([0xEE; 32]);
        let bytes = RecordHasher::BLAKE3
            .canonical_bytes(&fields(7, -1, Some(&prev), b"z"))
            .unwrap();
        assert_eq!(bytes.len(), 8 + 8 + 32 + 1);
        assert_eq!(&bytes[..8], &7u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &(-1i64).to_le_bytes());
        assert_eq!(&bytes[16..48], prev.as_bytes());
        assert_eq!(bytes[48], b'z');
    }

    #[test]
    fn absent_predecessor_adds_no_bytes() {
        let prev = Digest::from_hash([0x42; 32]);
        let linked = fields(1, 9, Some(&prev), b"x");

        let mut spliced = prev.as_bytes().to_vec();
        spliced.extend_from_slice(b"x");
        let unlinked = fields(1, 9, None, &spliced);

        let hasher = RecordHasher::BLAKE3;
        assert_eq!(
            hasher.canonical_bytes(&linked).unwrap(),
            hasher.canonical_bytes(&unlinked).unwrap()
        );
        assert_eq!(
            hasher.compute_digest(&linked).unwrap(),
            hasher.compute_digest(&unlinked).unwrap()
        );
    }

    #[test]
    fn known_vectors() {
        assert_eq!(
            DigestAlgorithm::Sha256.hash(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            DigestAlgorithm::Blake3.hash(b"").to_hex(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn digest_is_hash_of_canonical_bytes() {
        let f = fields(3, 1_700_000_000_000_000_000, None, b"payload");
        for algorithm in DigestAlgorithm::ALL {
            let hasher = RecordHasher::new(algorithm);
            let canonical = hasher.canonical_bytes(&f).unwrap();
            assert_eq!(hasher.compute_digest(&f).unwrap(), algorithm.hash(&canonical));
        }
    }

    #[test]
    fn algorithms_disagree() {
        let f = fields(0, 0, None, b"same input");
        let a = RecordHasher::BLAKE3.compute_digest(&f).unwrap();
        let b = RecordHasher::SHA256.compute_digest(&f).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn every_field_affects_digest() {
        let prev = Digest::from_hash([1; 32]);
        let base = RecordHasher::BLAKE3
            .compute_digest(&fields(5, 10, Some(&prev), b"data"))
            .unwrap();

        let other_prev = Digest::from_hash([2; 32]);
        let variants = [
            fields(6, 10, Some(&prev), b"data"),
            fields(5, 11, Some(&prev), b"data"),
            fields(5, 10, Some(&other_prev), b"data"),
            fields(5, 10, None, b"data"),
            fields(5, 10, Some(&prev), b"datA"),
        ];
        for variant in variants {
            assert_ne!(RecordHasher::BLAKE3.compute_digest(&variant).unwrap(), base);
        }
    }

    #[test]
    fn timestamp_beyond_i64_nanos_is_rejected() {
        let far_future = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();
        let f = RecordFields {
            id: 0,
            timestamp: far_future,
            prev_digest: None,
            data: b"",
        };
        let err = RecordHasher::BLAKE3.compute_digest(&f).unwrap_err();
        assert_eq!(
            err,
            EncodingError::TimestampOutOfRange {
                timestamp: far_future
            }
        );
    }

    #[test]
    fn algorithm_tags_parse_back() {
        for algorithm in DigestAlgorithm::ALL {
            assert_eq!(algorithm.tag().parse::<DigestAlgorithm>().unwrap(), algorithm);
        }
        assert_eq!("SHA256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!(
            "md5".parse::<DigestAlgorithm>().unwrap_err(),
            ParseAlgorithmError("md5".into())
        );
    }

    #[test]
    fn algorithm_serializes_as_version_tag() {
        let json = serde_json::to_string(&DigestAlgorithm::Sha256).unwrap();
        assert_eq!(json, "\"sha256-v1\"");
        let parsed: DigestAlgorithm = serde_json::from_str("\"blake3-v1\"").unwrap();
        assert_eq!(parsed, DigestAlgorithm::Blake3);
    }

    proptest! {
        #[test]
        fn compute_digest_is_deterministic(
            id in any::<u64>(),
            nanos in -4_000_000_000_000_000_000i64..4_000_000_000_000_000_000i64,
            data in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let f = fields(id, nanos, None, &data);
            let first = RecordHasher::SHA256.compute_digest(&f).unwrap();
            let second = RecordHasher::SHA256.compute_digest(&f).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
