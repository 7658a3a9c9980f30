use chainlog_types::Digest;

use crate::hasher::EncodingError;

/// Trait for entries that participate in a hash chain.
pub trait ChainLink {
    /// The entry's stored digest.
    fn digest(&self) -> Digest;
    /// The stored digest of the preceding entry (None for genesis).
    fn prev_digest(&self) -> Option<Digest>;
    /// Re-derive the digest from the entry's current fields.
    fn recompute_digest(&self) -> Result<Digest, EncodingError>;
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of entries forms a valid hash chain:
/// each entry's prev_digest matches the previous entry's digest,
/// and each entry's digest is correctly computed from its fields.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain of entries, reporting the first violation.
    ///
    /// Checks, in position order:
    /// 1. First entry has no previous digest
    /// 2. Each subsequent entry's prev_digest matches the previous digest
    /// 3. Each entry's digest is correct for its fields
    pub fn verify_chain(links: &[impl ChainLink]) -> Result<(), ChainError> {
        for (index, link) in links.iter().enumerate() {
            Self::check_link(links, index)?;

            let computed = link
                .recompute_digest()
                .map_err(|source| ChainError::Encoding { index, source })?;
            if computed != link.digest() {
                return Err(ChainError::DigestMismatch { index });
            }
        }
        Ok(())
    }

    /// Verify predecessor linkage only, without recomputing any digest.
    pub fn verify_links(links: &[impl ChainLink]) -> Result<(), ChainError> {
        (0..links.len()).try_for_each(|index| Self::check_link(links, index))
    }

    /// Check the link between `links[index]` and its predecessor.
    pub fn check_link(links: &[impl ChainLink], index: usize) -> Result<(), ChainError> {
        let link = links.get(index).ok_or(ChainError::IndexOutOfRange {
            index,
            len: links.len(),
        })?;
        let prev = link.prev_digest();
        if index == 0 {
            return match prev {
                Some(_) => Err(ChainError::GenesisHasPrevDigest),
                None => Ok(()),
            };
        }

        let expected = links[index - 1].digest();
        match prev {
            Some(prev) if prev == expected => Ok(()),
            Some(_) => Err(ChainError::BrokenLink { index }),
            None => Err(ChainError::MissingPrevDigest { index }),
        }
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis record has a previous digest (should be None)")]
    GenesisHasPrevDigest,

    #[error("broken link at index {index}: prev_digest does not match")]
    BrokenLink { index: usize },

    #[error("missing prev_digest at index {index} (should reference previous record)")]
    MissingPrevDigest { index: usize },

    #[error("digest mismatch at index {index}: computed digest differs from stored")]
    DigestMismatch { index: usize },

    #[error("no record at index {index} (chain has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("record at index {index} could not be encoded: {source}")]
    Encoding {
        index: usize,
        #[source]
        source: EncodingError,
    },
}

impl ChainError {
    /// Position of the offending record.
    pub fn index(&self) -> usize {
        match self {
            ChainError::GenesisHasPrevDigest => 0,
            ChainError::BrokenLink { index }
            | ChainError::MissingPrevDigest { index }
            | ChainError::DigestMismatch { index }
            | ChainError::IndexOutOfRange { index, .. }
            | ChainError::Encoding { index, .. } => *index,
        }
    }
}
