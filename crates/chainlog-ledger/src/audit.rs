use chainlog_crypto::{ChainError, HashChainVerifier};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::record::Record;

/// Result of a full chain audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub record_count: u64,
    pub digests_valid: bool,
    pub links_valid: bool,
    pub sequence_valid: bool,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violation at the lowest position, if any.
    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.iter().min_by_key(|v| v.index)
    }

    /// Check every record, collecting all violations instead of stopping.
    ///
    /// An encoding failure while recomputing a digest aborts the audit.
    pub fn build(records: &[Record]) -> Result<Self, LedgerError> {
        let mut violations = Vec::new();
        let mut digests_valid = true;
        let mut links_valid = true;
        let mut sequence_valid = true;

        for (index, record) in records.iter().enumerate() {
            if record.id() != index as u64 {
                sequence_valid = false;
                violations.push(Violation {
                    index,
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected id {index}, found {}", record.id()),
                });
            }

            if let Err(err) = HashChainVerifier::check_link(records, index) {
                links_valid = false;
                violations.push(Violation::from_chain_error(&err));
            }

            if !record.validate()? {
                digests_valid = false;
                violations.push(Violation {
                    index,
                    kind: ViolationKind::DigestMismatch,
                    description: "stored digest does not match recomputed digest".into(),
                });
            }
        }

        Ok(Self {
            record_count: records.len() as u64,
            digests_valid,
            links_valid,
            sequence_valid,
            violations,
        })
    }
}

/// A specific integrity violation detected during an audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub index: usize,
    pub kind: ViolationKind,
    pub description: String,
}

impl Violation {
    fn from_chain_error(err: &ChainError) -> Self {
        let kind = match err {
            ChainError::GenesisHasPrevDigest => ViolationKind::GenesisHasPrevDigest,
            ChainError::BrokenLink { .. } | ChainError::IndexOutOfRange { .. } => {
                ViolationKind::BrokenLink
            }
            ChainError::MissingPrevDigest { .. } => ViolationKind::MissingPrevDigest,
            ChainError::DigestMismatch { .. } | ChainError::Encoding { .. } => {
                ViolationKind::DigestMismatch
            }
        };
        Self {
            index: err.index(),
            kind,
            description: err.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    SequenceGap,
    GenesisHasPrevDigest,
    BrokenLink,
    MissingPrevDigest,
    DigestMismatch,
}
