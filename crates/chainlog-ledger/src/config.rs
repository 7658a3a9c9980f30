use chainlog_crypto::DigestAlgorithm;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Ledger`](crate::Ledger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Hash function used for newly appended records.
    pub algorithm: DigestAlgorithm,
    /// Number of records to reserve space for up front.
    pub initial_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::Blake3,
            initial_capacity: 0,
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid ledger config: {0}")]
    Parse(String),

    #[error("cannot serialize ledger config: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = LedgerConfig::default();
        assert_eq!(c.algorithm, DigestAlgorithm::Blake3);
        assert_eq!(c.initial_capacity, 0);
    }

    #[test]
    fn parse_full_toml() {
        let c = LedgerConfig::from_toml_str(
            r#"
            algorithm = "sha256-v1"
            initial_capacity = 128
            "#,
        )
        .unwrap();
        assert_eq!(c.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(c.initial_capacity, 128);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let c = LedgerConfig::from_toml_str("initial_capacity = 4").unwrap();
        assert_eq!(c.algorithm, DigestAlgorithm::Blake3);
        assert_eq!(c.initial_capacity, 4);
        assert_eq!(LedgerConfig::from_toml_str("").unwrap(), LedgerConfig::default());
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let err = LedgerConfig::from_toml_str(r#"algorithm = "md5""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let c = LedgerConfig::default().with_algorithm(DigestAlgorithm::Sha256);
        let text = c.to_toml_string().unwrap();
        assert_eq!(LedgerConfig::from_toml_str(&text).unwrap(), c);
    }
}
