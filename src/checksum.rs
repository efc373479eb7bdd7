//! SHA256 fingerprints for generated schema documents

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA256 of a document's serialized form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(data)))
    }

    /// Fingerprint a JSON value using its compact serialization.
    ///
    /// Key order is document order, so two documents that differ only in
    /// key order hash differently. That is intended: the written file is
    /// what gets fingerprinted.
    pub fn of_json(value: &serde_json::Value) -> Self {
        let compact = serde_json::to_vec(value).unwrap_or_default();
        Self::from_bytes(&compact)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
