//! Error types for schema-forge
//!
//! The document engine itself never fails; only file I/O, parsing and
//! configuration surface errors.

use thiserror::Error;

/// Result type for schema-forge operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema-forge errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid release version: {0}")]
    InvalidVersion(String),

    #[error("Invalid schema document {path}: {reason}")]
    InvalidDocument { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
}
