//! Draft-07 well-formedness check of a whole document
//!
//! Failure here never stops a build; the result is logged and reported.

use jsonschema::{Draft, JSONSchema};
use serde::Serialize;
use tracing::{info, warn};

use crate::document::SchemaDocument;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialectReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl DialectReport {
    fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }
}

/// Compile the document as a Draft-07 schema
pub fn check_dialect(document: &SchemaDocument) -> DialectReport {
    info!("Validating generated JSON Schema");
    match JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(document.as_value())
    {
        Ok(_) => {
            info!("Schema is valid Draft-07");
            DialectReport::valid()
        }
        Err(error) => {
            let message = if error.instance_path.to_string().is_empty() {
                error.to_string()
            } else {
                format!("{}: {}", error.instance_path, error)
            };
            warn!(error = %message, "Schema is not valid Draft-07");
            DialectReport {
                valid: false,
                errors: vec![message],
            }
        }
    }
}
