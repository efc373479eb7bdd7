//! Schema Forge
//!
//! Builds one extended JSON Schema document out of a published release
//! schema and a locally rebuilt variant, then audits the result.
//!
//! ## Pipeline
//!
//! ```text
//! release-schema.json ─┐
//!                      ├─ merge ─ augment ─ dialect check ─ extended-schema.json
//! local schema.json ───┘                                          │
//!                                      ┌──────────────┬───────────┤
//!                                    audit         verify       stats
//! ```
//!
//! ## Features
//!
//! - **Structural Merge**: objects merge recursively, `required` lists union,
//!   every other array is replaced by the overlay
//! - **Augmentation**: expression hints, auto titles, configured defaults and
//!   a generic `Event` definition, all idempotent
//! - **Integrity Audit**: dangling `#/definitions/` references and unused
//!   event definitions
//! - **Completeness Scoring**: four-criterion score per definition plus a
//!   deduction-based check of named components

pub mod audit;
pub mod augment;
pub mod checksum;
pub mod config;
pub mod document;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod reference;
pub mod stats;
pub mod validate;
pub mod verify;
pub mod walk;

pub use audit::{audit, AuditReport, ComponentScore};
pub use augment::{augment, AugmentRules, Augmenter};
pub use checksum::Checksum;
pub use config::ForgeConfig;
pub use document::SchemaDocument;
pub use error::{Result, SchemaError};
pub use merge::merge;
pub use reference::{RefCheck, ReferenceResolver};
pub use stats::{collect_stats, StatsReport};
pub use validate::{check_dialect, DialectReport};
pub use verify::{AliasTable, PropertyCount, VerificationResult, Verifier};
pub use walk::walk;
