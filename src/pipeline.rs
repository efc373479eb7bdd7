//! Stage sequencing for the command line
//!
//! Each function reads its inputs from the configured paths, calls into the
//! engine and writes its report. No stage feeds back into the document.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::audit::{audit, AuditReport};
use crate::augment::{AugmentRules, AugmentStats, Augmenter};
use crate::checksum::Checksum;
use crate::config::ForgeConfig;
use crate::document::{write_json, SchemaDocument};
use crate::error::Result;
use crate::merge::merge;
use crate::stats::{collect_stats, StatsReport};
use crate::validate::{check_dialect, DialectReport};
use crate::verify::{AliasTable, VerificationResult, Verifier};

/// What a build produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub release_version: String,
    /// Where the release artifact is published, in fetch order
    pub artifact_urls: Vec<String>,
    pub definitions: usize,
    pub checksum: Checksum,
    pub dialect: DialectReport,
    pub augmentation: AugmentationSummary,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AugmentationSummary {
    pub defaults_injected: usize,
    pub hints_added: usize,
    pub titles_added: usize,
    pub event_inserted: bool,
}

impl From<AugmentStats> for AugmentationSummary {
    fn from(stats: AugmentStats) -> Self {
        Self {
            defaults_injected: stats.defaults_injected,
            hints_added: stats.hints_added,
            titles_added: stats.titles_added,
            event_inserted: stats.event_inserted,
        }
    }
}

/// Merge the local document over the release one, then augment
pub fn assemble(
    release: &SchemaDocument,
    local: &SchemaDocument,
    rules: AugmentRules,
) -> (SchemaDocument, AugmentStats) {
    let merged = merge(release, local);
    Augmenter::with_rules(rules).augment_with_stats(merged)
}

/// Full build: load, merge, augment, check and write the output document
pub fn build(config: &ForgeConfig) -> Result<BuildSummary> {
    let version = config.release.parsed_version()?;
    let artifact_urls = config.release.artifact_urls()?;
    info!(%version, artifact = %artifact_urls[0], "Starting extended schema build");

    let release = SchemaDocument::load(&config.paths.release)?;
    let local = SchemaDocument::load_or_empty(&config.paths.local);

    let (document, stats) = assemble(&release, &local, AugmentRules::from_config(&config.augment));
    let dialect = check_dialect(&document);

    document.save(&config.paths.output, config.output.format)?;
    info!(path = %config.paths.output.display(), "Extended schema saved");

    let summary = BuildSummary {
        release_version: version.to_string(),
        artifact_urls,
        definitions: document.definition_count(),
        checksum: document.checksum(),
        dialect,
        augmentation: stats.into(),
        generated_at: Utc::now(),
    };
    info!(
        definitions = summary.definitions,
        checksum = %summary.checksum.short(),
        "Build complete"
    );
    Ok(summary)
}

/// Audit a built document and write the report
pub fn run_audit(config: &ForgeConfig, input: &Path) -> Result<AuditReport> {
    let document = SchemaDocument::load(input)?;
    let report = audit(&document);
    write_json(&config.paths.audit_report, &report, config.output.format)?;
    info!(path = %config.paths.audit_report.display(), "Audit report saved");
    Ok(report)
}

/// Verify the named components, or the configured targets when none are given
pub fn run_verify(config: &ForgeConfig, input: &Path, names: &[String]) -> Result<Vec<VerificationResult>> {
    let document = SchemaDocument::load(input)?;
    let targets: &[String] = if names.is_empty() { &config.verify.targets } else { names };
    let verifier = Verifier::with_aliases(AliasTable::from_config(&config.verify));
    let results = verifier.verify(&document, targets);
    write_json(&config.paths.verify_report, &results, config.output.format)?;
    info!(path = %config.paths.verify_report.display(), "Verification report saved");
    Ok(results)
}

/// Collect definition statistics and write the report
pub fn run_stats(config: &ForgeConfig, input: &Path) -> Result<StatsReport> {
    let document = SchemaDocument::load(input)?;
    let report = collect_stats(&document);
    write_json(&config.paths.stats_report, &report, config.output.format)?;
    info!(path = %config.paths.stats_report.display(), "Statistics report saved");
    Ok(report)
}
