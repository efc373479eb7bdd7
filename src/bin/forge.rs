//! Schema Forge CLI
//!
//! Usage:
//!   schema-forge build
//!   schema-forge audit --input extended-schema.json
//!   schema-forge verify Button Form
//!   schema-forge config init

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schema_forge::pipeline;
use schema_forge::ForgeConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-forge")]
#[command(about = "Merge, augment and audit the extended component schema")]
struct Cli {
    /// Explicit config file, layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge release and local schemas, augment and write the output
    Build {
        /// Release schema (overrides config)
        #[arg(long)]
        release: Option<PathBuf>,
        /// Local schema (overrides config)
        #[arg(long)]
        local: Option<PathBuf>,
        /// Output file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check references and score every definition
    Audit {
        /// Document to audit (defaults to the configured output)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check specific components by friendly name
    Verify {
        /// Component names (defaults to the configured targets)
        names: Vec<String>,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Per-definition property statistics
    Stats {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show or write configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the default configuration
    Init {
        #[arg(default_value = "schema-forge.toml")]
        path: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = ForgeConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Build { release, local, output } => {
            if let Some(path) = release {
                config.paths.release = path;
            }
            if let Some(path) = local {
                config.paths.local = path;
            }
            if let Some(path) = output {
                config.paths.output = path;
            }

            let summary = pipeline::build(&config)
                .with_context(|| format!("building from {}", config.paths.release.display()))?;

            println!("✅ Extended schema saved to: {}", config.paths.output.display());
            println!("   Release:     {}", summary.release_version);
            for url in &summary.artifact_urls {
                println!("   Artifact:    {}", url);
            }
            println!("   Definitions: {}", summary.definitions);
            println!("   Checksum:    {}", summary.checksum);
            println!("   Generated:   {}", summary.generated_at.to_rfc3339());
            if !summary.dialect.valid {
                println!("⚠️  Output is not valid Draft-07:");
                for error in &summary.dialect.errors {
                    println!("   - {}", error);
                }
            }
        }

        Commands::Audit { input } => {
            let input = input.unwrap_or_else(|| config.paths.output.clone());
            let report = pipeline::run_audit(&config, &input)
                .with_context(|| format!("auditing {}", input.display()))?;
            let summary = &report.summary;

            println!("Audit of {} components", summary.total_components);
            println!("   Broken references: {}", summary.broken_reference_count);
            for broken in report.broken_references.iter().take(10) {
                println!("   - {}", broken);
            }
            println!(
                "   Unused events:     {} of {}",
                summary.unused_event_count, summary.event_definition_count
            );
            println!("   Perfect scores:    {}", summary.perfect_score_count);
            println!("   Incomplete:        {}", report.incomplete_components.len());
            println!("   Avg properties:    {:.1}", summary.average_property_count);
            println!("Report saved to: {}", config.paths.audit_report.display());
        }

        Commands::Verify { names, input } => {
            let input = input.unwrap_or_else(|| config.paths.output.clone());
            let results = pipeline::run_verify(&config, &input, &names)
                .with_context(|| format!("verifying {}", input.display()))?;

            for result in &results {
                match &result.resolved_definition {
                    Some(definition) => println!(
                        "{} -> {} (score {})",
                        result.component, definition, result.completeness_score
                    ),
                    None => {
                        println!("{} -> not found", result.component);
                        if !result.suggestions.is_empty() {
                            println!("   did you mean: {}", result.suggestions.join(", "));
                        }
                    }
                }
                for warning in &result.warnings {
                    println!("   ⚠️  {}", warning);
                }
            }
            println!("Report saved to: {}", config.paths.verify_report.display());
        }

        Commands::Stats { input } => {
            let input = input.unwrap_or_else(|| config.paths.output.clone());
            let report = pipeline::run_stats(&config, &input)
                .with_context(|| format!("collecting statistics for {}", input.display()))?;
            let summary = &report.summary;

            println!("=== Completeness Summary ===");
            println!("Total Components: {}", summary.total_components);
            println!("Total Properties: {}", summary.total_properties);
            println!("Total Enums: {}", summary.total_enums);
            println!("Total Defaults: {}", summary.total_defaults);
            println!("Expression Hints Detected: {}", summary.expression_hints);
            println!("Components with potential issues: {}", summary.components_with_issues);
            if !summary.empty_sample.is_empty() {
                println!("Components with 0 visible properties: {}", summary.empty_sample.join(", "));
            }
            println!("Report saved to: {}", config.paths.stats_report.display());
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Init { path } => {
                ForgeConfig::default()
                    .save(&path)
                    .with_context(|| format!("writing {}", path))?;
                println!("✅ Wrote default configuration to {}", path);
            }
        },
    }

    Ok(())
}
