//! Configuration management for schema-forge
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-forge.toml)
//! - Environment variables (FORGE__*)
//!
//! ## Example config file (schema-forge.toml):
//! ```toml
//! [release]
//! version = "6.13.0"
//!
//! [paths]
//! release = "release-schema.json"
//! local = "amis-src/packages/amis/schema.json"
//! output = "extended-schema.json"
//!
//! [output]
//! format = "pretty"
//!
//! [[augment.defaults]]
//! definition = "Tpl"
//! property = "className"
//! value = "my-tpl-class"
//!
//! [verify]
//! targets = ["Button", "Form", "CRUD", "Dialog"]
//!
//! [[verify.aliases]]
//! name = "Page"
//! candidates = ["Page", "PageSchema"]
//! ```
//!
//! Definition and property names are case-sensitive, so they are given as
//! values rather than table keys.

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SchemaError};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgeConfig {
    /// Upstream release artifact
    #[serde(default)]
    pub release: ReleaseConfig,

    /// Input, output and report locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Extra augmentation rules
    #[serde(default)]
    pub augment: AugmentConfig,

    /// Component verification settings
    #[serde(default)]
    pub verify: VerifyConfig,
}

/// Release artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Release version, with or without a leading `v`
    #[serde(default = "default_release_version")]
    pub version: String,

    /// Artifact URL; `{version}` is substituted
    #[serde(default = "default_url_template")]
    pub url_template: String,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Downloaded release schema
    #[serde(default = "default_release_path")]
    pub release: PathBuf,

    /// Locally built schema (may be missing)
    #[serde(default = "default_local_path")]
    pub local: PathBuf,

    /// Merged and augmented output
    #[serde(default = "default_output_path")]
    pub output: PathBuf,

    #[serde(default = "default_audit_report")]
    pub audit_report: PathBuf,

    #[serde(default = "default_verify_report")]
    pub verify_report: PathBuf,

    #[serde(default = "default_stats_report")]
    pub stats_report: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Augmentation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Extra default-injection rules
    #[serde(default)]
    pub defaults: Vec<DefaultRule>,
}

/// Inject `value` as the default of `definition.properties.<property>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultRule {
    pub definition: String,
    pub property: String,
    pub value: serde_json::Value,
}

/// Verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Components checked when none are named on the command line
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,

    /// Extra friendly-name aliases; entries replace built-in ones
    #[serde(default)]
    pub aliases: Vec<AliasRule>,
}

/// Friendly component name and the definition names tried for it, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRule {
    pub name: String,
    pub candidates: Vec<String>,
}

// Default value functions
fn default_release_version() -> String {
    "6.13.0".to_string()
}

fn default_url_template() -> String {
    "https://github.com/baidu/amis/releases/download/{version}/schema.json".to_string()
}

fn default_release_path() -> PathBuf {
    PathBuf::from("release-schema.json")
}

fn default_local_path() -> PathBuf {
    PathBuf::from("amis-src/packages/amis/schema.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("extended-schema.json")
}

fn default_audit_report() -> PathBuf {
    PathBuf::from("missing_fields_report.json")
}

fn default_verify_report() -> PathBuf {
    PathBuf::from("component-report.json")
}

fn default_stats_report() -> PathBuf {
    PathBuf::from("validation-report.json")
}

fn default_targets() -> Vec<String> {
    ["Button", "Form", "CRUD", "Dialog"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version: default_release_version(),
            url_template: default_url_template(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            release: default_release_path(),
            local: default_local_path(),
            output: default_output_path(),
            audit_report: default_audit_report(),
            verify_report: default_verify_report(),
            stats_report: default_stats_report(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            aliases: Vec::new(),
        }
    }
}

impl ReleaseConfig {
    /// Parsed release version; a leading `v` is accepted
    pub fn parsed_version(&self) -> Result<semver::Version> {
        let raw = self.version.strip_prefix('v').unwrap_or(&self.version);
        semver::Version::parse(raw)
            .map_err(|e| SchemaError::InvalidVersion(format!("{}: {}", self.version, e)))
    }

    /// Candidate artifact URLs in the order a fetcher should try them.
    ///
    /// Upstream tags are inconsistent about the `v` prefix, so both
    /// spellings are offered, bare version first.
    pub fn artifact_urls(&self) -> Result<Vec<String>> {
        let version = self.parsed_version()?;
        Ok(vec![
            self.url_template.replace("{version}", &version.to_string()),
            self.url_template.replace("{version}", &format!("v{}", version)),
        ])
    }
}

impl ForgeConfig {
    /// Per-user config file, e.g. `~/.config/schema-forge/schema-forge.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "schema-forge", "schema-forge")
            .map(|dirs| dirs.config_dir().join("schema-forge.toml"))
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-forge.toml",
            ".schema-forge.toml",
            "config/schema-forge.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(xdg_config) = Self::user_config_path() {
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Environment variables (FORGE__PATHS__OUTPUT=...)
        builder = builder.add_source(
            Environment::with_prefix("FORGE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ForgeConfig::default();
        assert_eq!(config.release.version, "6.13.0");
        assert_eq!(config.verify.targets, vec!["Button", "Form", "CRUD", "Dialog"]);
        assert_eq!(config.output.format, OutputFormat::Pretty);
        assert!(config.augment.defaults.is_empty());
    }

    #[test]
    fn test_serialize_config() {
        let config = ForgeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[release]"));
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[verify]"));
    }

    #[test]
    fn test_artifact_urls_offer_both_tag_spellings() {
        let release = ReleaseConfig {
            version: "v6.13.0".to_string(),
            ..Default::default()
        };
        let urls = release.artifact_urls().unwrap();
        assert_eq!(
            urls,
            vec![
                "https://github.com/baidu/amis/releases/download/6.13.0/schema.json",
                "https://github.com/baidu/amis/releases/download/v6.13.0/schema.json",
            ]
        );
    }

    #[test]
    fn test_invalid_version() {
        let release = ReleaseConfig {
            version: "six".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            release.parsed_version(),
            Err(SchemaError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_user_config_path_is_project_scoped() {
        // No home directory in some sandboxes
        if let Some(path) = ForgeConfig::user_config_path() {
            assert!(path.ends_with("schema-forge.toml"));
            let dir = path.parent().unwrap().to_string_lossy().to_lowercase();
            assert!(dir.contains("schema-forge"), "{}", dir);
            assert!(!dir.contains("familiar"), "{}", dir);
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forge.toml");
        std::fs::write(
            &path,
            r#"
[paths]
output = "out/extended.json"

[output]
format = "compact"

[[augment.defaults]]
definition = "Tpl"
property = "className"
value = "my-tpl-class"

[verify]
targets = ["Table"]

[[verify.aliases]]
name = "Page"
candidates = ["Page", "PageSchema"]
"#,
        )
        .unwrap();

        let config = ForgeConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.paths.output, PathBuf::from("out/extended.json"));
        assert_eq!(config.paths.release, PathBuf::from("release-schema.json"));
        assert_eq!(config.output.format, OutputFormat::Compact);
        assert_eq!(
            config.augment.defaults,
            vec![DefaultRule {
                definition: "Tpl".to_string(),
                property: "className".to_string(),
                value: serde_json::json!("my-tpl-class"),
            }]
        );
        assert_eq!(config.verify.targets, vec!["Table"]);
        assert_eq!(config.verify.aliases[0].name, "Page");
        assert_eq!(config.verify.aliases[0].candidates, vec!["Page", "PageSchema"]);
    }
}
