//! Run configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. Command-line flags are applied on top by the binary.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Generation the snapshot is restricted to when nothing else is configured.
pub const DEFAULT_GENERATION: u8 = 7;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("generation must be a single digit from 1 to 9, got {0}")]
    InvalidGeneration(u8),

    #[error("export name '{0}' is not a valid identifier")]
    InvalidExportName(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Full learnset database (JSON).
    pub database: PathBuf,
    /// Species metadata (RON).
    pub species: PathBuf,
    /// Previously generated snapshot.
    pub prior: PathBuf,
    /// Where the new snapshot is written. Defaults to `prior`.
    pub output: Option<PathBuf>,
    pub generation: u8,
    /// Name of the exported mapping literal.
    pub export_name: String,
    /// Ids that are expected to have no species metadata.
    pub special_species: Vec<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("data/learnsets.json"),
            species: PathBuf::from("data/species.ron"),
            prior: PathBuf::from("data/mods/gen7/learnsets.js"),
            output: None,
            generation: DEFAULT_GENERATION,
            export_name: "Learnsets".to_string(),
            special_species: vec!["missingno".to_string()],
        }
    }
}

impl SnapshotConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=9).contains(&self.generation) {
            return Err(ConfigError::InvalidGeneration(self.generation));
        }
        if !is_identifier(&self.export_name) {
            return Err(ConfigError::InvalidExportName(self.export_name.clone()));
        }
        Ok(())
    }

    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.prior)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SnapshotConfig::parse("()").unwrap();
        assert_eq!(config, SnapshotConfig::default());
        assert_eq!(config.output_path(), Path::new("data/mods/gen7/learnsets.js"));
    }

    #[test]
    fn test_partial_config_overrides_fields() {
        let config = SnapshotConfig::parse(
            r#"(
                generation: 6,
                prior: "data/mods/gen6/learnsets.js",
                output: Some("out/learnsets.js"),
                export_name: "LearnsetsG6",
            )"#,
        )
        .unwrap();
        assert_eq!(config.generation, 6);
        assert_eq!(config.output_path(), Path::new("out/learnsets.js"));
        assert_eq!(config.export_name, "LearnsetsG6");
        assert_eq!(config.database, PathBuf::from("data/learnsets.json"));
    }

    #[test]
    fn test_rejects_out_of_range_generation() {
        assert!(matches!(
            SnapshotConfig::parse("(generation: 10)"),
            Err(ConfigError::InvalidGeneration(10))
        ));
        assert!(matches!(
            SnapshotConfig::parse("(generation: 0)"),
            Err(ConfigError::InvalidGeneration(0))
        ));
    }

    #[test]
    fn test_rejects_bad_export_name() {
        assert!(matches!(
            SnapshotConfig::parse(r#"(export_name: "1st")"#),
            Err(ConfigError::InvalidExportName(_))
        ));
    }

    #[test]
    fn test_rejects_unparseable_config() {
        assert!(matches!(
            SnapshotConfig::parse("(generation: \"seven\")"),
            Err(ConfigError::Ron(_))
        ));
    }
}
