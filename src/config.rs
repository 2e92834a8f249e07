//! Scan configuration.
//!
//! Loaded from a YAML file; every field has a default, so an absent file
//! means a plain scan with the `logging` marker and no tracked identifiers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{CoverageAnalyzer, LOGGING_MARKER};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["pyforensics.yaml", ".pyforensics.yaml"];

/// Errors found while validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("logging_marker must not be empty")]
    EmptyMarker,
    #[error("tracked_identifiers contains an empty entry")]
    EmptyIdentifier,
    #[error("invalid excluded_paths pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForensicsConfig {
    /// Substring identifying logging imports and calls.
    #[serde(default = "default_marker")]
    pub logging_marker: String,
    /// Whether `from <module> import ...` counts as import evidence.
    #[serde(default)]
    pub count_from_imports: bool,
    /// Identifiers checked for logging coverage in every file.
    #[serde(default)]
    pub tracked_identifiers: Vec<String>,
    /// Glob patterns for paths to skip (e.g. "**/migrations/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn default_marker() -> String {
    LOGGING_MARKER.to_string()
}

impl Default for ForensicsConfig {
    fn default() -> Self {
        Self {
            logging_marker: default_marker(),
            count_from_imports: false,
            tracked_identifiers: Vec::new(),
            excluded_paths: Vec::new(),
        }
    }
}

impl ForensicsConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load an explicit config, else a discovered one in `dir`, else defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        let config = match explicit {
            Some(path) => Self::parse_file(path)?,
            None => match discover(dir) {
                Some(path) => Self::parse_file(path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging_marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        if self.tracked_identifiers.iter().any(|id| id.is_empty()) {
            return Err(ConfigError::EmptyIdentifier);
        }
        self.exclusion_matcher()?;
        Ok(())
    }

    /// Compile `excluded_paths` into one matcher.
    pub fn exclusion_matcher(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: self.excluded_paths.join(", "),
            source,
        })
    }

    /// Coverage analyzer configured with this marker and import policy.
    pub fn coverage_analyzer(&self) -> CoverageAnalyzer {
        CoverageAnalyzer::new(self.logging_marker.clone()).count_from_imports(self.count_from_imports)
    }

    /// Add identifiers given on the command line, skipping duplicates.
    pub fn track<I: IntoIterator<Item = String>>(&mut self, identifiers: I) {
        for id in identifiers {
            if !self.tracked_identifiers.contains(&id) {
                self.tracked_identifiers.push(id);
            }
        }
    }
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
logging_marker: logger
count_from_imports: true
tracked_identifiers:
  - model
  - features
excluded_paths:
  - "**/migrations/**"
"#;
        let config: ForensicsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.logging_marker, "logger");
        assert!(config.count_from_imports);
        assert_eq!(config.tracked_identifiers, vec!["model", "features"]);
        assert!(config.validate().is_ok());

        let matcher = config.exclusion_matcher().unwrap();
        assert!(matcher.is_match("app/migrations/0001_initial.py"));
        assert!(!matcher.is_match("app/models.py"));
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let config: ForensicsConfig = serde_yaml::from_str("tracked_identifiers: [x]\n").unwrap();
        assert_eq!(config.logging_marker, LOGGING_MARKER);
        assert!(!config.count_from_imports);
        assert!(config.excluded_paths.is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let config = ForensicsConfig {
            logging_marker: String::new(),
            ..ForensicsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyMarker)));

        let config = ForensicsConfig {
            excluded_paths: vec!["[unclosed".to_string()],
            ..ForensicsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGlob { .. })));

        let config = ForensicsConfig {
            tracked_identifiers: vec![String::new()],
            ..ForensicsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyIdentifier)));
    }

    #[test]
    fn test_load_discovers_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("pyforensics.yaml"),
            "tracked_identifiers: [dataset]\n",
        )
        .unwrap();

        let config = ForensicsConfig::load(None, temp.path()).unwrap();
        assert_eq!(config.tracked_identifiers, vec!["dataset"]);
    }

    #[test]
    fn test_load_without_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ForensicsConfig::load(None, temp.path()).unwrap();
        assert_eq!(config.logging_marker, LOGGING_MARKER);
    }

    #[test]
    fn test_track_skips_duplicates() {
        let mut config = ForensicsConfig::default();
        config.track(vec!["x".to_string(), "y".to_string(), "x".to_string()]);
        assert_eq!(config.tracked_identifiers, vec!["x", "y"]);
    }
}
