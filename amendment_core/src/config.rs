//! Analysis configuration, loadable from TOML.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use statute_graph::vocab;

use crate::error::{AnalysisError, Result};

/// Top-level configuration shared by all engines.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub graph: GraphConfig,
    pub recognizer: RecognizerConfig,
    pub impact: ImpactConfig,
    pub conflicts: ConflictConfig,
    pub temporal: TemporalConfig,
}

impl AnalysisConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| AnalysisError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

/// How amendment targets map onto graph identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Used when the library does not declare a base URI.
    pub base_uri: String,

    /// Prefix of document ids, e.g. `us-usc` gives `us-usc-title-15`.
    pub jurisdiction: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_uri: vocab::DEFAULT_BASE_URI.to_string(),
            jurisdiction: "us-usc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Maximum characters kept in an amendment description.
    pub description_limit: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            description_limit: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Default traversal depth when the caller does not pass one.
    pub max_depth: u32,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self { max_depth: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    /// Shared keywords needed before two obligations count as duplicates.
    pub duplicate_keyword_threshold: usize,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            duplicate_keyword_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// Maximum characters of matched text quoted in a finding.
    pub excerpt_limit: usize,
    pub related: RelatedSectionConfig,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            excerpt_limit: 100,
            related: RelatedSectionConfig::default(),
        }
    }
}

/// Heuristic for deciding whether an added section replaces a repealed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedSectionConfig {
    /// Treat `1234a` as related to `1234`.
    pub match_suffix_extension: bool,

    /// Minimum length for the shared-block rule (all but the last character
    /// equal). Zero disables the rule.
    pub block_min_len: usize,
}

impl Default for RelatedSectionConfig {
    fn default() -> Self {
        Self {
            match_suffix_extension: true,
            block_min_len: 3,
        }
    }
}
