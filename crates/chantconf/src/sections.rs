//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where datasets are read from and artifacts written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the input corpora.
    /// Default: ./datasets
    #[serde(default = "PathsConfig::default_dataset_dir")]
    pub dataset_dir: PathBuf,

    /// Root of the generated artifacts.
    /// Default: ./data
    #[serde(default = "PathsConfig::default_output_dir")]
    pub output_dir: PathBuf,
}

impl PathsConfig {
    fn default_dataset_dir() -> PathBuf {
        PathBuf::from("datasets")
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from("data")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dataset_dir: Self::default_dataset_dir(),
            output_dir: Self::default_output_dir(),
        }
    }
}

/// Contour extraction and subset sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Points per contour.
    /// Default: 50
    #[serde(default = "ExtractionConfig::default_num_samples")]
    pub num_samples: usize,

    /// Shortest phrase kept in a subset, in notes.
    /// Default: 4
    #[serde(default = "ExtractionConfig::default_min_phrase_length")]
    pub min_phrase_length: usize,

    /// Contours per subset.
    /// Default: 3000
    #[serde(default = "ExtractionConfig::default_subset_size")]
    pub subset_size: usize,

    /// Seed for random segmentation and sampling.
    /// Default: 0
    #[serde(default)]
    pub random_seed: u64,
}

impl ExtractionConfig {
    fn default_num_samples() -> usize {
        50
    }

    fn default_min_phrase_length() -> usize {
        4
    }

    fn default_subset_size() -> usize {
        3000
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            num_samples: Self::default_num_samples(),
            min_phrase_length: Self::default_min_phrase_length(),
            subset_size: Self::default_subset_size(),
            random_seed: 0,
        }
    }
}

/// Differentia/antiphon connection extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentiaeConfig {
    /// Default: 3
    #[serde(default = "DifferentiaeConfig::default_min_length")]
    pub min_length: usize,

    /// Default: 15
    #[serde(default = "DifferentiaeConfig::default_max_length")]
    pub max_length: usize,

    /// Reject chants whose text does not align with the melody.
    /// Default: false
    #[serde(default)]
    pub strict_alignment: bool,
}

impl DifferentiaeConfig {
    fn default_min_length() -> usize {
        3
    }

    fn default_max_length() -> usize {
        15
    }
}

impl Default for DifferentiaeConfig {
    fn default() -> Self {
        Self {
            min_length: Self::default_min_length(),
            max_length: Self::default_max_length(),
            strict_alignment: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive.
    /// Default: info
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}
