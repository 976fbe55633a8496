//! Layered configuration for chantflow.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/chantflow/config.toml` (system)
//! 2. `~/.config/chantflow/config.toml` (user)
//! 3. `./chantflow.toml`, or the path given with `--config`
//! 4. Environment variables (`CHANTFLOW_*`)
//!
//! A file only overrides the keys it sets.
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! dataset_dir = "~/corpora"
//! output_dir = "data"
//!
//! [extraction]
//! num_samples = 50
//! min_phrase_length = 4
//! subset_size = 3000
//! random_seed = 0
//!
//! [differentiae]
//! min_length = 3
//! max_length = 15
//! strict_alignment = false
//!
//! [logging]
//! level = "info"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{DifferentiaeConfig, ExtractionConfig, LoggingConfig, PathsConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key} in {path}: {message}")]
    Invalid {
        path: PathBuf,
        key: String,
        message: String,
    },
}

/// Complete chantflow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChantConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub differentiae: DifferentiaeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ChantConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with `config_path` in place of `./chantflow.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report which files and variables were used.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = ChantConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::load_from_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# chantflow configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!(
            "dataset_dir = \"{}\"\n",
            self.paths.dataset_dir.display()
        ));
        output.push_str(&format!(
            "output_dir = \"{}\"\n",
            self.paths.output_dir.display()
        ));

        output.push_str("\n[extraction]\n");
        output.push_str(&format!("num_samples = {}\n", self.extraction.num_samples));
        output.push_str(&format!(
            "min_phrase_length = {}\n",
            self.extraction.min_phrase_length
        ));
        output.push_str(&format!("subset_size = {}\n", self.extraction.subset_size));
        output.push_str(&format!("random_seed = {}\n", self.extraction.random_seed));

        output.push_str("\n[differentiae]\n");
        output.push_str(&format!("min_length = {}\n", self.differentiae.min_length));
        output.push_str(&format!("max_length = {}\n", self.differentiae.max_length));
        output.push_str(&format!(
            "strict_alignment = {}\n",
            self.differentiae.strict_alignment
        ));

        output.push_str("\n[logging]\n");
        output.push_str(&format!("level = \"{}\"\n", self.logging.level));

        output
    }
}
