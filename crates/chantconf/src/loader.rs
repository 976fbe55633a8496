//! Config file discovery, loading, and environment variable overlay.

use crate::{ChantConfig, ConfigError};
use std::env;
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override config values.
pub const ENV_PREFIX: &str = "CHANTFLOW_";

/// Information about where config values came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided it replaces the local override, and is returned
/// even when missing so that loading it reports the error.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/chantflow/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("chantflow/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("chantflow.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file and layer its values over `config`.
pub fn load_from_file(config: &mut ChantConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

/// Reads typed values out of one TOML section.
struct Section<'a> {
    name: &'static str,
    table: Option<&'a toml::Table>,
    path: &'a Path,
}

impl<'a> Section<'a> {
    fn new(root: &'a toml::Table, name: &'static str, path: &'a Path) -> Self {
        Section {
            name,
            table: root.get(name).and_then(|v| v.as_table()),
            path,
        }
    }

    fn invalid(&self, key: &str, expected: &str) -> ConfigError {
        ConfigError::Invalid {
            path: self.path.to_path_buf(),
            key: format!("{}.{}", self.name, key),
            message: format!("expected {expected}"),
        }
    }

    fn get(&self, key: &str) -> Option<&'a toml::Value> {
        self.table.and_then(|t| t.get(key))
    }

    fn str(&self, key: &str) -> Result<Option<&'a str>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v.as_str().map(Some).ok_or_else(|| self.invalid(key, "a string")),
        }
    }

    fn count(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_integer()
                .and_then(|i| usize::try_from(i).ok())
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a non-negative integer")),
        }
    }

    fn seed(&self, key: &str) -> Result<Option<u64>, ConfigError> {
        Ok(self.count(key)?.map(|n| n as u64))
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or_else(|| self.invalid(key, "a boolean")),
        }
    }
}

/// Parse a TOML document and layer the keys it sets over `config`.
///
/// Keys a file leaves out keep the value of earlier layers.
pub fn apply_toml(config: &mut ChantConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let paths = Section::new(&table, "paths", path);
    if let Some(v) = paths.str("dataset_dir")? {
        config.paths.dataset_dir = expand_path(v);
    }
    if let Some(v) = paths.str("output_dir")? {
        config.paths.output_dir = expand_path(v);
    }

    let extraction = Section::new(&table, "extraction", path);
    if let Some(v) = extraction.count("num_samples")? {
        config.extraction.num_samples = v;
    }
    if let Some(v) = extraction.count("min_phrase_length")? {
        config.extraction.min_phrase_length = v;
    }
    if let Some(v) = extraction.count("subset_size")? {
        config.extraction.subset_size = v;
    }
    if let Some(v) = extraction.seed("random_seed")? {
        config.extraction.random_seed = v;
    }

    let differentiae = Section::new(&table, "differentiae", path);
    if let Some(v) = differentiae.count("min_length")? {
        config.differentiae.min_length = v;
    }
    if let Some(v) = differentiae.count("max_length")? {
        config.differentiae.max_length = v;
    }
    if let Some(v) = differentiae.flag("strict_alignment")? {
        config.differentiae.strict_alignment = v;
    }

    let logging = Section::new(&table, "logging", path);
    if let Some(v) = logging.str("level")? {
        config.logging.level = v.to_string();
    }

    Ok(())
}

/// Apply `CHANTFLOW_*` environment variable overrides to config.
pub fn apply_env_overrides(config: &mut ChantConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, env::vars());
}

/// Apply overrides from `(name, value)` pairs.
///
/// Unknown names and unparseable values are ignored.
pub fn apply_overrides_from<I>(config: &mut ChantConfig, sources: &mut ConfigSources, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let applied = match name {
            "DATASET_DIR" => {
                config.paths.dataset_dir = expand_path(&value);
                true
            }
            "OUTPUT_DIR" => {
                config.paths.output_dir = expand_path(&value);
                true
            }
            "NUM_SAMPLES" => set_parsed(&mut config.extraction.num_samples, &value),
            "MIN_PHRASE_LENGTH" => set_parsed(&mut config.extraction.min_phrase_length, &value),
            "SUBSET_SIZE" => set_parsed(&mut config.extraction.subset_size, &value),
            "RANDOM_SEED" => set_parsed(&mut config.extraction.random_seed, &value),
            "MIN_LENGTH" => set_parsed(&mut config.differentiae.min_length, &value),
            "MAX_LENGTH" => set_parsed(&mut config.differentiae.max_length, &value),
            "STRICT_ALIGNMENT" => set_parsed(&mut config.differentiae.strict_alignment, &value),
            "LOG_LEVEL" => {
                config.logging.level = value;
                true
            }
            _ => false,
        };
        if applied {
            sources.env_overrides.push(key);
        }
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.parse() {
        Ok(v) => {
            *slot = v;
            true
        }
        Err(_) => false,
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // $VAR/rest/of/path
        let (var_name, rest) = match stripped.find('/') {
            Some(slash_pos) => (&stripped[..slash_pos], Some(&stripped[slash_pos + 1..])),
            None => (stripped, None),
        };
        if let Ok(var_value) = env::var(var_name) {
            let base = PathBuf::from(var_value);
            return match rest {
                Some(rest) => base.join(rest),
                None => base,
            };
        }
    }
    PathBuf::from(path)
}
