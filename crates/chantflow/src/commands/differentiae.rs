//! The differentia/antiphon connection table of the Cantus corpus.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chantconf::ChantConfig;
use contours::{
    antiphon_filters, extract_connections, write_connections_csv, Checksum, ChantTable,
    ConnectionOptions, ConnectionStats, TracingLogger,
};
use tracing::info;

use crate::artifacts::write_artifact;
use crate::telemetry::RunLog;

/// Columns the antiphon filters read.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "volpiano",
    "full_text",
    "incipit",
    "full_text_manuscript",
    "genre_id",
    "mode",
];

/// Default chant table inside the dataset directory.
pub fn default_chants_path(dataset_dir: &Path) -> PathBuf {
    dataset_dir.join("cantuscorpus").join("csv").join("chant.csv")
}

#[derive(Debug, Clone)]
pub struct DifferentiaeReport {
    pub antiphons: usize,
    pub stats: ConnectionStats,
    pub path: PathBuf,
    pub checksum: Checksum,
}

fn connection_options(config: &ChantConfig) -> ConnectionOptions {
    ConnectionOptions {
        min_length: config.differentiae.min_length,
        max_length: config.differentiae.max_length,
        strict_alignment: config.differentiae.strict_alignment,
    }
}

/// `chantflow differentiae [--chants <csv>]`
pub fn run(config: &ChantConfig, run_log: &RunLog, chants: Option<&Path>) -> Result<DifferentiaeReport> {
    let output_dir = config.paths.output_dir.join("differentiae");
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    run_log.open(&output_dir.join("generation.log"))?;
    info!("Start generating the differentia-antiphon connections.");

    let report = generate(config, chants, &output_dir);
    run_log.close();
    report
}

fn generate(config: &ChantConfig, chants: Option<&Path>, output_dir: &Path) -> Result<DifferentiaeReport> {
    let chants_path = chants
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_chants_path(&config.paths.dataset_dir));
    let table = ChantTable::from_csv_path(&chants_path, REQUIRED_COLUMNS)
        .with_context(|| format!("Failed to load chants from {}", chants_path.display()))?;
    info!("Loaded {} chants from {}", table.len(), chants_path.display());

    let (antiphons, _reports) = antiphon_filters().run(&table, &mut TracingLogger::with_prefix(" . "));

    let options = connection_options(config);
    let (rows, stats) = extract_connections(&antiphons, &options);
    info!(
        "Extracted {} connections from {} antiphons ({} could not be parsed, {} short differentiae, {} short openings)",
        stats.extracted,
        stats.considered,
        stats.decode_failures,
        stats.short_differentiae,
        stats.short_incipits
    );

    let path = output_dir.join("connections.csv");
    let checksum = write_artifact(&path, "connections", |p| {
        write_connections_csv(&rows, options.max_length, p)
    })?;

    Ok(DifferentiaeReport {
        antiphons: antiphons.len(),
        stats,
        path,
        checksum,
    })
}
