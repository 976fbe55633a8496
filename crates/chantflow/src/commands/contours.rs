//! Phrase contour datasets of the Liber Usualis, one per genre.
//!
//! For every genre four tables are written to `<output>/phrase-contours/`:
//! phrase contours, random segment contours, and a sampled subset of each.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chantconf::ChantConfig;
use contours::{
    extract_phrase_contours, extract_random_contours, sample_subset, Checksum, ContourTable,
    ExtractOptions, IdTemplate, SubsetOptions, VolpianoPhrases,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::artifacts::write_artifact;
use crate::genres::{self, Genre};
use crate::telemetry::RunLog;

/// GregoBase source id of the Liber Usualis.
pub const LIBER_USUALIS: &str = "3";

const NOTATION_EXTENSION: &str = "volpiano";

#[derive(Debug, Deserialize)]
struct CorpusChant {
    id: String,
    #[serde(default)]
    office_part: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChantSource {
    chant_id: String,
    source: String,
}

/// Locations inside the GregoBase corpus directory.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
}

impl Corpus {
    pub fn new(dataset_dir: &Path) -> Self {
        Corpus {
            root: dataset_dir.join("gregobasecorpus"),
        }
    }

    fn csv_path(&self, name: &str) -> PathBuf {
        self.root.join("csv").join(name)
    }

    /// Notation file of a chant: ids are zero padded to five digits.
    pub fn notation_path(&self, id: &str) -> PathBuf {
        self.root
            .join(NOTATION_EXTENSION)
            .join(format!("{id:0>5}.{NOTATION_EXTENSION}"))
    }

    fn read_csv<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.csv_path(name);
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        reader
            .deserialize()
            .collect::<Result<Vec<T>, csv::Error>>()
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Notation files of the chants of `genre` in the Liber Usualis, sorted.
    pub fn liber_files(&self, genre: &Genre) -> Result<Vec<PathBuf>> {
        let chants: Vec<CorpusChant> = self.read_csv("chants.csv")?;
        let sources: Vec<ChantSource> = self.read_csv("chant_sources.csv")?;

        let liber: HashSet<&str> = sources
            .iter()
            .filter(|s| s.source == LIBER_USUALIS)
            .map(|s| s.chant_id.as_str())
            .collect();
        info!("Number of chants in the liber usualis: {}", liber.len());

        let right_genre: Vec<&CorpusChant> = chants
            .iter()
            .filter(|c| c.office_part.as_deref() == Some(genre.office_part))
            .collect();
        info!("Number of {}: {}", genre.name, right_genre.len());

        let mut files: Vec<PathBuf> = right_genre
            .iter()
            .filter(|c| liber.contains(c.id.as_str()))
            .map(|c| self.notation_path(&c.id))
            .collect();
        files.sort();
        files.dedup();
        info!("Number of {} in the Liber Usualis: {}", genre.name, files.len());
        Ok(files)
    }
}

/// Paths and checksums of one generated dataset.
#[derive(Debug, Clone, Default)]
pub struct DatasetReport {
    pub dataset_id: String,
    pub phrase_contours: usize,
    pub random_contours: usize,
    pub artifacts: Vec<(PathBuf, Checksum)>,
}

fn options(config: &ChantConfig, template: &str) -> Result<ExtractOptions> {
    Ok(ExtractOptions::default()
        .with_num_samples(config.extraction.num_samples)
        .with_template(IdTemplate::parse(template)?))
}

fn subset_options(config: &ChantConfig) -> SubsetOptions {
    SubsetOptions {
        min_phrase_length: config.extraction.min_phrase_length,
        num_contours: config.extraction.subset_size,
        seed: config.extraction.random_seed,
    }
}

fn store(
    report: &mut DatasetReport,
    table: &ContourTable,
    path: PathBuf,
    what: &str,
) -> Result<()> {
    let checksum = write_artifact(&path, what, |p| table.write_csv(p))?;
    report.artifacts.push((path, checksum));
    Ok(())
}

/// Extract contours from `files` and write the four tables of `dataset_id`.
pub fn generate_contour_data(
    config: &ChantConfig,
    dataset_id: &str,
    files: &[PathBuf],
    output_dir: &Path,
) -> Result<DatasetReport> {
    let mut report = DatasetReport {
        dataset_id: dataset_id.to_string(),
        ..Default::default()
    };
    let subset = subset_options(config);

    let phrase_options = options(config, &format!("{dataset_id}-{{i:0>5}}"))?;
    let phrases = extract_phrase_contours(files, &mut VolpianoPhrases::default(), &phrase_options);
    report.phrase_contours = phrases.len();
    store(
        &mut report,
        &phrases,
        output_dir.join(format!("{dataset_id}-phrase-contours.csv")),
        "phrase contours",
    )?;
    store(
        &mut report,
        &sample_subset(&phrases, &subset),
        output_dir.join(format!("{dataset_id}-phrase-contours-subset.csv")),
        "a subset of phrase contours",
    )?;

    let Some(lambda) = phrases.mean_phrase_length() else {
        warn!("No phrase contours extracted for {dataset_id}; skipping random contours");
        return Ok(report);
    };
    info!("Extracting random contours with mean length lamb={lambda:.2}...");
    let random_options = options(config, &format!("{dataset_id}-rand-{{i:0>5}}"))?;
    let random = extract_random_contours(
        files,
        lambda,
        config.extraction.random_seed,
        &random_options,
    )?;
    if let Some(mean) = random.mean_phrase_length() {
        info!("Mean length of random phrases: {mean:.2}...");
    }
    report.random_contours = random.len();
    store(
        &mut report,
        &random,
        output_dir.join(format!("{dataset_id}-random-contours.csv")),
        "random contours",
    )?;
    store(
        &mut report,
        &sample_subset(&random, &subset),
        output_dir.join(format!("{dataset_id}-random-contours-subset.csv")),
        "a subset of random contours",
    )?;

    Ok(report)
}

/// Generate the dataset of one genre, logging to `<dataset_id>.log`.
pub fn generate_genre(config: &ChantConfig, run_log: &RunLog, genre: &Genre) -> Result<DatasetReport> {
    let output_dir = config.paths.output_dir.join("phrase-contours");
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let dataset_id = genre.dataset_id();
    run_log.open(&output_dir.join(format!("{dataset_id}.log")))?;
    info!("Generating contour dataset: {dataset_id}");
    info!("Contours of {} from the Liber Usualis", genre.name);

    let report = generate_liber_dataset(config, genre, &dataset_id, &output_dir);
    run_log.close();
    report
}

fn generate_liber_dataset(
    config: &ChantConfig,
    genre: &Genre,
    dataset_id: &str,
    output_dir: &Path,
) -> Result<DatasetReport> {
    let corpus = Corpus::new(&config.paths.dataset_dir);
    let files = corpus.liber_files(genre)?;
    generate_contour_data(config, dataset_id, &files, output_dir)
}

/// `chantflow contours --genre <name|all>`
pub fn run(config: &ChantConfig, run_log: &RunLog, genre: &str) -> Result<Vec<DatasetReport>> {
    genres::select(genre)?
        .into_iter()
        .map(|g| generate_genre(config, run_log, g))
        .collect()
}
