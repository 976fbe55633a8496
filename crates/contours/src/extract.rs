//! Contour extraction over a collection of notation files.
//!
//! Each file is split into phrases by a [`PhraseSource`], every phrase is
//! resampled into a contour, and the results are collected into a
//! [`ContourTable`]. A file contributes either all of its phrases or none.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use volpiano::{decode, Chant, DecodeOptions, Note};

use crate::error::{ContourError, Result, TableError};
use crate::interpolate::{PitchContour, SampleKind, DEFAULT_NUM_SAMPLES};
use crate::phrase::Phrase;
use crate::random_segments::random_segments;

/// Splits a notation file into phrases.
pub trait PhraseSource {
    fn phrases(&mut self, path: &Path) -> Result<Vec<Phrase>>;
}

fn read_chant(path: &Path, options: &DecodeOptions) -> Result<Chant> {
    let contents = fs::read_to_string(path).map_err(|e| ContourError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let decoded = decode(&contents, options).map_err(|e| ContourError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(decoded.into_value())
}

/// One phrase per notated section.
#[derive(Debug, Clone, Default)]
pub struct VolpianoPhrases {
    pub options: DecodeOptions,
}

impl PhraseSource for VolpianoPhrases {
    fn phrases(&mut self, path: &Path) -> Result<Vec<Phrase>> {
        let chant = read_chant(path, &self.options)?;
        Ok(chant.sections().iter().map(Phrase::from_section).collect())
    }
}

/// Random segments with Poisson-distributed lengths.
///
/// The generator is seeded once and shared by every file of a run.
#[derive(Debug, Clone)]
pub struct RandomPhrases {
    lambda: f64,
    rng: StdRng,
    options: DecodeOptions,
}

impl RandomPhrases {
    pub fn new(lambda: f64, seed: u64) -> Result<Self> {
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(ContourError::InvalidLambda(lambda));
        }
        Ok(RandomPhrases {
            lambda,
            rng: StdRng::seed_from_u64(seed),
            options: DecodeOptions::default(),
        })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl PhraseSource for RandomPhrases {
    fn phrases(&mut self, path: &Path) -> Result<Vec<Phrase>> {
        let chant = read_chant(path, &self.options)?;
        let notes: Vec<&Note> = chant.notes().collect();
        random_segments(&notes, self.lambda, &mut self.rng)
    }
}

/// Contour id template such as `liber-antiphons-{i:0>5}`.
///
/// The placeholder is `{i}` or `{i:0>N}` for zero padding to width `N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTemplate {
    prefix: String,
    suffix: String,
    width: usize,
}

impl IdTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = || ContourError::InvalidTemplate(template.to_string());

        let start = template.find("{i").ok_or_else(invalid)?;
        let len = template[start..].find('}').ok_or_else(invalid)?;
        let placeholder = &template[start + 2..start + len];

        let width = match placeholder {
            "" => 0,
            _ => placeholder
                .strip_prefix(":0>")
                .and_then(|w| w.parse().ok())
                .ok_or_else(invalid)?,
        };

        Ok(IdTemplate {
            prefix: template[..start].to_string(),
            suffix: template[start + len + 1..].to_string(),
            width,
        })
    }

    pub fn format(&self, i: usize) -> String {
        format!(
            "{}{:0>width$}{}",
            self.prefix,
            i,
            self.suffix,
            width = self.width
        )
    }
}

impl Default for IdTemplate {
    fn default() -> Self {
        IdTemplate {
            prefix: String::new(),
            suffix: String::new(),
            width: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub num_samples: usize,
    pub kind: SampleKind,
    pub id_template: IdTemplate,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            num_samples: DEFAULT_NUM_SAMPLES,
            kind: SampleKind::Integer,
            id_template: IdTemplate::default(),
        }
    }
}

impl ExtractOptions {
    pub fn with_template(mut self, template: IdTemplate) -> Self {
        self.id_template = template;
        self
    }

    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }
}

/// One extracted phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourRow {
    pub contour_id: String,
    pub song_id: String,
    pub phrase_num: usize,
    pub phrase_length: usize,
    pub phrase_duration: f64,
    pub contour: PitchContour,
}

/// Contour rows sharing a sample count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContourTable {
    pub num_samples: usize,
    pub rows: Vec<ContourRow>,
}

impl ContourTable {
    pub fn new(num_samples: usize, rows: Vec<ContourRow>) -> Self {
        ContourTable { num_samples, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn mean_phrase_length(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let total: usize = self.rows.iter().map(|r| r.phrase_length).sum();
        Some(total as f64 / self.rows.len() as f64)
    }

    pub fn contours(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.contour.to_f64()).collect()
    }

    fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = [
            "contour_id",
            "song_id",
            "phrase_num",
            "phrase_length",
            "phrase_duration",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        header.extend((0..self.num_samples).map(|i| i.to_string()));
        header
    }

    pub fn write_to<W: io::Write>(&self, writer: W) -> std::result::Result<(), TableError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.header())?;
        for row in &self.rows {
            let mut record = vec![
                row.contour_id.clone(),
                row.song_id.clone(),
                row.phrase_num.to_string(),
                row.phrase_length.to_string(),
                row.phrase_duration.to_string(),
            ];
            record.extend(row.contour.cells());
            writer.write_record(&record)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> std::result::Result<(), TableError> {
        let file = fs::File::create(path).map_err(|e| TableError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.write_to(file)
    }
}

/// Song id of a file: its name without extension.
pub fn song_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

struct Extracted {
    song_id: String,
    phrase_num: usize,
    phrase_length: usize,
    phrase_duration: f64,
    contour: PitchContour,
}

fn extract_file<S>(path: &Path, source: &mut S, options: &ExtractOptions) -> Result<Vec<Extracted>>
where
    S: PhraseSource + ?Sized,
{
    let song_id = song_id(path);
    source
        .phrases(path)?
        .iter()
        .enumerate()
        .map(|(i, phrase)| -> Result<Extracted> {
            Ok(Extracted {
                song_id: song_id.clone(),
                phrase_num: i,
                phrase_length: phrase.len(),
                phrase_duration: phrase.duration,
                contour: phrase.contour(options.num_samples, options.kind)?,
            })
        })
        .collect()
}

/// Extract contours of every phrase in every file.
///
/// Files that fail to decode, or that contain a phrase that cannot be
/// resampled, are logged and skipped. Contour ids are numbered from 1 over
/// the rows that were kept.
pub fn extract_phrase_contours<P, S>(
    paths: &[P],
    source: &mut S,
    options: &ExtractOptions,
) -> ContourTable
where
    P: AsRef<Path>,
    S: PhraseSource + ?Sized,
{
    let mut extracted = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match extract_file(path, source, options) {
            Ok(rows) => {
                let filename = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();
                info!("Extracted {:0>2} contours from {}", rows.len(), filename);
                extracted.extend(rows);
            }
            Err(e) => warn!("Skipping {}: {}", song_id(path), e),
        }
    }

    let rows = extracted
        .into_iter()
        .enumerate()
        .map(|(i, e)| ContourRow {
            contour_id: options.id_template.format(i + 1),
            song_id: e.song_id,
            phrase_num: e.phrase_num,
            phrase_length: e.phrase_length,
            phrase_duration: e.phrase_duration,
            contour: e.contour,
        })
        .collect();

    ContourTable::new(options.num_samples, rows)
}

/// Extract contours of random segments with mean length `lambda`.
pub fn extract_random_contours<P: AsRef<Path>>(
    paths: &[P],
    lambda: f64,
    seed: u64,
    options: &ExtractOptions,
) -> Result<ContourTable> {
    let mut source = RandomPhrases::new(lambda, seed)?;
    Ok(extract_phrase_contours(paths, &mut source, options))
}

/// Notation files in `dir` with the given extension, sorted by name.
pub fn notation_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let io_err = |e| ContourError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|e| e == extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
