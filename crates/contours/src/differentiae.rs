//! Connections between antiphons and the differentiae that follow them.
//!
//! In the Cantus data an antiphon's Volpiano is followed by the
//! differentia of its psalm tone, set to the syllables E u o u a e. The
//! closing section of such a chant is the differentia; the opening section
//! is the start of the antiphon.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use volpiano::{decode, DecodeOptions, Section};

use crate::error::TableError;
use crate::filter::{
    retain_where, ByGenre, ChantFilter, FilterPipeline, IncipitIsFullText, NotStartingWithGClef,
    WithFClef, WithNonVolpianoChars, WithoutFullText, WithoutNotes, WithoutSimpleMode,
    WithoutVolpiano, WithoutWordBoundary,
};
use crate::table::{ChantRecord, ChantTable};

fn euouae() -> &'static Regex {
    static EUOUAE: OnceLock<Regex> = OnceLock::new();
    EUOUAE.get_or_init(|| Regex::new(r"(?i)S?e ?u ?o ?u ?a ?e$").expect("valid EUOUAE pattern"))
}

/// Keeps chants whose manuscript text ends on a spelling of EUOUAE.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotEndingOnEuouae;

impl ChantFilter for NotEndingOnEuouae {
    fn name(&self) -> &str {
        "Filter Chants Not Ending On Euouae"
    }

    fn description(&self) -> &str {
        "Exclude all chants that don't end on variants of EUOUAE"
    }

    fn select(&self, table: &ChantTable) -> Vec<usize> {
        retain_where(table, |r| {
            r.full_text_manuscript
                .as_deref()
                .is_some_and(|text| euouae().is_match(text))
        })
    }
}

/// Antiphons with a notated differentia and clean G-clef Volpiano.
pub fn antiphon_filters() -> FilterPipeline {
    FilterPipeline::new()
        .with(WithoutVolpiano)
        .with(WithoutNotes)
        .with(WithoutSimpleMode::untransposed())
        .with(WithoutFullText)
        .with(IncipitIsFullText)
        .with(ByGenre::include(["genre_a"]))
        .with(NotEndingOnEuouae)
        .with(NotStartingWithGClef)
        .with(WithFClef)
        .with(WithNonVolpianoChars)
        .with(WithoutWordBoundary)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Rows where either side has fewer notes are dropped.
    pub min_length: usize,
    /// Notes kept on each side.
    pub max_length: usize,
    pub strict_alignment: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            min_length: 3,
            max_length: 15,
            strict_alignment: false,
        }
    }
}

/// A differentia and the antiphon opening it leads into.
///
/// `differentia` is aligned to the right and `incipit` to the left, both
/// padded with `None` to `max_length`, so the antiphon always starts at the
/// same column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub id: String,
    pub mode: Option<String>,
    pub siglum: Option<String>,
    pub differentia: Vec<Option<u8>>,
    pub incipit: Vec<Option<u8>>,
}

/// Attrition of the extraction step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    pub considered: usize,
    pub decode_failures: usize,
    pub short_differentiae: usize,
    pub short_incipits: usize,
    pub extracted: usize,
}

fn last_notes(section: Option<&Section>, count: usize) -> Vec<u8> {
    let pitches = section.map(Section::midi_pitches).unwrap_or_default();
    let skip = pitches.len().saturating_sub(count);
    pitches[skip..].to_vec()
}

fn first_notes(section: Option<&Section>, count: usize) -> Vec<u8> {
    section
        .map(|s| s.notes().take(count).map(|n| n.midi).collect())
        .unwrap_or_default()
}

fn connection(
    record: &ChantRecord,
    options: &ConnectionOptions,
    stats: &mut ConnectionStats,
) -> Option<ConnectionRow> {
    let input = format!(
        "{}/{}",
        record.volpiano.as_deref().unwrap_or_default(),
        record.full_text_manuscript.as_deref().unwrap_or_default()
    );
    let decode_options = DecodeOptions {
        strict_alignment: options.strict_alignment,
    };
    let chant = match decode(&input, &decode_options) {
        Ok(decoded) => decoded.into_value(),
        Err(e) => {
            error!("{} could not be parsed: {}", record.id, e);
            stats.decode_failures += 1;
            return None;
        }
    };

    let max = options.max_length;
    let differentia = last_notes(chant.last_section(), max);
    if differentia.len() < options.min_length {
        warn!(
            "Skipping {}; differentia has length {}, which is shorter than min_length={}",
            record.id,
            differentia.len(),
            options.min_length
        );
        stats.short_differentiae += 1;
        return None;
    }

    let incipit = first_notes(chant.first_section(), max);
    if incipit.len() < options.min_length {
        warn!(
            "Skipping {}; antiphon opening has length {}, which is shorter than min_length={}",
            record.id,
            incipit.len(),
            options.min_length
        );
        stats.short_incipits += 1;
        return None;
    }

    let mut padded_differentia = vec![None; max - differentia.len()];
    padded_differentia.extend(differentia.into_iter().map(Some));

    let mut padded_incipit: Vec<Option<u8>> = incipit.into_iter().map(Some).collect();
    padded_incipit.resize(max, None);

    Some(ConnectionRow {
        id: record.id.clone(),
        mode: record.mode.clone(),
        siglum: record.siglum.clone(),
        differentia: padded_differentia,
        incipit: padded_incipit,
    })
}

/// Natural ordering: digit runs compare by value, so `a2 < a10`.
fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    fn chunks(s: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut start = 0;
        let mut prev: Option<bool> = None;
        for (i, c) in s.char_indices() {
            let digit = c.is_ascii_digit();
            if prev.is_some_and(|p| p != digit) {
                out.push(&s[start..i]);
                start = i;
            }
            prev = Some(digit);
        }
        if start < s.len() {
            out.push(&s[start..]);
        }
        out
    }

    let is_number = |chunk: &str| chunk.starts_with(|c: char| c.is_ascii_digit());
    let (xs, ys) = (chunks(a), chunks(b));
    for (x, y) in xs.iter().copied().zip(ys.iter().copied()) {
        let ord = if is_number(x) && is_number(y) {
            let (tx, ty) = (x.trim_start_matches('0'), y.trim_start_matches('0'));
            tx.len().cmp(&ty.len()).then_with(|| tx.cmp(ty))
        } else {
            x.cmp(y)
        };
        if ord.is_ne() {
            return ord;
        }
    }
    xs.len().cmp(&ys.len()).then_with(|| a.cmp(b))
}

/// Extract one connection per antiphon, sorted by id.
///
/// Antiphons that fail to decode or have too short a differentia or opening
/// are logged and left out.
pub fn extract_connections(
    antiphons: &ChantTable,
    options: &ConnectionOptions,
) -> (Vec<ConnectionRow>, ConnectionStats) {
    let mut stats = ConnectionStats {
        considered: antiphons.len(),
        ..Default::default()
    };
    let mut rows: Vec<ConnectionRow> = antiphons
        .iter()
        .filter_map(|record| connection(record, options, &mut stats))
        .collect();
    rows.sort_by(|a, b| natural_cmp(&a.id, &b.id));
    stats.extracted = rows.len();
    (rows, stats)
}

fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

/// Write connections with columns `id, mode, siglum, -max..-1, 0..max-1`.
/// Missing notes are empty cells.
pub fn write_connections<W: io::Write>(
    rows: &[ConnectionRow],
    max_length: usize,
    writer: W,
) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["id".to_string(), "mode".to_string(), "siglum".to_string()];
    header.extend((1..=max_length).rev().map(|i| format!("-{i}")));
    header.extend((0..max_length).map(|i| i.to_string()));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.id.clone(), cell(&row.mode), cell(&row.siglum)];
        record.extend(row.differentia.iter().map(cell));
        record.extend(row.incipit.iter().map(cell));
        writer.write_record(&record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_connections_csv(
    rows: &[ConnectionRow],
    max_length: usize,
    path: &Path,
) -> Result<(), TableError> {
    let file = fs::File::create(path).map_err(|e| TableError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_connections(rows, max_length, file)
}
