//! Error types for filtering and extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning notation into contours.
#[derive(Debug, Error)]
pub enum ContourError {
    /// The phrase has no sounding notes. Kept apart from decoder failures
    /// so callers can tell "nothing to interpolate" from a broken file.
    #[error("phrase has no notes to interpolate")]
    EmptyPhrase,

    #[error("number of samples must be at least 1")]
    InvalidSampleCount,

    #[error("phrase duration {duration} ends before its last onset {last_onset}")]
    InvalidDuration { duration: f64, last_onset: f64 },

    #[error("expected segment length must be positive, got {0}")]
    InvalidLambda(f64),

    #[error("invalid contour id template {0:?}: expected a {{i}} or {{i:0>N}} placeholder")]
    InvalidTemplate(String),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: volpiano::DecodeError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors raised while loading or writing tables. These are configuration
/// problems and abort the run.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("duplicate chant id `{0}`")]
    DuplicateId(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ContourError>;
