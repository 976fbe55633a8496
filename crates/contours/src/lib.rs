//! Filtering chant corpora and extracting melodic contours.
//!
//! The pieces fit together as a batch pipeline:
//!
//! 1. load a [`ChantTable`] from CSV,
//! 2. winnow it with logged [`filter`]s,
//! 3. split notation into [`Phrase`]s and resample each into a fixed-length
//!    [`PitchContour`] ([`extract`], [`interpolate`]),
//! 4. sample an analysis subset ([`dataset`]) and write CSV artifacts with
//!    their [`Checksum`]s.
//!
//! [`differentiae`] pairs antiphon openings with the psalm tone endings
//! that precede them.

pub mod checksum;
pub mod dataset;
pub mod differentiae;
pub mod error;
pub mod extract;
pub mod filter;
pub mod interpolate;
pub mod phrase;
pub mod random_segments;
pub mod table;

pub use checksum::Checksum;
pub use dataset::{sample_subset, SubsetOptions};
pub use differentiae::{
    antiphon_filters, extract_connections, write_connections_csv, ConnectionOptions,
    ConnectionRow, ConnectionStats, NotEndingOnEuouae,
};
pub use error::{ContourError, Result, TableError};
pub use extract::{
    extract_phrase_contours, extract_random_contours, notation_files, ContourRow, ContourTable,
    ExtractOptions, IdTemplate, PhraseSource, RandomPhrases, VolpianoPhrases,
};
pub use filter::{
    apply_filter, ChantFilter, FilterLogger, FilterPipeline, FilterReport, MemoryLogger,
    NullLogger, TracingLogger,
};
pub use interpolate::{interpolate, normalized_contours, MelodyEvent, PitchContour, SampleKind};
pub use phrase::Phrase;
pub use random_segments::random_segments;
pub use table::{ChantRecord, ChantTable, REQUIRED_COLUMNS};
