//! Subsets of contour tables for analysis.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::extract::{ContourRow, ContourTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsetOptions {
    /// Shorter phrases are dropped.
    pub min_phrase_length: usize,
    /// Size of the sample, when enough contours remain.
    pub num_contours: usize,
    pub seed: u64,
}

impl Default for SubsetOptions {
    fn default() -> Self {
        SubsetOptions {
            min_phrase_length: 4,
            num_contours: 3000,
            seed: 0,
        }
    }
}

/// Deduplicate, drop short phrases and sample a fixed number of contours.
///
/// Rows whose samples repeat an earlier row are removed. If fewer than
/// `num_contours` rows remain after length filtering they are all kept.
/// The result is sorted by contour id.
pub fn sample_subset(table: &ContourTable, options: &SubsetOptions) -> ContourTable {
    info!("Sampling a subset of contours");

    let mut seen = HashSet::new();
    let unique: Vec<&ContourRow> = table
        .rows
        .iter()
        .filter(|row| seen.insert(row.contour.cells()))
        .collect();
    info!(
        ">  Removed {} duplicates; {} contours left.",
        table.len() - unique.len(),
        unique.len()
    );

    let long_enough: Vec<&ContourRow> = unique
        .into_iter()
        .filter(|row| row.phrase_length >= options.min_phrase_length)
        .collect();
    info!(
        ">  Found {} contours of length >= {}",
        long_enough.len(),
        options.min_phrase_length
    );

    let mut rows: Vec<ContourRow> = if long_enough.len() >= options.num_contours {
        info!(
            ">  Sampling {} phrases (seed={}).",
            options.num_contours, options.seed
        );
        let mut rng = StdRng::seed_from_u64(options.seed);
        long_enough
            .choose_multiple(&mut rng, options.num_contours)
            .map(|row| (*row).clone())
            .collect()
    } else {
        info!(
            ">  Fewer than {} contours remain; returning {} contours.",
            options.num_contours,
            long_enough.len()
        );
        long_enough.into_iter().cloned().collect()
    };

    rows.sort_by(|a, b| a.contour_id.cmp(&b.contour_id));
    ContourTable::new(table.num_samples, rows)
}
