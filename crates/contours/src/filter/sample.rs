//! Stratified sampling: one chant per melody family and mode.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::ChantFilter;
use crate::table::ChantTable;

/// Samples one chant for every `(cantus_id, mode)` pair.
///
/// Families are visited in order of first appearance, and modes in order of
/// first appearance within their family. The k-th draw uses a generator
/// seeded with `seed + k`, so the result depends only on the seed and the
/// table order. Rows without a cantus id or mode are never selected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedSample {
    pub seed: u64,
}

impl StratifiedSample {
    pub fn new(seed: u64) -> Self {
        StratifiedSample { seed }
    }
}

/// Groups keyed by string, kept in order of first appearance.
fn group_in_order<'a, I>(items: I) -> Vec<(&'a str, Vec<usize>)>
where
    I: IntoIterator<Item = (&'a str, usize)>,
{
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (key, index) in items {
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(index),
            None => groups.push((key, vec![index])),
        }
    }
    groups
}

impl ChantFilter for StratifiedSample {
    fn name(&self) -> &str {
        "Sample One Chant Per Mode And Cantus Id"
    }

    fn description(&self) -> &str {
        "For every cantus_id, sample one chant of each mode."
    }

    fn options(&self) -> Vec<(String, String)> {
        if self.seed == 0 {
            Vec::new()
        } else {
            vec![("seed".to_string(), self.seed.to_string())]
        }
    }

    fn select(&self, table: &ChantTable) -> Vec<usize> {
        let families = group_in_order(
            table
                .iter()
                .enumerate()
                .filter(|(_, r)| r.mode.is_some())
                .filter_map(|(i, r)| Some((r.cantus_id.as_deref()?, i))),
        );

        let mut seed = self.seed;
        let mut selected = Vec::new();
        for (_, members) in families {
            let modes = group_in_order(members.into_iter().filter_map(|i| {
                let mode = table.get(i)?.mode.as_deref()?;
                Some((mode, i))
            }));

            for (_, candidates) in modes {
                let mut rng = StdRng::seed_from_u64(seed);
                if let Some(&chosen) = candidates.choose(&mut rng) {
                    selected.push(chosen);
                }
                seed = seed.wrapping_add(1);
            }
        }
        selected
    }
}
