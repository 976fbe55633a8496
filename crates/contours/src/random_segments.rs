//! Random segmentation: a baseline against which real phrases are compared.
//!
//! The notes of a chant are cut into consecutive segments whose lengths are
//! drawn from a Poisson distribution, ignoring the notated phrase structure.

use rand::Rng;
use volpiano::Note;

use crate::error::{ContourError, Result};
use crate::phrase::Phrase;

/// Draw from Poisson(lambda) by Knuth's multiplication method.
pub fn poisson<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u64 {
    let limit = (-lambda).exp();
    let mut k = 0;
    let mut p = 1.0;
    loop {
        p *= rng.gen::<f64>();
        if p <= limit {
            return k;
        }
        k += 1;
    }
}

/// Cut `notes` into random segments with mean length close to `lambda`.
///
/// Segment lengths are Poisson draws clamped to at least one note; the final
/// segment takes whatever remains. Onsets are rebased per segment.
pub fn random_segments<R: Rng + ?Sized>(
    notes: &[&Note],
    lambda: f64,
    rng: &mut R,
) -> Result<Vec<Phrase>> {
    if !lambda.is_finite() || lambda <= 0.0 {
        return Err(ContourError::InvalidLambda(lambda));
    }

    let mut segments = Vec::new();
    let mut rest = notes;
    while !rest.is_empty() {
        let length = (poisson(lambda, rng).max(1) as usize).min(rest.len());
        let (segment, tail) = rest.split_at(length);
        segments.push(Phrase::from_notes(segment.iter().copied()));
        rest = tail;
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use volpiano::{decode, DecodeOptions};

    fn notes(volpiano: &str) -> Vec<Note> {
        decode(volpiano, &DecodeOptions::default())
            .unwrap()
            .value
            .notes()
            .cloned()
            .collect()
    }

    #[test]
    fn test_segments_cover_all_notes() {
        let notes = notes("1---fghgfedcdefghgfg-3-hjkjhgfg-4");
        let refs: Vec<&Note> = notes.iter().collect();
        let mut rng = StdRng::seed_from_u64(0);

        let segments = random_segments(&refs, 3.0, &mut rng).unwrap();
        assert!(segments.iter().all(|s| !s.is_empty()));
        assert_eq!(segments.iter().map(Phrase::len).sum::<usize>(), notes.len());
        assert!(segments.iter().all(|s| s.events[0].onset == 0.0));
    }

    #[test]
    fn test_same_seed_same_segments() {
        let notes = notes("1---fghgfedcdefghgfg");
        let refs: Vec<&Note> = notes.iter().collect();
        let lengths = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            random_segments(&refs, 4.0, &mut rng)
                .unwrap()
                .iter()
                .map(Phrase::len)
                .collect::<Vec<_>>()
        };
        assert_eq!(lengths(7), lengths(7));
    }

    #[test]
    fn test_poisson_mean() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = 5000;
        let mean = (0..n).map(|_| poisson(6.0, &mut rng) as f64).sum::<f64>() / n as f64;
        assert!((mean - 6.0).abs() < 0.3, "mean was {mean}");
    }

    #[test]
    fn test_invalid_lambda() {
        let mut rng = StdRng::seed_from_u64(0);
        for lambda in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                random_segments(&[], lambda, &mut rng),
                Err(ContourError::InvalidLambda(_))
            ));
        }
    }
}
