//! Phrases: the unit a contour is computed over.

use volpiano::{Note, Section};

use crate::error::Result;
use crate::interpolate::{interpolate, MelodyEvent, PitchContour, SampleKind};

/// A stretch of melody with its total duration, rests included.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Phrase {
    pub events: Vec<MelodyEvent>,
    pub duration: f64,
}

impl Phrase {
    pub fn new(events: Vec<MelodyEvent>, duration: f64) -> Self {
        Phrase { events, duration }
    }

    /// A phrase over consecutive decoded notes, rebased to start at zero.
    pub fn from_notes<'a, I>(notes: I) -> Self
    where
        I: IntoIterator<Item = &'a Note>,
    {
        let notes: Vec<&Note> = notes.into_iter().collect();
        let Some(start) = notes.first().map(|n| n.onset) else {
            return Phrase::default();
        };

        let events: Vec<MelodyEvent> = notes
            .iter()
            .map(|n| MelodyEvent::new(n.onset - start, f64::from(n.midi)).with_duration(n.duration))
            .collect();
        let end = notes
            .iter()
            .map(|n| n.onset + n.duration)
            .fold(start, f64::max);

        Phrase {
            events,
            duration: end - start,
        }
    }

    pub fn from_section(section: &Section) -> Self {
        Self::from_notes(section.notes())
    }

    /// Number of notes.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pitches(&self) -> impl Iterator<Item = f64> + '_ {
        self.events.iter().map(|e| e.pitch)
    }

    pub fn contour(&self, num_samples: usize, kind: SampleKind) -> Result<PitchContour> {
        interpolate(&self.events, self.duration, num_samples, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use volpiano::{decode, DecodeOptions};

    #[test]
    fn test_from_section_rebases_onsets() {
        let chant = decode("1---fg-3-hgf-4", &DecodeOptions::default())
            .unwrap()
            .value;
        let phrase = Phrase::from_section(&chant.sections()[1]);

        let onsets: Vec<f64> = phrase.events.iter().map(|e| e.onset).collect();
        assert_eq!(onsets, vec![0.0, 1.0, 2.0]);
        assert_eq!(phrase.duration, 3.0);
        assert_eq!(phrase.pitches().collect::<Vec<_>>(), vec![69.0, 67.0, 65.0]);
    }

    #[test]
    fn test_contour_of_section() {
        let chant = decode("1---fgh-3", &DecodeOptions::default())
            .unwrap()
            .value;
        let phrase = Phrase::from_section(&chant.sections()[0]);
        assert_eq!(
            phrase.contour(4, SampleKind::Integer).unwrap(),
            PitchContour::Integer(vec![65, 67, 69, 69])
        );
    }

    #[test]
    fn test_empty_phrase() {
        let phrase = Phrase::from_notes(std::iter::empty());
        assert!(phrase.is_empty());
        assert_eq!(phrase.duration, 0.0);
    }
}
