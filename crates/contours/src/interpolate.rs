//! Resampling melodies into fixed-length pitch contours.
//!
//! A melody is treated as a step function of time: each note's pitch holds
//! until the next onset, so rests extend the note before them. The function
//! is sampled at equally spaced points from the first onset to the end of
//! the phrase.

use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};

/// Default number of points per contour.
pub const DEFAULT_NUM_SAMPLES: usize = 50;

/// A sounding note: onset and duration in beats, pitch in MIDI numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MelodyEvent {
    pub onset: f64,
    pub pitch: f64,
    pub duration: Option<f64>,
}

impl MelodyEvent {
    pub fn new(onset: f64, pitch: f64) -> Self {
        MelodyEvent {
            onset,
            pitch,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// How sampled pitches are represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// Truncated toward zero.
    #[default]
    Integer,
    Real,
}

/// A fixed-length pitch trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PitchContour {
    Integer(Vec<i64>),
    Real(Vec<f64>),
}

impl PitchContour {
    pub fn len(&self) -> usize {
        match self {
            PitchContour::Integer(v) => v.len(),
            PitchContour::Real(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The samples as floats, whatever the representation.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            PitchContour::Integer(v) => v.iter().map(|&p| p as f64).collect(),
            PitchContour::Real(v) => v.clone(),
        }
    }

    /// Each sample formatted for a CSV cell.
    pub fn cells(&self) -> Vec<String> {
        match self {
            PitchContour::Integer(v) => v.iter().map(i64::to_string).collect(),
            PitchContour::Real(v) => v.iter().map(f64::to_string).collect(),
        }
    }
}

/// Sample `events` at `num_samples` equally spaced points.
///
/// A phrase that starts after time zero is shifted so that its first onset
/// is zero; `total_duration` shrinks by the same amount. The last sample is
/// taken exactly at the end of the phrase and reads the final pitch.
pub fn interpolate(
    events: &[MelodyEvent],
    total_duration: f64,
    num_samples: usize,
    kind: SampleKind,
) -> Result<PitchContour> {
    let (first, last) = match (events.first(), events.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(ContourError::EmptyPhrase),
    };
    if num_samples == 0 {
        return Err(ContourError::InvalidSampleCount);
    }

    let shift = if first.onset > 0.0 { first.onset } else { 0.0 };
    let duration = total_duration - shift;
    if duration < last.onset - shift {
        return Err(ContourError::InvalidDuration {
            duration,
            last_onset: last.onset - shift,
        });
    }

    let mut onsets: Vec<f64> = events.iter().map(|e| e.onset - shift).collect();
    let mut pitches: Vec<f64> = events.iter().map(|e| e.pitch).collect();
    onsets.push(duration);
    pitches.push(last.pitch);

    let pitch_at = |t: f64| -> f64 {
        // Right-continuous: a sample on an onset reads the new pitch
        let idx = onsets.partition_point(|&o| o <= t);
        pitches[idx.saturating_sub(1)]
    };

    let samples: Vec<f64> = if num_samples == 1 {
        vec![pitch_at(0.0)]
    } else {
        let step = duration / (num_samples - 1) as f64;
        (0..num_samples)
            .map(|i| {
                let t = if i == num_samples - 1 {
                    duration
                } else {
                    i as f64 * step
                };
                pitch_at(t)
            })
            .collect()
    };

    Ok(match kind {
        SampleKind::Integer => PitchContour::Integer(samples.iter().map(|&p| p as i64).collect()),
        SampleKind::Real => PitchContour::Real(samples),
    })
}

/// Subtract each contour's mean from its samples.
pub fn normalized_contours<C: AsRef<[f64]>>(contours: &[C]) -> Vec<Vec<f64>> {
    contours
        .iter()
        .map(|contour| {
            let values = contour.as_ref();
            if values.is_empty() {
                return Vec::new();
            }
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            values.iter().map(|v| v - mean).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Build events from `(pitch, duration)` pairs; `None` is a rest.
    fn melody(notes: &[(Option<f64>, f64)]) -> (Vec<MelodyEvent>, f64) {
        let mut events = Vec::new();
        let mut t = 0.0;
        for &(pitch, duration) in notes {
            if let Some(pitch) = pitch {
                events.push(MelodyEvent::new(t, pitch).with_duration(duration));
            }
            t += duration;
        }
        (events, t)
    }

    fn integers(contour: PitchContour) -> Vec<i64> {
        match contour {
            PitchContour::Integer(v) => v,
            PitchContour::Real(_) => panic!("expected integer samples"),
        }
    }

    const C: f64 = 48.0;
    const D: f64 = 50.0;
    const E: f64 = 52.0;
    const F: f64 = 53.0;
    const G: f64 = 55.0;

    #[test]
    fn test_pitches() {
        let (events, total) = melody(&[(Some(C), 1.0), (Some(D), 1.0), (Some(E), 1.0), (Some(F), 1.0)]);
        let ys = interpolate(&events, total, 4, SampleKind::Integer).unwrap();
        assert_eq!(integers(ys), vec![48, 50, 52, 53]);
    }

    #[test]
    fn test_durations() {
        // Twelve sixteenths: dotted quarter, eighth, two sixteenths, eighth
        let (events, total) = melody(&[
            (Some(C), 1.5),
            (Some(D), 0.5),
            (Some(E), 0.25),
            (Some(F), 0.25),
            (Some(G), 0.5),
        ]);
        let ys = interpolate(&events, total, 12, SampleKind::Integer).unwrap();
        assert_eq!(
            integers(ys),
            vec![48, 48, 48, 48, 48, 48, 50, 50, 52, 53, 55, 55]
        );
    }

    #[test]
    fn test_rests_hold_previous_pitch() {
        let (events, total) = melody(&[
            (Some(C), 1.0),
            (None, 1.0),
            (Some(D), 1.0),
            (None, 1.0),
            (None, 1.0),
        ]);
        let ys = interpolate(&events, total, 5, SampleKind::Integer).unwrap();
        assert_eq!(integers(ys), vec![48, 48, 50, 50, 50]);
    }

    #[test]
    fn test_leading_rest_is_discarded() {
        let (events, total) = melody(&[(None, 1.0), (Some(C), 1.0), (Some(D), 0.5), (None, 0.5)]);
        let ys = interpolate(&events, total, 4, SampleKind::Integer).unwrap();
        assert_eq!(integers(ys), vec![48, 48, 50, 50]);
    }

    #[test]
    fn test_num_samples() {
        let (events, total) = melody(&[(Some(C), 1.0), (Some(D), 1.0), (Some(E), 1.0), (Some(F), 1.0)]);
        for n in (10..100).step_by(10) {
            assert_eq!(interpolate(&events, total, n, SampleKind::Integer).unwrap().len(), n);
        }
        let single = interpolate(&events, total, 1, SampleKind::Integer).unwrap();
        assert_eq!(integers(single), vec![48]);
    }

    #[test]
    fn test_real_samples_keep_microtones() {
        let events = [MelodyEvent::new(0.0, 60.5), MelodyEvent::new(1.0, 61.75)];
        let ys = interpolate(&events, 2.0, 3, SampleKind::Real).unwrap();
        assert_eq!(ys, PitchContour::Real(vec![60.5, 61.75, 61.75]));

        let truncated = interpolate(&events, 2.0, 3, SampleKind::Integer).unwrap();
        assert_eq!(truncated, PitchContour::Integer(vec![60, 61, 61]));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            interpolate(&[], 4.0, 10, SampleKind::Integer),
            Err(ContourError::EmptyPhrase)
        ));

        let events = [MelodyEvent::new(0.0, 60.0), MelodyEvent::new(3.0, 62.0)];
        assert!(matches!(
            interpolate(&events, 4.0, 0, SampleKind::Integer),
            Err(ContourError::InvalidSampleCount)
        ));
        assert!(matches!(
            interpolate(&events, 2.0, 10, SampleKind::Integer),
            Err(ContourError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_normalized_contours() {
        let rows = vec![vec![60.0, 62.0, 64.0], vec![50.0, 50.0, 50.0]];
        assert_eq!(
            normalized_contours(&rows),
            vec![vec![-2.0, 0.0, 2.0], vec![0.0, 0.0, 0.0]]
        );
    }
}
