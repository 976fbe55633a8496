//! Decoded chant structure.
//!
//! A chant is a list of sections separated by bar lines. Sections hold
//! words, words hold syllables, syllables hold neumes, neumes hold notes.
//! Every note carries its onset and duration in units of one note, counted
//! from the start of the chant.

use serde::{Deserialize, Serialize};

/// A decoded chant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chant {
    pub clef: Option<Clef>,
    pub sections: Vec<Section>,
}

impl Chant {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The opening section. For antiphons this is the incipit.
    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    /// The closing section. For antiphons followed by a psalm tone
    /// termination this is the differentia.
    pub fn last_section(&self) -> Option<&Section> {
        self.sections.last()
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.sections.iter().flat_map(Section::notes)
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.sections.iter().flat_map(|s| s.words.iter())
    }

    pub fn note_count(&self) -> usize {
        self.notes().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clef {
    /// `1`
    G,
    /// `2`
    F,
}

impl Clef {
    pub fn from_char(c: char) -> Option<Clef> {
        match c {
            '1' => Some(Clef::G),
            '2' => Some(Clef::F),
            _ => None,
        }
    }
}

/// Bar line closing a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bar {
    /// `3`
    Single,
    /// `4`
    Double,
    /// `5`
    Thick,
    /// `6`
    Long,
    /// `7`
    Short,
}

impl Bar {
    pub fn from_char(c: char) -> Option<Bar> {
        match c {
            '3' => Some(Bar::Single),
            '4' => Some(Bar::Double),
            '5' => Some(Bar::Thick),
            '6' => Some(Bar::Long),
            '7' => Some(Bar::Short),
            _ => None,
        }
    }
}

/// The stretch of melody between two bar lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    pub words: Vec<Word>,
    /// The bar line that closed the section, `None` for a trailing section.
    pub bar: Option<Bar>,
}

impl Section {
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.words
            .iter()
            .flat_map(|w| w.syllables.iter())
            .flat_map(|s| s.neumes.iter())
            .flat_map(|n| n.notes.iter())
    }

    pub fn note_count(&self) -> usize {
        self.notes().count()
    }

    /// Onset of the first note.
    pub fn onset(&self) -> Option<f64> {
        self.notes().next().map(|n| n.onset)
    }

    /// Time from the first onset to the end of the last note.
    pub fn duration(&self) -> f64 {
        match (self.onset(), self.notes().last()) {
            (Some(start), Some(last)) => last.onset + last.duration - start,
            _ => 0.0,
        }
    }

    /// MIDI pitches in order.
    pub fn midi_pitches(&self) -> Vec<u8> {
        self.notes().map(|n| n.midi).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Word {
    pub syllables: Vec<Syllable>,
    /// The text of the word, when text was supplied and aligned.
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Syllable {
    pub neumes: Vec<Neume>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Neume {
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alteration {
    Flat,
    Natural,
}

/// A single sounding note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// The Volpiano character that encoded the note.
    pub symbol: char,
    pub liquescent: bool,
    /// Accidental in force for this note, if any.
    pub alteration: Option<Alteration>,
    /// MIDI pitch number (middle C = 60).
    pub midi: u8,
    pub onset: f64,
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(midi: u8, onset: f64) -> Note {
        Note {
            symbol: 'f',
            liquescent: false,
            alteration: None,
            midi,
            onset,
            duration: 1.0,
        }
    }

    fn section(notes: Vec<Note>) -> Section {
        Section {
            words: vec![Word {
                syllables: vec![Syllable {
                    neumes: vec![Neume { notes }],
                }],
                text: None,
            }],
            bar: Some(Bar::Single),
        }
    }

    #[test]
    fn test_section_duration_spans_notes() {
        let s = section(vec![note(65, 4.0), note(67, 5.0), note(69, 6.0)]);
        assert_eq!(s.onset(), Some(4.0));
        assert_eq!(s.duration(), 3.0);
        assert_eq!(s.midi_pitches(), vec![65, 67, 69]);
    }

    #[test]
    fn test_empty_section_has_no_duration() {
        let s = Section::default();
        assert_eq!(s.onset(), None);
        assert_eq!(s.duration(), 0.0);
    }

    #[test]
    fn test_first_and_last_sections() {
        let chant = Chant {
            clef: Some(Clef::G),
            sections: vec![section(vec![note(65, 0.0)]), section(vec![note(60, 1.0)])],
        };
        assert_eq!(chant.first_section().unwrap().midi_pitches(), vec![65]);
        assert_eq!(chant.last_section().unwrap().midi_pitches(), vec![60]);
        assert_eq!(chant.note_count(), 2);
    }
}
