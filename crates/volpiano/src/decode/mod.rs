//! Decoding Volpiano into a [`Chant`].
//!
//! Input is either a bare Volpiano string or `volpiano/text`, the way the
//! Cantus database pairs a melody with its manuscript text. Bar lines close
//! sections; runs of one, two and three or more spaces close neumes,
//! syllables and words. Every note lasts one unit.

mod pitch;
mod token;

pub use pitch::{accidental_target, midi_pitch, staff_position};
pub use token::{tokenize, Token};

use thiserror::Error;

use crate::ast::{Alteration, Bar, Chant, Clef, Neume, Note, Section, Syllable, Word};
use crate::feedback::{Decoded, Feedback, FeedbackCollector};

/// Number of staff positions a flat or natural can apply to.
const STAFF_POSITIONS: usize = 20;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unknown character {character:?} at offset {offset}")]
    UnknownCharacter { character: char, offset: usize },

    #[error("chant contains no notes")]
    NoNotes,

    #[error("text has {text_words} words but the melody has {music_words}")]
    TextMisaligned { music_words: usize, text_words: usize },
}

/// Options for [`decode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail when the text cannot be aligned to the melody word by word,
    /// instead of dropping the text with a warning.
    pub strict_alignment: bool,
}

/// Decode a Volpiano string, optionally followed by `/` and its text.
pub fn decode(input: &str, options: &DecodeOptions) -> Result<Decoded<Chant>, DecodeError> {
    let (notation, text) = match input.split_once('/') {
        Some((notation, text)) => (notation.trim(), Some(text.trim())),
        None => (input.trim(), None),
    };

    let mut collector = FeedbackCollector::new();
    let mut builder = ChantBuilder::default();

    for (offset, token) in tokenize(notation)? {
        collector.set_offset(offset);
        match token {
            Token::Clef(c) => builder.clef(c, &mut collector),
            Token::Bar(c) => builder.close_section(Bar::from_char(c)),
            Token::Gap(1) => builder.close_neume(),
            Token::Gap(2) => builder.close_syllable(),
            Token::Gap(_) => builder.close_word(),
            Token::Note(c) => builder.note(c),
            Token::Flat(c) => builder.alter(c, Alteration::Flat),
            Token::Natural(c) => builder.alter(c, Alteration::Natural),
            Token::Other(c) => collector.info(format!("ignoring editorial sign {c:?}")),
        }
    }
    builder.close_section(None);

    let mut chant = builder.finish();
    if chant.note_count() == 0 {
        return Err(DecodeError::NoNotes);
    }

    if let Some(text) = text.filter(|t| !t.is_empty()) {
        align_text(&mut chant, text, options, &mut collector)?;
    }

    Ok(Decoded::new(chant, collector.into_feedback()))
}

/// Attach text words to melody words when the counts agree.
fn align_text(
    chant: &mut Chant,
    text: &str,
    options: &DecodeOptions,
    collector: &mut FeedbackCollector,
) -> Result<(), DecodeError> {
    let text_words: Vec<&str> = text.split_whitespace().collect();
    let music_words = chant.words().count();

    if text_words.len() != music_words {
        if options.strict_alignment {
            return Err(DecodeError::TextMisaligned {
                music_words,
                text_words: text_words.len(),
            });
        }
        collector.push(Feedback::warning(format!(
            "dropping text: {} text words for {} melody words",
            text_words.len(),
            music_words
        )));
        return Ok(());
    }

    let words = chant.sections.iter_mut().flat_map(|s| s.words.iter_mut());
    for (word, text) in words.zip(text_words) {
        word.text = Some(text.to_string());
    }
    Ok(())
}

/// Accumulates notes into neumes, syllables, words and sections.
///
/// Closing a level also closes every level below it; empty containers are
/// dropped rather than kept.
#[derive(Debug)]
struct ChantBuilder {
    clef: Option<Clef>,
    sections: Vec<Section>,
    words: Vec<Word>,
    syllables: Vec<Syllable>,
    neumes: Vec<Neume>,
    notes: Vec<Note>,
    alterations: [Option<Alteration>; STAFF_POSITIONS],
    onset: f64,
}

impl Default for ChantBuilder {
    fn default() -> Self {
        ChantBuilder {
            clef: None,
            sections: Vec::new(),
            words: Vec::new(),
            syllables: Vec::new(),
            neumes: Vec::new(),
            notes: Vec::new(),
            alterations: [None; STAFF_POSITIONS],
            onset: 0.0,
        }
    }
}

impl ChantBuilder {
    fn clef(&mut self, c: char, collector: &mut FeedbackCollector) {
        let Some(clef) = Clef::from_char(c) else {
            return;
        };
        if clef == Clef::F {
            collector.warning("F clef: pitches are read as if under a G clef");
        }
        if self.clef.is_none() {
            self.clef = Some(clef);
        }
    }

    fn note(&mut self, symbol: char) {
        let Some(position) = staff_position(symbol) else {
            return;
        };
        let alteration = self.alterations[position];
        self.notes.push(Note {
            symbol,
            liquescent: symbol.is_ascii_uppercase() || symbol == '(' || symbol == ')',
            alteration,
            midi: midi_pitch(position, alteration == Some(Alteration::Flat)),
            onset: self.onset,
            duration: 1.0,
        });
        self.onset += 1.0;
    }

    fn alter(&mut self, sign: char, alteration: Alteration) {
        if let Some(position) = accidental_target(sign) {
            self.alterations[position] = Some(alteration);
        }
    }

    fn close_neume(&mut self) {
        if !self.notes.is_empty() {
            let notes = std::mem::take(&mut self.notes);
            self.neumes.push(Neume { notes });
        }
    }

    fn close_syllable(&mut self) {
        self.close_neume();
        if !self.neumes.is_empty() {
            let neumes = std::mem::take(&mut self.neumes);
            self.syllables.push(Syllable { neumes });
        }
    }

    /// Accidentals hold until the end of the word.
    fn close_word(&mut self) {
        self.close_syllable();
        if !self.syllables.is_empty() {
            let syllables = std::mem::take(&mut self.syllables);
            self.words.push(Word {
                syllables,
                text: None,
            });
        }
        self.alterations = [None; STAFF_POSITIONS];
    }

    fn close_section(&mut self, bar: Option<Bar>) {
        self.close_word();
        if !self.words.is_empty() {
            let words = std::mem::take(&mut self.words);
            self.sections.push(Section { words, bar });
        }
    }

    fn finish(self) -> Chant {
        Chant {
            clef: self.clef,
            sections: self.sections,
        }
    }
}
