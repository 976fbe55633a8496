//! The Volpiano alphabet.
//!
//! Every accepted character belongs to exactly one [`CharGroup`]. All
//! character classes used elsewhere (cleaning, filtering, decoding) are
//! derived from this table rather than spelled out again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The primary (G) clef.
pub const PRIMARY_CLEF: char = '1';

/// The alternate (F) clef.
pub const ALTERNATE_CLEF: char = '2';

/// Long bar flanked by gaps: marks pitches missing from the source.
pub const MISSING_PITCHES: &str = "6------6";

/// Named groups of Volpiano characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharGroup {
    Bars,
    Clefs,
    Liquescents,
    Naturals,
    Notes,
    Flats,
    Spaces,
    Others,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown character group: {0}")]
pub struct UnknownGroup(pub String);

impl CharGroup {
    /// All groups in canonical order.
    pub const ALL: [CharGroup; 8] = [
        CharGroup::Bars,
        CharGroup::Clefs,
        CharGroup::Liquescents,
        CharGroup::Naturals,
        CharGroup::Notes,
        CharGroup::Flats,
        CharGroup::Spaces,
        CharGroup::Others,
    ];

    /// Characters of this group in canonical order.
    pub fn chars(self) -> &'static str {
        match self {
            CharGroup::Bars => "34567",
            CharGroup::Clefs => "12",
            CharGroup::Liquescents => "()ABCDEFGHJKLMNOPQRS",
            CharGroup::Naturals => "IWXYZ",
            CharGroup::Notes => "89abcdefghjklmnopqrs",
            CharGroup::Flats => "iwxyz",
            CharGroup::Spaces => ".,-",
            CharGroup::Others => "[]{¶",
        }
    }

    pub fn contains(self, c: char) -> bool {
        self.chars().contains(c)
    }

    /// The group a character belongs to, if it is part of the alphabet.
    pub fn of(c: char) -> Option<CharGroup> {
        Self::ALL.into_iter().find(|group| group.contains(c))
    }

    pub fn name(self) -> &'static str {
        match self {
            CharGroup::Bars => "bars",
            CharGroup::Clefs => "clefs",
            CharGroup::Liquescents => "liquescents",
            CharGroup::Naturals => "naturals",
            CharGroup::Notes => "notes",
            CharGroup::Flats => "flats",
            CharGroup::Spaces => "spaces",
            CharGroup::Others => "others",
        }
    }
}

impl fmt::Display for CharGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharGroup {
    type Err = UnknownGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.name() == s)
            .ok_or_else(|| UnknownGroup(s.to_string()))
    }
}

/// Concatenate the characters of the requested groups.
///
/// Groups appear in the order they were requested; a group requested again
/// is skipped. An empty request returns the whole alphabet in canonical
/// order.
pub fn characters_for(groups: &[CharGroup]) -> String {
    if groups.is_empty() {
        return CharGroup::ALL.into_iter().map(CharGroup::chars).collect();
    }
    let mut seen = Vec::with_capacity(groups.len());
    groups
        .iter()
        .copied()
        .filter(|group| {
            if seen.contains(group) {
                return false;
            }
            seen.push(*group);
            true
        })
        .map(CharGroup::chars)
        .collect()
}

/// True for notes and liquescents: characters that sound a pitch.
pub fn is_pitched(c: char) -> bool {
    CharGroup::Notes.contains(c) || CharGroup::Liquescents.contains(c)
}

/// True if every character of the string belongs to the alphabet.
pub fn is_well_formed(volpiano: &str) -> bool {
    volpiano.chars().all(|c| CharGroup::of(c).is_some())
}
