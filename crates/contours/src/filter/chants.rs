//! Row filters over chant tables.

use std::collections::HashSet;

use volpiano::{
    clean, is_pitched, is_well_formed, CharGroup, CleanOptions, ALTERNATE_CLEF, MISSING_PITCHES,
    PRIMARY_CLEF,
};

use super::{retain_where, ChantFilter};
use crate::table::{ChantRecord, ChantTable};

/// Declares an option-free filter that keeps rows matching a predicate.
macro_rules! predicate_filter {
    ($(#[$meta:meta])* $ty:ident, $name:literal, $description:literal, $keep:expr) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $ty;

        impl ChantFilter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn description(&self) -> &str {
                $description
            }

            fn select(&self, table: &ChantTable) -> Vec<usize> {
                let keep: fn(&ChantRecord) -> bool = $keep;
                retain_where(table, keep)
            }
        }
    };
}

predicate_filter!(
    WithoutVolpiano,
    "Filter Chants Without Volpiano",
    "Exclude all chants with an empty volpiano field",
    |r| r.notation().is_some()
);

predicate_filter!(
    /// Keeps chants with at least one note or liquescent.
    WithoutNotes,
    "Filter Chants Without Notes",
    "Exclude all chants without notes",
    |r| r.notation().is_some_and(|v| v.chars().any(is_pitched))
);

predicate_filter!(
    WithNonVolpianoChars,
    "Filter Chants With Nonvolpiano Chars",
    "Exclude all chants with non-volpiano characters",
    |r| r.notation().is_some_and(is_well_formed)
);

predicate_filter!(
    WithFClef,
    "Filter Chants With F Clef",
    "Exclude chants that contain an F clef",
    |r| r.notation().is_some_and(|v| !v.contains(ALTERNATE_CLEF))
);

predicate_filter!(
    NotStartingWithGClef,
    "Filter Chants Not Starting With G Clef",
    "Exclude chants that do not start with a G clef",
    |r| r.notation().is_some_and(|v| v.starts_with(PRIMARY_CLEF))
);

predicate_filter!(
    WithMissingPitches,
    "Filter Chants With Missing Pitches",
    "Filter chants with missing pitches: containing the substring 6------6",
    |r| r.notation().is_some_and(|v| !v.contains(MISSING_PITCHES))
);

predicate_filter!(
    WithoutFullText,
    "Filter Chants Without Full Text",
    "Filter chants without full text",
    |r| r.full_text.is_some()
);

predicate_filter!(
    /// Drops a row only when both fields are present and equal.
    IncipitIsFullText,
    "Filter Chants Where Incipit Is Full Text",
    "Filter chants whose incipit is identical to the full text",
    |r| match (&r.incipit, &r.full_text) {
        (Some(incipit), Some(full_text)) => incipit != full_text,
        _ => true,
    }
);

predicate_filter!(
    WithoutWordBoundary,
    "Filter Chants Without Word Boundary",
    "Only include chants with '---' in their volpiano",
    |r| r.notation().is_some_and(has_word_boundary)
);

/// Three consecutive space characters mark a word boundary.
fn has_word_boundary(volpiano: &str) -> bool {
    let mut run = 0;
    for c in volpiano.chars() {
        if CharGroup::Spaces.contains(c) {
            run += 1;
            if run == 3 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Keeps the first chant of every group with identical cleaned notes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DuplicatedNotes;

impl ChantFilter for DuplicatedNotes {
    fn name(&self) -> &str {
        "Filter Chants With Duplicated Notes"
    }

    fn description(&self) -> &str {
        "Filter duplicate chants: whose notes occur multiple times"
    }

    fn select(&self, table: &ChantTable) -> Vec<usize> {
        let options = CleanOptions::default();
        let mut seen = HashSet::new();
        retain_where(table, |r| match r.notation() {
            Some(v) => seen.insert(clean(v, &options)),
            None => false,
        })
    }
}

/// Keeps chants by genre id.
///
/// With a non-empty include list only those genres survive; otherwise every
/// genre not in the exclude list does.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ByGenre {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ByGenre {
    pub fn include<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ByGenre {
            include: genres.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn exclude<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ByGenre {
            include: Vec::new(),
            exclude: genres.into_iter().map(Into::into).collect(),
        }
    }

    fn keeps(&self, genre: &str) -> bool {
        if self.include.is_empty() {
            !self.exclude.iter().any(|g| g == genre)
        } else {
            self.include.iter().any(|g| g == genre)
        }
    }
}

fn list(values: &[String]) -> String {
    format!("[{}]", values.join(", "))
}

impl ChantFilter for ByGenre {
    fn name(&self) -> &str {
        "Filter Chants By Genre"
    }

    fn description(&self) -> &str {
        "Include only chants with a certain genre"
    }

    fn options(&self) -> Vec<(String, String)> {
        let mut options = Vec::new();
        if !self.include.is_empty() {
            options.push(("include".to_string(), list(&self.include)));
        }
        if !self.exclude.is_empty() {
            options.push(("exclude".to_string(), list(&self.exclude)));
        }
        options
    }

    fn select(&self, table: &ChantTable) -> Vec<usize> {
        retain_where(table, |r| r.genre_id.as_deref().is_some_and(|g| self.keeps(g)))
    }
}

/// Keeps chants in one of the eight modes, optionally transposed (`"3T"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithoutSimpleMode {
    pub include_transposed: bool,
}

impl Default for WithoutSimpleMode {
    fn default() -> Self {
        WithoutSimpleMode {
            include_transposed: true,
        }
    }
}

impl WithoutSimpleMode {
    pub fn untransposed() -> Self {
        WithoutSimpleMode {
            include_transposed: false,
        }
    }

    pub fn is_simple(&self, mode: &str) -> bool {
        let mut chars = mode.chars();
        let digit = matches!(chars.next(), Some('1'..='8'));
        match chars.as_str() {
            "" => digit,
            "T" => digit && self.include_transposed,
            _ => false,
        }
    }
}

impl ChantFilter for WithoutSimpleMode {
    fn name(&self) -> &str {
        "Filter Chants Without Simple Mode"
    }

    fn description(&self) -> &str {
        "Include only chants with simple modes: 1-8, not transposed"
    }

    fn options(&self) -> Vec<(String, String)> {
        if self.include_transposed {
            Vec::new()
        } else {
            vec![("include_transposed".to_string(), "false".to_string())]
        }
    }

    fn select(&self, table: &ChantTable) -> Vec<usize> {
        retain_where(table, |r| r.mode.as_deref().is_some_and(|m| self.is_simple(m)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply_filter, NullLogger};
    use pretty_assertions::assert_eq;

    fn with_volpiano(volpianos: &[&str]) -> ChantTable {
        let records = volpianos
            .iter()
            .enumerate()
            .map(|(i, v)| ChantRecord::new(format!("c{i}")).with_volpiano(*v))
            .collect();
        ChantTable::new(records).unwrap()
    }

    fn kept<F: ChantFilter>(filter: &F, table: &ChantTable) -> Vec<String> {
        let (filtered, _) = apply_filter(table, filter, &mut NullLogger);
        filtered.ids().map(str::to_string).collect()
    }

    #[test]
    fn test_without_notes() {
        let t = with_volpiano(&["1---3---4", "1---f", "1---F"]);
        assert_eq!(kept(&WithoutNotes, &t), vec!["c1", "c2"]);
    }

    #[test]
    fn test_non_volpiano_chars_is_idempotent() {
        let t = with_volpiano(&["1---f", "1---t", "1---f?", "1---[g]"]);
        let once = apply_filter(&t, &WithNonVolpianoChars, &mut NullLogger).0;
        let twice = apply_filter(&once, &WithNonVolpianoChars, &mut NullLogger).0;
        assert_eq!(once.ids().collect::<Vec<_>>(), vec!["c0", "c3"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clef_filters() {
        let t = with_volpiano(&["1---f", "2---f", "1---f--2--g", "f---g"]);
        assert_eq!(kept(&WithFClef, &t), vec!["c0", "c3"]);
        assert_eq!(kept(&NotStartingWithGClef, &t), vec!["c0", "c2"]);
    }

    #[test]
    fn test_missing_pitches() {
        let t = with_volpiano(&["1---f6------6g", "1---f-6-g"]);
        assert_eq!(kept(&WithMissingPitches, &t), vec!["c1"]);
    }

    #[test]
    fn test_word_boundary() {
        let t = with_volpiano(&["1--f--g", "1---f", "1-.,f"]);
        assert_eq!(kept(&WithoutWordBoundary, &t), vec!["c1", "c2"]);
    }

    #[test]
    fn test_duplicated_notes_keeps_first() {
        // Same notes once clefs and spaces are cleaned away
        let t = with_volpiano(&["1---fg-h-3", "1--fgh---4", "1---fgj"]);
        assert_eq!(kept(&DuplicatedNotes, &t), vec!["c0", "c2"]);
    }

    fn with_fields(rows: &[(Option<&str>, Option<&str>)]) -> ChantTable {
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, (a, b))| ChantRecord {
                id: format!("c{i}"),
                genre_id: a.map(str::to_string),
                mode: b.map(str::to_string),
                ..Default::default()
            })
            .collect();
        ChantTable::new(records).unwrap()
    }

    #[test]
    fn test_by_genre() {
        let t = with_fields(&[
            (Some("genre_a"), None),
            (Some("genre_r"), None),
            (None, None),
            (Some("genre_a"), None),
        ]);
        assert_eq!(kept(&ByGenre::include(["genre_a"]), &t), vec!["c0", "c3"]);
        assert_eq!(kept(&ByGenre::exclude(["genre_a"]), &t), vec!["c1"]);
        assert_eq!(kept(&ByGenre::default(), &t), vec!["c0", "c1", "c3"]);
    }

    #[test]
    fn test_by_genre_options() {
        assert_eq!(
            ByGenre::include(["genre_a", "genre_r"]).options(),
            vec![("include".to_string(), "[genre_a, genre_r]".to_string())]
        );
        assert!(ByGenre::default().options().is_empty());
    }

    #[test]
    fn test_simple_mode() {
        let t = with_fields(&[
            (None, Some("1")),
            (None, Some("8T")),
            (None, Some("9")),
            (None, Some("1?")),
            (None, None),
            (None, Some("4TT")),
        ]);
        assert_eq!(kept(&WithoutSimpleMode::default(), &t), vec!["c0", "c1"]);
        assert_eq!(kept(&WithoutSimpleMode::untransposed(), &t), vec!["c0"]);
        assert_eq!(
            WithoutSimpleMode::untransposed().options(),
            vec![("include_transposed".to_string(), "false".to_string())]
        );
    }

    #[test]
    fn test_full_text_filters() {
        let record = |id: &str, incipit: Option<&str>, full_text: Option<&str>| ChantRecord {
            id: id.to_string(),
            incipit: incipit.map(str::to_string),
            full_text: full_text.map(str::to_string),
            ..Default::default()
        };
        let t = ChantTable::new(vec![
            record("a", Some("Ave"), Some("Ave")),
            record("b", Some("Ave"), Some("Ave Maria")),
            record("c", Some("Ave"), None),
        ])
        .unwrap();

        assert_eq!(kept(&WithoutFullText, &t), vec!["a", "b"]);
        assert_eq!(kept(&IncipitIsFullText, &t), vec!["b", "c"]);
    }
}
