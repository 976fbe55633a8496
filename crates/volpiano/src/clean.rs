//! Cleaning Volpiano strings down to notes and accidentals.

use crate::alphabet::{characters_for, CharGroup};

/// Options for [`clean`].
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOptions {
    /// Characters to keep. `None` keeps liquescents, notes, flats and naturals.
    pub allowed_chars: Option<String>,
    /// Replace runs of spaces by boundary markers.
    pub keep_boundaries: bool,
    pub neume_boundary: String,
    pub syllable_boundary: String,
    pub word_boundary: String,
    /// Replace allowed bar lines by the bar marker.
    pub keep_bars: bool,
    pub allowed_bars: String,
    pub bar: String,
}

impl Default for CleanOptions {
    fn default() -> Self {
        CleanOptions {
            allowed_chars: None,
            keep_boundaries: false,
            neume_boundary: " ".to_string(),
            syllable_boundary: " ".to_string(),
            word_boundary: " ".to_string(),
            keep_bars: false,
            allowed_bars: "345".to_string(),
            bar: "|".to_string(),
        }
    }
}

impl CleanOptions {
    pub fn with_boundaries(mut self) -> Self {
        self.keep_boundaries = true;
        self
    }

    pub fn with_markers(
        mut self,
        neume: impl Into<String>,
        syllable: impl Into<String>,
        word: impl Into<String>,
    ) -> Self {
        self.neume_boundary = neume.into();
        self.syllable_boundary = syllable.into();
        self.word_boundary = word.into();
        self
    }

    pub fn with_bars(mut self) -> Self {
        self.keep_bars = true;
        self
    }

    pub fn with_allowed_chars(mut self, chars: impl Into<String>) -> Self {
        self.allowed_chars = Some(chars.into());
        self
    }

    fn boundary(&self, spaces: u8) -> &str {
        match spaces {
            1 => &self.neume_boundary,
            2 => &self.syllable_boundary,
            _ => &self.word_boundary,
        }
    }
}

/// The characters `clean` keeps when no explicit set is given.
pub fn default_allowed_chars() -> String {
    characters_for(&[
        CharGroup::Liquescents,
        CharGroup::Notes,
        CharGroup::Flats,
        CharGroup::Naturals,
    ])
}

/// Keep only the allowed characters of a Volpiano string, optionally
/// replacing neume, syllable and word boundaries and bar lines by markers.
///
/// ```
/// use volpiano::{clean, CleanOptions};
///
/// let volpiano = "1---fg---h--ij-h-3-f-4";
/// assert_eq!(clean(volpiano, &CleanOptions::default()), "fghijhf");
/// assert_eq!(clean(volpiano, &CleanOptions::default().with_bars()), "fghijh|f|");
/// ```
pub fn clean(volpiano: &str, options: &CleanOptions) -> String {
    let allowed = match &options.allowed_chars {
        Some(chars) if !chars.is_empty() => chars.clone(),
        _ => default_allowed_chars(),
    };
    let is_allowed = |c: char| {
        allowed.contains(c) && !(options.keep_boundaries && CharGroup::Spaces.contains(c))
    };

    let mut output = String::with_capacity(volpiano.len());
    let mut spaces: u8 = 0;
    for c in volpiano.chars() {
        if is_allowed(c) {
            if spaces > 0 {
                output.push_str(options.boundary(spaces));
                spaces = 0;
            }
            output.push(c);
        } else if options.keep_boundaries && CharGroup::Spaces.contains(c) {
            spaces += 1;
            if spaces == 3 {
                output.push_str(&options.word_boundary);
                spaces = 0;
            }
        } else if options.keep_bars
            && CharGroup::Bars.contains(c)
            && options.allowed_bars.contains(c)
        {
            output.push_str(&options.bar);
        }
    }

    if spaces > 0 {
        output.push_str(options.boundary(spaces));
    }

    output
}
