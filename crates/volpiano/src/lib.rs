//! Volpiano chant notation: alphabet, cleaning and decoding.
//!
//! Volpiano encodes a chant melody as a string of characters, one per note,
//! clef, accidental, bar line or space. This crate classifies those
//! characters, strips strings down to their notes, and decodes them into a
//! hierarchical [`Chant`] with timed MIDI pitches.
//!
//! # Example
//!
//! ```
//! use volpiano::{clean, decode, CleanOptions, DecodeOptions};
//!
//! let volpiano = "1---fg---h--ij-h-3-f-4";
//! assert_eq!(clean(volpiano, &CleanOptions::default()), "fghijhf");
//!
//! let chant = decode(volpiano, &DecodeOptions::default()).unwrap().value;
//! assert_eq!(chant.sections().len(), 2);
//! ```

pub mod alphabet;
pub mod ast;
pub mod clean;
pub mod decode;
pub mod feedback;

pub use alphabet::{
    characters_for, is_pitched, is_well_formed, CharGroup, ALTERNATE_CLEF, MISSING_PITCHES,
    PRIMARY_CLEF,
};
pub use ast::*;
pub use clean::{clean, default_allowed_chars, CleanOptions};
pub use decode::{decode, DecodeError, DecodeOptions};
pub use feedback::{Decoded, Feedback, FeedbackLevel};
