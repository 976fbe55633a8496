//! Subcommand implementations

pub mod contours;
pub mod differentiae;
