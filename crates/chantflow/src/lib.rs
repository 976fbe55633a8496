//! chantflow - dataset generation for chant contour analysis
//!
//! The binary wires configuration, logging and the `contours` library into
//! two batch jobs; the pieces live here so they can be tested directly.

pub mod artifacts;
pub mod commands;
pub mod genres;
pub mod telemetry;

pub use genres::{Genre, ALL_GENRES};
pub use telemetry::RunLog;
