//! Decoder feedback.
//!
//! Decoding is lenient about things that do not change the melody (unknown
//! ornaments, misaligned text, an F clef) and reports them here instead of
//! failing.

use serde::{Deserialize, Serialize};

/// A warning or note produced while decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub message: String,
    /// Byte offset into the notation, when the issue has a position.
    pub offset: Option<usize>,
}

impl Feedback {
    pub fn warning(message: impl Into<String>) -> Self {
        Feedback {
            level: FeedbackLevel::Warning,
            message: message.into(),
            offset: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Feedback {
            level: FeedbackLevel::Info,
            message: message.into(),
            offset: None,
        }
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    /// Decoded with an assumption that may not hold
    Warning,
    /// Something was ignored that does not affect pitch or timing
    Info,
}

/// Collector for feedback during decoding
#[derive(Debug, Default)]
pub struct FeedbackCollector {
    feedback: Vec<Feedback>,
    offset: usize,
}

impl FeedbackCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.feedback.push(Feedback::warning(message).at(self.offset));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.feedback.push(Feedback::info(message).at(self.offset));
    }

    /// Add feedback that does not refer to a position in the notation.
    pub fn push(&mut self, feedback: Feedback) {
        self.feedback.push(feedback);
    }

    pub fn into_feedback(self) -> Vec<Feedback> {
        self.feedback
    }
}

/// A decoded value together with the feedback collected on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoded<T> {
    pub value: T,
    pub feedback: Vec<Feedback>,
}

impl<T> Decoded<T> {
    pub fn new(value: T, feedback: Vec<Feedback>) -> Self {
        Decoded { value, feedback }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback
            .iter()
            .filter(|f| f.level == FeedbackLevel::Warning)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_tracks_offsets() {
        let mut collector = FeedbackCollector::new();
        collector.info("ignored '['");
        collector.set_offset(7);
        collector.warning("F clef");
        collector.push(Feedback::warning("text misaligned"));

        let feedback = collector.into_feedback();
        assert_eq!(feedback.len(), 3);
        assert_eq!(feedback[0].offset, Some(0));
        assert_eq!(feedback[1].offset, Some(7));
        assert_eq!(feedback[2].offset, None);
    }

    #[test]
    fn test_warnings_filter() {
        let decoded = Decoded::new(
            (),
            vec![Feedback::info("a"), Feedback::warning("b").at(3)],
        );
        let warnings: Vec<_> = decoded.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "b");
    }

    #[test]
    fn test_feedback_serializes_level_lowercase() {
        let json = serde_json::to_string(&Feedback::warning("x")).unwrap();
        assert!(json.contains("\"level\":\"warning\""));
    }
}
