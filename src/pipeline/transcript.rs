//! Running transcript for one listening session.

use crate::recognition::RecognitionResult;

/// Finalized text plus the latest interim hypothesis.
///
/// Final results are appended followed by a single space; the interim text
/// is replaced wholesale on every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBuffer {
    finalized: String,
    interim: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_final(&mut self, text: &str) {
        self.finalized.push_str(text);
        self.finalized.push(' ');
    }

    /// Fold one recognition event into the buffer. Finals are appended in
    /// order; the interim text becomes the concatenation of this event's
    /// non-final results.
    pub fn apply(&mut self, results: &[RecognitionResult]) {
        let mut interim = String::new();
        for result in results {
            if result.is_final {
                self.push_final(&result.text);
            } else {
                interim.push_str(&result.text);
            }
        }
        self.interim = interim;
    }

    pub fn finalized(&self) -> &str {
        &self.finalized
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Finalized text followed by the interim text.
    pub fn full(&self) -> String {
        format!("{}{}", self.finalized, self.interim)
    }

    /// Whether the buffer holds any non-whitespace text.
    pub fn is_empty(&self) -> bool {
        self.finalized.trim().is_empty() && self.interim.trim().is_empty()
    }

    pub fn reset(&mut self) {
        self.finalized.clear();
        self.interim.clear();
    }
}
