use std::path::PathBuf;

use serde::Serialize;

use super::model_tier::ModelTier;

/// Timestamped span of transcribed text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextSegment {
    /// Unique within one [`TranscriptionResult`] only.
    pub id: i64,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TextSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Outcome of a single transcription, owned by the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    /// Detected or declared language. Empty when the tool reported none.
    pub language: String,
    /// Audio duration in seconds, 0.0 when unknown.
    pub duration: f64,
    /// Chronological order.
    pub segments: Vec<TextSegment>,
    /// Plain-text artifact written by the tool, if there was one.
    pub file_path: Option<PathBuf>,
    pub model: ModelTier,
}

impl TranscriptionResult {
    pub fn empty(model: ModelTier) -> Self {
        Self {
            text: String::new(),
            language: String::new(),
            duration: 0.0,
            segments: Vec::new(),
            file_path: None,
            model,
        }
    }

    /// True when every segment has `start <= end` and starts never decrease.
    pub fn has_ordered_segments(&self) -> bool {
        self.segments.iter().all(|s| s.start <= s.end)
            && self
                .segments
                .windows(2)
                .all(|pair| pair[0].start <= pair[1].start)
    }
}
