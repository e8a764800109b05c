//! Time-coded transcript types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One time-coded piece of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Full transcription result: the joined text plus ordered segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    pub full_text: String,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Build a transcript from segments, deriving the full text.
    pub fn from_segments(segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            full_text,
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check the transcript is usable for analysis.
    ///
    /// Rejects an empty transcript and any segment whose duration falls
    /// outside `[0, max_segment_secs]`.
    pub fn validate(&self, max_segment_secs: f64) -> Result<(), TranscriptError> {
        if self.segments.is_empty() {
            return Err(TranscriptError::Empty);
        }

        for (index, seg) in self.segments.iter().enumerate() {
            let duration = seg.duration();
            if !duration.is_finite() || duration < 0.0 || duration > max_segment_secs {
                return Err(TranscriptError::SegmentDuration { index, duration });
            }
        }

        Ok(())
    }
}

/// Reasons a transcript is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscriptError {
    #[error("transcript has no segments")]
    Empty,

    #[error("segment {index} has invalid duration {duration:.3}s")]
    SegmentDuration { index: usize, duration: f64 },
}
