//! Clip candidates built from the transcript.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::transcript::TranscriptSegment;

/// A contiguous transcript window considered as one clip candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipChunk {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub duration: f64,
}

impl ClipChunk {
    /// Open a chunk from a single segment.
    pub fn from_segment(seg: &TranscriptSegment) -> Self {
        Self {
            start: seg.start,
            end: seg.end,
            text: seg.text.clone(),
            duration: seg.end - seg.start,
        }
    }

    /// Append a segment, moving the end forward.
    pub fn extend(&mut self, seg: &TranscriptSegment) {
        self.end = seg.end;
        self.text.push(' ');
        self.text.push_str(&seg.text);
        self.duration = self.end - self.start;
    }

    /// Duration the chunk would have if `seg` were appended.
    pub fn duration_with(&self, seg: &TranscriptSegment) -> f64 {
        seg.end - self.start
    }
}

/// Score and summary for a chunk of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViralityScore {
    /// 0-100
    pub score: f64,
    pub summary: String,
}

/// Which implementation produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Oracle,
    Heuristic,
}

/// A chunk with its virality score attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoredChunk {
    pub chunk: ClipChunk,
    pub score: f64,
    pub summary: String,
    pub source: ScoreSource,
}
