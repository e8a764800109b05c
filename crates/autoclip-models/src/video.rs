//! Video records and the processing status state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::clip::Clip;
use crate::transcript::TranscriptSegment;

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video processing status.
///
/// Forward path: `Uploaded -> Transcribing -> Analyzing -> Complete`.
/// `Error` is reachable from every non-terminal state. The only way back
/// is an explicit reset to `Uploaded` when a video is reprocessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Source stored, pipeline not started yet
    #[default]
    Uploaded,
    /// Audio extraction and transcription in progress
    Transcribing,
    /// Chunking, scoring and clip cutting in progress
    Analyzing,
    /// Pipeline finished (possibly with zero clips)
    Complete,
    /// Pipeline aborted
    Error,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Transcribing => "transcribing",
            VideoStatus::Analyzing => "analyzing",
            VideoStatus::Complete => "complete",
            VideoStatus::Error => "error",
        }
    }

    /// Position on the forward path; `None` for `Error`.
    fn rank(&self) -> Option<u8> {
        match self {
            VideoStatus::Uploaded => Some(0),
            VideoStatus::Transcribing => Some(1),
            VideoStatus::Analyzing => Some(2),
            VideoStatus::Complete => Some(3),
            VideoStatus::Error => None,
        }
    }

    /// Check if this is a terminal state (no more pipeline updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Complete | VideoStatus::Error)
    }

    /// Whether the pipeline may move from `self` to `next`.
    ///
    /// Resetting to `Uploaded` for reprocessing is not a pipeline
    /// transition and is allowed from any status.
    pub fn can_advance_to(&self, next: VideoStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(current), Some(target)) => target == current + 1,
            (None, Some(_)) => false,
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A submitted long-form video and its pipeline results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    pub id: VideoId,

    /// File name as supplied by the uploader
    pub original_name: String,

    /// Where the source file lives (local path)
    pub source_location: String,

    #[serde(default)]
    pub status: VideoStatus,

    /// Ordered transcript, absent until transcription succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Vec<TranscriptSegment>>,

    /// Average score over successfully created clips
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virality_score: Option<f64>,

    pub created_at: DateTime<Utc>,
}

impl Video {
    /// Create a freshly uploaded video record.
    pub fn new(original_name: impl Into<String>, source_location: impl Into<String>) -> Self {
        Self {
            id: VideoId::new(),
            original_name: original_name.into(),
            source_location: source_location.into(),
            status: VideoStatus::Uploaded,
            transcript: None,
            virality_score: None,
            created_at: Utc::now(),
        }
    }
}

/// Fields supplied when creating a video record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVideo {
    pub original_name: String,
    pub source_location: String,
}

/// A video together with its clips, as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoView {
    #[serde(flatten)]
    pub video: Video,
    pub clips: Vec<Clip>,
}
