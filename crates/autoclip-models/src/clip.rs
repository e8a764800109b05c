//! Clip records produced by the pipeline.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::VideoId;

/// Unique identifier for a clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A delivery-ready clip cut from a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    pub id: ClipId,
    /// Owning video
    pub video_id: VideoId,
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    pub summary: String,
    pub virality_score: f64,
    /// Relative location suitable for static delivery (e.g. `/clips/clip-<id>-0.mp4`)
    pub output_location: String,
    pub created_at: DateTime<Utc>,
}

impl Clip {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Fields supplied when persisting a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClip {
    pub video_id: VideoId,
    pub start_time: f64,
    pub end_time: f64,
    pub summary: String,
    pub virality_score: f64,
    pub output_location: String,
}

impl NewClip {
    /// Materialize into a stored clip with a fresh id and timestamp.
    pub fn into_clip(self) -> Clip {
        Clip {
            id: ClipId::new(),
            video_id: self.video_id,
            start_time: self.start_time,
            end_time: self.end_time,
            summary: self.summary,
            virality_score: self.virality_score,
            output_location: self.output_location,
            created_at: Utc::now(),
        }
    }
}

/// Output file name for the `index`-th selected clip of a video.
pub fn clip_file_name(video_id: &VideoId, index: usize) -> String {
    format!("clip-{}-{}.mp4", video_id, index)
}
