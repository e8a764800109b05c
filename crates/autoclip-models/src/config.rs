//! Pipeline thresholds.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Minimum clip duration in seconds
pub const DEFAULT_MIN_CLIP_SECS: f64 = 5.0;
/// Maximum clip duration in seconds
pub const DEFAULT_MAX_CLIP_SECS: f64 = 300.0;
/// Preferred clip duration in seconds
pub const DEFAULT_TARGET_CLIP_SECS: f64 = 30.0;
/// Segments shorter than this are ignored by the chunker
pub const DEFAULT_MIN_SEGMENT_SECS: f64 = 0.5;
/// Longest transcript segment accepted by validation
pub const DEFAULT_MAX_SEGMENT_SECS: f64 = 600.0;
/// Maximum number of clips cut per video
pub const DEFAULT_MAX_CLIPS: usize = 10;
/// Minimum virality score for a chunk to be cut
pub const DEFAULT_MIN_SCORE_THRESHOLD: f64 = 60.0;

/// Thresholds shared by the chunker, scorer filter and boundary adjuster.
///
/// Passed explicitly into each stage so callers can override values per
/// run and tests can use isolated settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineConfig {
    #[serde(default = "default_min_clip")]
    pub min_clip_secs: f64,

    #[serde(default = "default_max_clip")]
    pub max_clip_secs: f64,

    #[serde(default = "default_target_clip")]
    pub target_clip_secs: f64,

    #[serde(default = "default_min_segment")]
    pub min_segment_secs: f64,

    #[serde(default = "default_max_segment")]
    pub max_segment_secs: f64,

    #[serde(default = "default_max_clips")]
    pub max_clips: usize,

    #[serde(default = "default_min_score")]
    pub min_score_threshold: f64,
}

fn default_min_clip() -> f64 {
    DEFAULT_MIN_CLIP_SECS
}
fn default_max_clip() -> f64 {
    DEFAULT_MAX_CLIP_SECS
}
fn default_target_clip() -> f64 {
    DEFAULT_TARGET_CLIP_SECS
}
fn default_min_segment() -> f64 {
    DEFAULT_MIN_SEGMENT_SECS
}
fn default_max_segment() -> f64 {
    DEFAULT_MAX_SEGMENT_SECS
}
fn default_max_clips() -> usize {
    DEFAULT_MAX_CLIPS
}
fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE_THRESHOLD
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_clip_secs: DEFAULT_MIN_CLIP_SECS,
            max_clip_secs: DEFAULT_MAX_CLIP_SECS,
            target_clip_secs: DEFAULT_TARGET_CLIP_SECS,
            min_segment_secs: DEFAULT_MIN_SEGMENT_SECS,
            max_segment_secs: DEFAULT_MAX_SEGMENT_SECS,
            max_clips: DEFAULT_MAX_CLIPS,
            min_score_threshold: DEFAULT_MIN_SCORE_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_clip_secs: env_or("AUTOCLIP_MIN_CLIP_SECS", defaults.min_clip_secs),
            max_clip_secs: env_or("AUTOCLIP_MAX_CLIP_SECS", defaults.max_clip_secs),
            target_clip_secs: env_or("AUTOCLIP_TARGET_CLIP_SECS", defaults.target_clip_secs),
            min_segment_secs: defaults.min_segment_secs,
            max_segment_secs: defaults.max_segment_secs,
            max_clips: env_or("AUTOCLIP_MAX_CLIPS", defaults.max_clips),
            min_score_threshold: env_or("AUTOCLIP_MIN_SCORE", defaults.min_score_threshold),
        }
    }

    /// Returns a new config with a different score threshold.
    pub fn with_min_score(mut self, threshold: f64) -> Self {
        self.min_score_threshold = threshold;
        self
    }

    /// Returns a new config with a different clip count cap.
    pub fn with_max_clips(mut self, max_clips: usize) -> Self {
        self.max_clips = max_clips;
        self
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
