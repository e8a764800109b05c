//! Clip boundary repair.
//!
//! Turns a candidate `(start, end)` window into one that fits inside the
//! source and satisfies the clip duration bounds, or reports that no such
//! window exists.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PipelineConfig;

/// Tolerance for floating point drift when checking durations.
pub const DURATION_EPSILON: f64 = 1e-6;

/// A validated clip window in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipBounds {
    pub start: f64,
    pub end: f64,
}

impl ClipBounds {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundaryError {
    #[error("invalid clip range: start {start:.3}s, end {end:.3}s")]
    InvalidRange { start: f64, end: f64 },

    #[error("video duration {video_duration:.3}s is shorter than the minimum clip length {min_clip:.3}s")]
    VideoTooShort { video_duration: f64, min_clip: f64 },

    #[error("could not repair clip to a valid duration ({duration:.3}s)")]
    Unrepairable { duration: f64 },
}

/// Check a window's duration against the configured bounds.
pub fn validate_clip_duration(start: f64, end: f64, config: &PipelineConfig) -> bool {
    let duration = end - start;
    start < end
        && duration >= config.min_clip_secs - DURATION_EPSILON
        && duration <= config.max_clip_secs + DURATION_EPSILON
}

/// Repair a candidate window so it satisfies the duration bounds.
///
/// Clamps to `[0, video_duration]`, extends short windows symmetrically
/// (then from the open side when one edge is pinned) and trims long
/// windows from the end. Fails instead of returning an invalid window.
pub fn adjust_clip_boundaries(
    start: f64,
    end: f64,
    video_duration: f64,
    config: &PipelineConfig,
) -> Result<ClipBounds, BoundaryError> {
    if !start.is_finite() || !end.is_finite() || start >= end {
        return Err(BoundaryError::InvalidRange { start, end });
    }

    let min_clip = config.min_clip_secs;
    let max_clip = config.max_clip_secs;

    if !video_duration.is_finite() || video_duration < min_clip {
        return Err(BoundaryError::VideoTooShort {
            video_duration,
            min_clip,
        });
    }

    let mut start = start.max(0.0);
    let mut end = end.min(video_duration);
    if start >= end {
        return Err(BoundaryError::InvalidRange { start, end });
    }

    let duration = end - start;
    if duration < min_clip {
        let extension = (min_clip - duration) / 2.0;
        start = (start - extension).max(0.0);
        end = (end + extension).min(video_duration);
    }

    // One edge is pinned (or float drift left us short): grow from the other side.
    if end - start < min_clip {
        if start <= 0.0 {
            start = 0.0;
            end = min_clip.min(video_duration);
        } else {
            start = (end - min_clip).max(0.0);
        }
    }

    if end - start > max_clip {
        end = start + max_clip;
    }

    if !validate_clip_duration(start, end, config) {
        return Err(BoundaryError::Unrepairable {
            duration: end - start,
        });
    }

    Ok(ClipBounds { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn assert_valid(bounds: ClipBounds, video_duration: f64) {
        let cfg = config();
        assert!(bounds.start >= 0.0, "start {} < 0", bounds.start);
        assert!(bounds.end <= video_duration + DURATION_EPSILON);
        assert!(validate_clip_duration(bounds.start, bounds.end, &cfg), "{:?}", bounds);
    }

    #[test]
    fn test_valid_window_is_untouched() {
        let bounds = adjust_clip_boundaries(10.0, 40.0, 100.0, &config()).unwrap();
        assert_eq!(bounds, ClipBounds { start: 10.0, end: 40.0 });
    }

    #[test]
    fn test_short_window_extends_symmetrically() {
        let bounds = adjust_clip_boundaries(10.0, 12.0, 100.0, &config()).unwrap();
        assert!((bounds.start - 8.5).abs() < 1e-9);
        assert!((bounds.end - 13.5).abs() < 1e-9);
    }

    #[test]
    fn test_short_window_pinned_at_start_extends_end() {
        let bounds = adjust_clip_boundaries(0.5, 1.5, 100.0, &config()).unwrap();
        assert_eq!(bounds.start, 0.0);
        assert!((bounds.end - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_window_pinned_at_end_extends_start() {
        let bounds = adjust_clip_boundaries(58.0, 59.5, 60.0, &config()).unwrap();
        assert_eq!(bounds.end, 60.0);
        assert!((bounds.start - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_window_trimmed_from_end() {
        let bounds = adjust_clip_boundaries(20.0, 500.0, 1000.0, &config()).unwrap();
        assert_eq!(bounds.start, 20.0);
        assert!((bounds.end - 320.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_past_video_end_is_clamped() {
        let bounds = adjust_clip_boundaries(50.0, 90.0, 70.0, &config()).unwrap();
        assert_eq!(bounds, ClipBounds { start: 50.0, end: 70.0 });
    }

    #[test]
    fn test_video_shorter_than_min_clip_fails() {
        let err = adjust_clip_boundaries(0.0, 2.0, 3.0, &config()).unwrap_err();
        assert!(matches!(err, BoundaryError::VideoTooShort { .. }));
    }

    #[test]
    fn test_inverted_range_fails() {
        assert!(matches!(
            adjust_clip_boundaries(10.0, 10.0, 100.0, &config()),
            Err(BoundaryError::InvalidRange { .. })
        ));
        assert!(matches!(
            adjust_clip_boundaries(120.0, 130.0, 100.0, &config()),
            Err(BoundaryError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_output_always_within_bounds() {
        let video_durations: [f64; 8] = [5.0, 5.5, 12.0, 61.3, 299.0, 300.0, 301.0, 1800.0];
        let steps: [f64; 12] = [0.0, 0.1, 0.49, 1.0, 2.5, 4.99, 5.0, 17.3, 150.0, 299.99, 300.0, 450.0];

        for &video_duration in &video_durations {
            for &start_step in &steps {
                for &len in &steps[1..] {
                    let start = start_step.min(video_duration);
                    let end = (start + len).min(video_duration);
                    if start >= end {
                        continue;
                    }
                    let bounds = adjust_clip_boundaries(start, end, video_duration, &config())
                        .unwrap_or_else(|e| {
                            panic!("({start}, {end}, {video_duration}) failed: {e}")
                        });
                    assert_valid(bounds, video_duration);
                }
            }
        }
    }
}
