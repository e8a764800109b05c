//! Shared data models for the AutoClip pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Videos, clips and the processing status state machine
//! - Transcripts and clip candidates
//! - Pipeline thresholds and encoding profiles
//! - Clip boundary repair

pub mod boundary;
pub mod chunk;
pub mod clip;
pub mod config;
pub mod encoding;
pub mod transcript;
pub mod video;

// Re-export common types
pub use boundary::{adjust_clip_boundaries, validate_clip_duration, BoundaryError, ClipBounds};
pub use chunk::{ClipChunk, ScoreSource, ScoredChunk, ViralityScore};
pub use clip::{clip_file_name, Clip, ClipId, NewClip};
pub use config::PipelineConfig;
pub use encoding::{AudioEncoding, ClipEncoding};
pub use transcript::{Transcript, TranscriptError, TranscriptSegment};
pub use video::{NewVideo, Video, VideoId, VideoStatus, VideoView};
