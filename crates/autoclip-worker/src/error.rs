//! Worker error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use autoclip_media::MediaError;
use autoclip_models::{BoundaryError, TranscriptError, VideoId, VideoStatus};
use autoclip_store::StoreError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Video not found: {0}")]
    NotFound(VideoId),

    #[error("Source file missing: {0}")]
    SourceMissing(PathBuf),

    #[error("Invalid source video: {0}")]
    InvalidSource(String),

    #[error("Invalid transcript: {0}")]
    InvalidTranscript(#[from] TranscriptError),

    #[error("Invalid clip boundary: {0}")]
    InvalidBoundary(#[from] BoundaryError),

    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition { from: VideoStatus, to: VideoStatus },

    #[error("Pipeline already running for video {0}")]
    AlreadyRunning(VideoId),

    #[error("Pipeline cancelled")]
    Cancelled,

    #[error("Pipeline timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSource(msg.into())
    }

    pub fn invalid_transition(from: VideoStatus, to: VideoStatus) -> Self {
        Self::InvalidTransition { from, to }
    }

    /// Whether the run was stopped from outside rather than failing on its own.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, WorkerError::Cancelled | WorkerError::TimedOut(_))
    }
}
