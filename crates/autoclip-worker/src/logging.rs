//! Structured pipeline logging utilities.
//!
//! Provides consistent, structured logging for pipeline runs with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

use autoclip_models::VideoId;

/// Pipeline logger for structured logging with consistent formatting.
///
/// Every event carries the video ID and the operation (`process` or
/// `reprocess`), and stage events add the stage name.
#[derive(Debug, Clone)]
pub struct PipelineLogger {
    video_id: String,
    operation: String,
}

impl PipelineLogger {
    pub fn new(video_id: &VideoId, operation: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Pipeline started: {}", message
        );
    }

    /// Log entry into a pipeline stage.
    pub fn log_stage(&self, stage: &str, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            stage = stage,
            "{}", message
        );
    }

    /// Log a per-clip problem that does not stop the run.
    pub fn log_clip_skipped(&self, clip_index: usize, message: &str) {
        warn!(
            video_id = %self.video_id,
            operation = %self.operation,
            stage = "cutting",
            clip_index = clip_index,
            "Clip skipped: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Pipeline warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Pipeline error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Pipeline completed: {}", message
        );
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for one pipeline run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "pipeline",
            video_id = %self.video_id,
            operation = %self.operation
        )
    }
}
