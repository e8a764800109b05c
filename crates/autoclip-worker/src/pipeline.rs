//! Pipeline orchestration for a single video.
//!
//! # Flow
//!
//! 1. Probe the source for its duration
//! 2. `transcribing`: extract audio and transcribe it (synthetic fallback)
//! 3. Validate and persist the transcript, drop the temporary audio
//! 4. `analyzing`: chunk, score and select candidates
//! 5. Cut each selected candidate in turn; a failed clip is skipped
//! 6. Persist the rounded average score of the clips that were created
//! 7. `complete`
//!
//! Any error returned from [`PipelineContext::run`] is a whole-video
//! failure; the executor marks the video `error` and leaves whatever
//! transcript or clips were already written.

use std::path::Path;
use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use autoclip_ai::{FallbackScorer, TranscriptSource, TranscriptionService};
use autoclip_media::{
    remove_file_if_exists, AudioExtractor, ClipCutter, ClipExtractor, FfmpegToolkit, MediaProbe,
};
use autoclip_models::{
    adjust_clip_boundaries, Clip, NewClip, PipelineConfig, ScoredChunk, VideoId, VideoStatus,
};
use autoclip_store::{StoreError, VideoStore};

use crate::analysis::{build_chunks, select_top_chunks};
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::PipelineLogger;

/// Media capabilities used by the pipeline.
#[derive(Clone)]
pub struct MediaCapabilities {
    pub probe: Arc<dyn MediaProbe>,
    pub audio: Arc<dyn AudioExtractor>,
    pub cutter: Arc<dyn ClipCutter>,
}

impl MediaCapabilities {
    /// Every capability backed by the same FFmpeg toolkit.
    pub fn ffmpeg(toolkit: FfmpegToolkit) -> Self {
        let toolkit = Arc::new(toolkit);
        Self {
            probe: toolkit.clone(),
            audio: toolkit.clone(),
            cutter: toolkit,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub video_id: VideoId,
    pub transcript_source: TranscriptSource,
    pub segment_count: usize,
    pub chunk_count: usize,
    pub selected_count: usize,
    pub clips: Vec<Clip>,
    pub clips_skipped: usize,
    pub average_score: Option<f64>,
}

/// Everything a pipeline run needs.
pub struct PipelineContext {
    pub store: Arc<dyn VideoStore>,
    pub media: MediaCapabilities,
    pub extractor: ClipExtractor,
    pub transcription: TranscriptionService,
    pub scorer: FallbackScorer,
    pub pipeline: PipelineConfig,
    pub worker: WorkerConfig,
}

impl PipelineContext {
    pub fn new(
        store: Arc<dyn VideoStore>,
        media: MediaCapabilities,
        transcription: TranscriptionService,
        scorer: FallbackScorer,
        pipeline: PipelineConfig,
        worker: WorkerConfig,
    ) -> Self {
        let extractor =
            ClipExtractor::new(media.probe.clone(), media.cutter.clone(), pipeline.clone());
        Self {
            store,
            media,
            extractor,
            transcription,
            scorer,
            pipeline,
            worker,
        }
    }

    /// Run the full pipeline for `video_id` from `source`.
    ///
    /// The video must be in `uploaded`.
    pub async fn run(
        &self,
        video_id: &VideoId,
        source: &Path,
        logger: &PipelineLogger,
    ) -> WorkerResult<PipelineSummary> {
        let video = self
            .store
            .get_video(video_id)
            .await?
            .ok_or_else(|| WorkerError::NotFound(video_id.clone()))?;
        logger.log_start(&format!("{} ({})", video.original_name, source.display()));

        let info = self.media.probe.probe(source).await?;
        info.ensure_playable()?;

        let status = self
            .advance(video_id, video.status, VideoStatus::Transcribing)
            .await?;
        logger.log_stage("transcribing", "Extracting audio");

        let audio_path = self.worker.audio_path(video_id);
        let audio = self.media.audio.extract_audio(source, &audio_path).await?;
        let (transcript, transcript_source) =
            self.transcription.transcribe(&audio, info.duration).await;
        self.discard_audio(&audio, logger).await;

        transcript.validate(self.pipeline.max_segment_secs)?;
        let segment_count = transcript.segments.len();
        self.store
            .update_video_transcript(video_id, transcript.segments.clone())
            .await?;

        let status = self.advance(video_id, status, VideoStatus::Analyzing).await?;
        let chunks = build_chunks(&transcript.segments, &self.pipeline);
        let scored = self.scorer.score_all(&chunks).await;
        let selected = select_top_chunks(scored, &self.pipeline);
        logger.log_stage(
            "analyzing",
            &format!(
                "{} segments -> {} chunks -> {} selected",
                segment_count,
                chunks.len(),
                selected.len()
            ),
        );

        let mut clips = Vec::with_capacity(selected.len());
        let mut clips_skipped = 0;
        for (index, candidate) in selected.iter().enumerate() {
            match self
                .create_clip(video_id, source, index, candidate, info.duration)
                .await
            {
                Ok(clip) => {
                    counter!("autoclip_clips_created_total").increment(1);
                    clips.push(clip);
                }
                Err(e) => {
                    counter!("autoclip_clips_skipped_total").increment(1);
                    clips_skipped += 1;
                    logger.log_clip_skipped(index, &e.to_string());
                }
            }
        }

        let average_score = average_score(&clips);
        if average_score.is_some() {
            self.store.update_video_score(video_id, average_score).await?;
        }

        self.advance(video_id, status, VideoStatus::Complete).await?;
        logger.log_completion(&format!(
            "{} clips created, {} skipped",
            clips.len(),
            clips_skipped
        ));

        Ok(PipelineSummary {
            video_id: video_id.clone(),
            transcript_source,
            segment_count,
            chunk_count: chunks.len(),
            selected_count: selected.len(),
            clips,
            clips_skipped,
            average_score,
        })
    }

    /// Persist `error` unless the video already reached a terminal state.
    pub async fn mark_failed(&self, video_id: &VideoId, logger: &PipelineLogger) {
        let current = match self.store.get_video(video_id).await {
            Ok(Some(video)) => video.status,
            Ok(None) => {
                logger.log_warning("Video record vanished before it could be marked failed");
                return;
            }
            Err(e) => {
                logger.log_error(&format!("Failed to load video to mark it failed: {}", e));
                return;
            }
        };

        if !current.can_advance_to(VideoStatus::Error) {
            debug!("Video {} already {}, not marking error", video_id, current);
            return;
        }

        match self
            .store
            .transition_video_status(video_id, current, VideoStatus::Error)
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_conflict() => {
                debug!("Video {} moved on before it was marked failed: {}", video_id, e);
            }
            Err(e) => logger.log_error(&format!("Failed to persist error status: {}", e)),
        }
    }

    /// Persist `next` if the move from `current` is allowed and the stored
    /// status is still `current`.
    async fn advance(
        &self,
        video_id: &VideoId,
        current: VideoStatus,
        next: VideoStatus,
    ) -> WorkerResult<VideoStatus> {
        if !current.can_advance_to(next) {
            return Err(WorkerError::invalid_transition(current, next));
        }
        match self
            .store
            .transition_video_status(video_id, current, next)
            .await
        {
            Ok(video) => Ok(video.status),
            Err(StoreError::StatusConflict { actual, .. }) => {
                Err(WorkerError::invalid_transition(actual, next))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Cut one selected candidate and record it.
    async fn create_clip(
        &self,
        video_id: &VideoId,
        source: &Path,
        index: usize,
        candidate: &ScoredChunk,
        source_duration: f64,
    ) -> WorkerResult<Clip> {
        let bounds = adjust_clip_boundaries(
            candidate.chunk.start,
            candidate.chunk.end,
            source_duration,
            &self.pipeline,
        )?;

        let output = self.worker.clip_path(video_id, index);
        let cut = self
            .extractor
            .extract(source, bounds.start, bounds.end, &output)
            .await?;

        let new_clip = NewClip {
            video_id: video_id.clone(),
            start_time: cut.start,
            end_time: cut.end,
            summary: candidate.summary.clone(),
            virality_score: candidate.score,
            output_location: self.worker.clip_location(video_id, index),
        };

        match self.store.create_clip(new_clip).await {
            Ok(clip) => Ok(clip),
            Err(e) => {
                if let Err(cleanup) = remove_file_if_exists(&output).await {
                    warn!("Failed to remove unrecorded clip {}: {}", output.display(), cleanup);
                }
                Err(e.into())
            }
        }
    }

    async fn discard_audio(&self, audio: &Path, logger: &PipelineLogger) {
        if let Err(e) = remove_file_if_exists(audio).await {
            logger.log_warning(&format!(
                "Failed to remove temporary audio {}: {}",
                audio.display(),
                e
            ));
        }
    }
}

/// Rounded mean score of the clips that were created.
fn average_score(clips: &[Clip]) -> Option<f64> {
    if clips.is_empty() {
        return None;
    }
    let total: f64 = clips.iter().map(|c| c.virality_score).sum();
    Some((total / clips.len() as f64).round())
}
