//! Fake capabilities for pipeline tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use autoclip_ai::{AiError, AiResult, FallbackScorer, Transcriber, TranscriptionService};
use autoclip_media::{AudioExtractor, ClipCutter, MediaError, MediaProbe, MediaResult, VideoInfo};
use autoclip_models::{
    Clip, ClipId, NewClip, NewVideo, PipelineConfig, Transcript, TranscriptSegment, Video,
    VideoId, VideoStatus,
};
use autoclip_store::{MemoryStore, StoreResult, VideoStore};

use crate::config::WorkerConfig;
use crate::pipeline::{MediaCapabilities, PipelineContext};

pub struct FakeProbe {
    duration: f64,
}

impl FakeProbe {
    pub fn new(duration: f64) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn probe(&self, _path: &Path) -> MediaResult<VideoInfo> {
        Ok(VideoInfo {
            duration: self.duration,
            width: 1920,
            height: 1080,
            fps: 30.0,
            codec: "h264".to_string(),
        })
    }
}

pub struct FakeAudio;

#[async_trait]
impl AudioExtractor for FakeAudio {
    async fn extract_audio(&self, _source: &Path, output: &Path) -> MediaResult<PathBuf> {
        write_file(output, b"ID3").await?;
        Ok(output.to_path_buf())
    }
}

/// Writes its output up front, then optionally sleeps or fails.
#[derive(Default)]
pub struct FakeCutter {
    calls: AtomicUsize,
    fail_on: Option<usize>,
    delay: Option<Duration>,
}

impl FakeCutter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `call`-th cut (zero-based).
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClipCutter for FakeCutter {
    async fn cut_clip(
        &self,
        _source: &Path,
        _start: f64,
        _end: f64,
        output: &Path,
    ) -> MediaResult<PathBuf> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        write_file(output, b"mp4").await?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on == Some(call) {
            return Err(MediaError::ffmpeg_failed("encoder crashed", None, Some(1)));
        }
        Ok(output.to_path_buf())
    }
}

/// Memory store that remembers every status it persisted.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    statuses: Mutex<Vec<(VideoId, VideoStatus)>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses written for `id`, oldest first.
    pub fn history(&self, id: &VideoId) -> Vec<VideoStatus> {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .filter(|(video_id, _)| video_id == id)
            .map(|(_, status)| *status)
            .collect()
    }

    fn record(&self, video: &Video) {
        self.statuses
            .lock()
            .unwrap()
            .push((video.id.clone(), video.status));
    }
}

#[async_trait]
impl VideoStore for RecordingStore {
    async fn create_video(&self, video: NewVideo) -> StoreResult<Video> {
        self.inner.create_video(video).await
    }

    async fn update_video_status(&self, id: &VideoId, status: VideoStatus) -> StoreResult<Video> {
        let video = self.inner.update_video_status(id, status).await?;
        self.record(&video);
        Ok(video)
    }

    async fn transition_video_status(
        &self,
        id: &VideoId,
        from: VideoStatus,
        to: VideoStatus,
    ) -> StoreResult<Video> {
        let video = self.inner.transition_video_status(id, from, to).await?;
        self.record(&video);
        Ok(video)
    }

    async fn update_video_transcript(
        &self,
        id: &VideoId,
        transcript: Vec<TranscriptSegment>,
    ) -> StoreResult<Video> {
        self.inner.update_video_transcript(id, transcript).await
    }

    async fn update_video_score(&self, id: &VideoId, score: Option<f64>) -> StoreResult<Video> {
        self.inner.update_video_score(id, score).await
    }

    async fn create_clip(&self, clip: NewClip) -> StoreResult<Clip> {
        self.inner.create_clip(clip).await
    }

    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>> {
        self.inner.get_video(id).await
    }

    async fn get_videos(&self) -> StoreResult<Vec<Video>> {
        self.inner.get_videos().await
    }

    async fn get_clips(&self, video_id: &VideoId) -> StoreResult<Vec<Clip>> {
        self.inner.get_clips(video_id).await
    }

    async fn delete_clip(&self, clip_id: &ClipId) -> StoreResult<()> {
        self.inner.delete_clip(clip_id).await
    }
}

/// Whether every persisted status follows from the one before it.
///
/// Moving back to `uploaded` is a reprocess reset and always allowed.
pub fn is_valid_history(history: &[VideoStatus]) -> bool {
    history
        .windows(2)
        .all(|w| w[1] == VideoStatus::Uploaded || w[0].can_advance_to(w[1]))
}

/// Create an `uploaded` video record.
pub async fn new_video(store: &dyn VideoStore) -> VideoId {
    store
        .create_video(NewVideo {
            original_name: "talk.mp4".to_string(),
            source_location: "talk.mp4".to_string(),
        })
        .await
        .unwrap()
        .id
}

/// Number of files left in `dir`; a missing directory counts as empty.
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

pub struct FailingTranscriber;

#[async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> AiResult<Transcript> {
        Err(AiError::invalid_response("oracle unavailable"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

pub struct FixedTranscriber {
    segments: Vec<TranscriptSegment>,
}

impl FixedTranscriber {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> AiResult<Transcript> {
        Ok(Transcript::from_segments(self.segments.clone()))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Back-to-back segments of `step` seconds covering `[0, total)`.
pub fn segments_every(step: f64, total: f64, text: &str) -> Vec<TranscriptSegment> {
    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < total {
        segments.push(TranscriptSegment::new(start, (start + step).min(total), text));
        start += step;
    }
    segments
}

pub fn worker_config(root: &Path) -> WorkerConfig {
    WorkerConfig {
        work_dir: root.join("uploads"),
        clips_dir: root.join("clips"),
        ..WorkerConfig::default()
    }
}

/// Context with fake audio and the heuristic scorer.
pub fn context(
    root: &Path,
    store: Arc<dyn VideoStore>,
    probe: Arc<FakeProbe>,
    cutter: Arc<FakeCutter>,
    transcription: TranscriptionService,
    pipeline: PipelineConfig,
) -> PipelineContext {
    PipelineContext::new(
        store,
        MediaCapabilities {
            probe,
            audio: Arc::new(FakeAudio),
            cutter,
        },
        transcription,
        FallbackScorer::heuristic(),
        pipeline,
        worker_config(root),
    )
}

async fn write_file(path: &Path, bytes: &[u8]) -> MediaResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
