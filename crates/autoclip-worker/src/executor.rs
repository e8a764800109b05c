//! Per-video pipeline task executor.
//!
//! Each submitted video runs as its own tokio task. The executor keeps a
//! handle per video id so a run can be cancelled, awaited or time-boxed.
//! Dropping a run's future drops any FFmpeg child it was waiting on, and
//! those children are spawned with `kill_on_drop`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use metrics::{counter, histogram};
use tokio::sync::{watch, Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info, warn, Instrument};

use autoclip_models::VideoId;

use crate::error::{WorkerError, WorkerResult};
use crate::logging::PipelineLogger;
use crate::pipeline::{PipelineContext, PipelineSummary};

/// Control handle for one in-flight run.
struct PipelineHandle {
    run_id: u64,
    cancel_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
    join: JoinHandle<()>,
}

/// Spawns pipeline runs and tracks them by video id.
pub struct PipelineExecutor {
    ctx: Arc<PipelineContext>,
    semaphore: Arc<Semaphore>,
    handles: Arc<Mutex<HashMap<VideoId, PipelineHandle>>>,
    next_run_id: AtomicU64,
    timeout: Option<Duration>,
}

impl PipelineExecutor {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        let permits = ctx.worker.max_concurrent_pipelines.max(1);
        let timeout = ctx.worker.pipeline_timeout;
        Self {
            ctx,
            semaphore: Arc::new(Semaphore::new(permits)),
            handles: Arc::new(Mutex::new(HashMap::new())),
            next_run_id: AtomicU64::new(0),
            timeout,
        }
    }

    /// Schedule a run for `video_id` and return immediately.
    ///
    /// Fails with [`WorkerError::AlreadyRunning`] while another run for the
    /// same video is tracked; stop it with [`Self::cancel_and_wait`] first.
    pub async fn spawn(
        &self,
        video_id: VideoId,
        source: PathBuf,
        operation: &'static str,
    ) -> WorkerResult<()> {
        // Held across the spawn so the task cannot finish before its handle exists.
        let mut map = self.handles.lock().await;
        if map.contains_key(&video_id) {
            return Err(WorkerError::AlreadyRunning(video_id));
        }

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);

        let ctx = Arc::clone(&self.ctx);
        let semaphore = Arc::clone(&self.semaphore);
        let handles = Arc::clone(&self.handles);
        let timeout = self.timeout;
        let id = video_id.clone();

        let join = tokio::spawn(async move {
            let logger = PipelineLogger::new(&id, operation);
            let span = logger.create_span();

            async {
                let outcome =
                    run_guarded(&ctx, &id, &source, &logger, semaphore, cancel_rx, timeout).await;
                finish(&ctx, &id, &logger, outcome).await;
            }
            .instrument(span)
            .await;

            {
                let mut map = handles.lock().await;
                if map.get(&id).is_some_and(|h| h.run_id == run_id) {
                    map.remove(&id);
                }
            }
            let _ = done_tx.send(true);
        });

        let handle = PipelineHandle {
            run_id,
            cancel_tx,
            done_rx,
            join,
        };
        map.insert(video_id, handle);
        Ok(())
    }

    /// Signal the run for `video_id` to stop. Returns false if none is tracked.
    pub async fn cancel(&self, video_id: &VideoId) -> bool {
        match self.handles.lock().await.get(video_id) {
            Some(handle) => {
                info!("Cancelling pipeline for video {}", video_id);
                let _ = handle.cancel_tx.send(true);
                true
            }
            None => false,
        }
    }

    /// Cancel the run for `video_id` and wait until it has fully stopped.
    pub async fn cancel_and_wait(&self, video_id: &VideoId) -> bool {
        let handle = self.handles.lock().await.remove(video_id);
        let Some(handle) = handle else {
            return false;
        };

        info!("Cancelling pipeline for video {} and waiting", video_id);
        let _ = handle.cancel_tx.send(true);
        if let Err(e) = handle.join.await {
            warn!("Pipeline task for video {} ended abnormally: {}", video_id, e);
        }
        true
    }

    /// Wait until the tracked run for `video_id` (if any) finishes.
    pub async fn wait(&self, video_id: &VideoId) {
        let done_rx = self
            .handles
            .lock()
            .await
            .get(video_id)
            .map(|h| h.done_rx.clone());
        if let Some(mut rx) = done_rx {
            wait_done(&mut rx).await;
        }
    }

    /// Wait for every run tracked at the time of the call.
    pub async fn wait_all(&self) {
        let receivers: Vec<_> = self
            .handles
            .lock()
            .await
            .values()
            .map(|h| h.done_rx.clone())
            .collect();

        join_all(receivers.into_iter().map(|mut rx| async move {
            wait_done(&mut rx).await;
        }))
        .await;
    }

    pub async fn is_running(&self, video_id: &VideoId) -> bool {
        self.handles.lock().await.contains_key(video_id)
    }

    pub async fn running_count(&self) -> usize {
        self.handles.lock().await.len()
    }

    /// Cancel every run and wait for all of them to stop.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.handles.lock().await.drain().collect();
        if handles.is_empty() {
            return;
        }

        info!("Shutting down {} pipeline runs", handles.len());
        let joins: Vec<_> = handles
            .into_iter()
            .map(|(_, handle)| {
                let _ = handle.cancel_tx.send(true);
                handle.join
            })
            .collect();

        for result in join_all(joins).await {
            if let Err(e) = result {
                warn!("Pipeline task ended abnormally during shutdown: {}", e);
            }
        }
    }
}

/// Run the pipeline once a permit is free, racing cancellation and the time box.
async fn run_guarded(
    ctx: &PipelineContext,
    video_id: &VideoId,
    source: &Path,
    logger: &PipelineLogger,
    semaphore: Arc<Semaphore>,
    mut cancel_rx: watch::Receiver<bool>,
    timeout: Option<Duration>,
) -> WorkerResult<PipelineSummary> {
    let _permit = tokio::select! {
        permit = semaphore.acquire_owned() => permit.map_err(|_| WorkerError::Cancelled)?,
        _ = wait_cancelled(&mut cancel_rx) => return Err(WorkerError::Cancelled),
    };

    let started = Instant::now();
    let result = tokio::select! {
        result = ctx.run(video_id, source, logger) => result,
        _ = wait_cancelled(&mut cancel_rx) => Err(WorkerError::Cancelled),
        limit = deadline(timeout) => Err(WorkerError::TimedOut(limit)),
    };
    histogram!("autoclip_pipeline_duration_seconds").record(started.elapsed().as_secs_f64());

    result
}

async fn finish(
    ctx: &PipelineContext,
    video_id: &VideoId,
    logger: &PipelineLogger,
    outcome: WorkerResult<PipelineSummary>,
) {
    match outcome {
        Ok(summary) => {
            counter!("autoclip_videos_processed_total", "outcome" => "complete").increment(1);
            info!(
                clips = summary.clips.len(),
                skipped = summary.clips_skipped,
                "Video {} complete",
                video_id
            );
        }
        Err(e) => {
            let label = match &e {
                WorkerError::Cancelled => "cancelled",
                WorkerError::TimedOut(_) => "timed_out",
                _ => "error",
            };
            counter!("autoclip_videos_processed_total", "outcome" => label).increment(1);
            if e.is_interrupted() {
                logger.log_warning(&e.to_string());
            } else {
                logger.log_error(&e.to_string());
            }
            ctx.mark_failed(video_id, logger).await;
        }
    }
}

/// Resolves once `true` is observed; never resolves if the sender is gone.
async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves once the run reports done or its task is gone.
async fn wait_done(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn deadline(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(limit) => {
            tokio::time::sleep(limit).await;
            limit
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        context, file_count, new_video, segments_every, FakeCutter, FakeProbe, FixedTranscriber,
        RecordingStore,
    };
    use autoclip_ai::TranscriptionService;
    use autoclip_models::{NewVideo, PipelineConfig, VideoStatus};
    use autoclip_store::{MemoryStore, VideoStore};
    use tempfile::TempDir;

    fn slow_context(
        temp: &TempDir,
        store: Arc<dyn VideoStore>,
        timeout: Option<Duration>,
    ) -> PipelineContext {
        let transcript = segments_every(16.0, 64.0, "Unbelievable!");
        let mut ctx = context(
            temp.path(),
            store,
            Arc::new(FakeProbe::new(64.0)),
            Arc::new(FakeCutter::new().with_delay(Duration::from_secs(30))),
            TranscriptionService::new(Some(Arc::new(FixedTranscriber::new(transcript)))),
            PipelineConfig::default().with_min_score(0.0),
        );
        ctx.worker.pipeline_timeout = timeout;
        ctx
    }

    async fn uploaded(store: &MemoryStore) -> VideoId {
        store
            .create_video(NewVideo {
                original_name: "talk.mp4".to_string(),
                source_location: "talk.mp4".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_completed_run_removes_handle() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let ctx = context(
            temp.path(),
            store.clone(),
            Arc::new(FakeProbe::new(64.0)),
            Arc::new(FakeCutter::new()),
            TranscriptionService::synthetic(),
            PipelineConfig::default(),
        );
        let executor = PipelineExecutor::new(Arc::new(ctx));
        let id = uploaded(&store).await;

        executor.spawn(id.clone(), PathBuf::from("talk.mp4"), "process").await.unwrap();
        executor.wait(&id).await;

        assert!(!executor.is_running(&id).await);
        let video = store.get_video(&id).await.unwrap().unwrap();
        assert_eq!(video.status, VideoStatus::Complete);
    }

    #[tokio::test]
    async fn test_cancel_marks_error() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let executor = PipelineExecutor::new(Arc::new(slow_context(&temp, store.clone(), None)));
        let id = uploaded(&store).await;

        executor.spawn(id.clone(), PathBuf::from("talk.mp4"), "process").await.unwrap();
        assert!(executor.is_running(&id).await);

        // Let the run reach the slow cutter.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(executor.cancel(&id).await);
        executor.wait(&id).await;

        let video = store.get_video(&id).await.unwrap().unwrap();
        assert_eq!(video.status, VideoStatus::Error);
        assert!(video.transcript.is_some());
        assert!(store.get_clips(&id).await.unwrap().is_empty());
        assert_eq!(file_count(&temp.path().join("clips")), 0);
        assert!(!executor.is_running(&id).await);
    }

    #[tokio::test]
    async fn test_cancelled_run_status_history() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(RecordingStore::new());
        let executor = PipelineExecutor::new(Arc::new(slow_context(&temp, store.clone(), None)));
        let id = new_video(store.as_ref()).await;

        executor.spawn(id.clone(), PathBuf::from("talk.mp4"), "process").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        executor.cancel(&id).await;
        executor.wait(&id).await;

        assert_eq!(
            store.history(&id),
            vec![
                VideoStatus::Transcribing,
                VideoStatus::Analyzing,
                VideoStatus::Error
            ]
        );
    }

    #[tokio::test]
    async fn test_spawn_rejects_second_run() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let executor = PipelineExecutor::new(Arc::new(slow_context(&temp, store.clone(), None)));
        let id = uploaded(&store).await;

        executor.spawn(id.clone(), PathBuf::from("talk.mp4"), "process").await.unwrap();
        let err = executor
            .spawn(id.clone(), PathBuf::from("talk.mp4"), "process")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::AlreadyRunning(_)));

        assert!(executor.cancel_and_wait(&id).await);
        executor.spawn(id.clone(), PathBuf::from("talk.mp4"), "process").await.unwrap();
        assert!(executor.is_running(&id).await);
        executor.shutdown().await;
    }

    #[tokio::test]
    async fn test_timeout_marks_error() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let ctx = slow_context(&temp, store.clone(), Some(Duration::from_millis(200)));
        let executor = PipelineExecutor::new(Arc::new(ctx));
        let id = uploaded(&store).await;

        executor.spawn(id.clone(), PathBuf::from("talk.mp4"), "process").await.unwrap();
        executor.wait(&id).await;

        let video = store.get_video(&id).await.unwrap().unwrap();
        assert_eq!(video.status, VideoStatus::Error);
        assert!(store.get_clips(&id).await.unwrap().is_empty());
        assert_eq!(file_count(&temp.path().join("clips")), 0);
    }

    #[tokio::test]
    async fn test_cancel_unknown_video() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let executor = PipelineExecutor::new(Arc::new(slow_context(&temp, store, None)));
        let missing = VideoId::from_string("missing");

        assert!(!executor.cancel(&missing).await);
        assert!(!executor.cancel_and_wait(&missing).await);
    }

    #[tokio::test]
    async fn test_shutdown_stops_all_runs() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let executor = PipelineExecutor::new(Arc::new(slow_context(&temp, store.clone(), None)));
        let a = uploaded(&store).await;
        let b = uploaded(&store).await;

        executor.spawn(a.clone(), PathBuf::from("a.mp4"), "process").await.unwrap();
        executor.spawn(b.clone(), PathBuf::from("b.mp4"), "process").await.unwrap();
        assert_eq!(executor.running_count().await, 2);

        executor.shutdown().await;

        assert_eq!(executor.running_count().await, 0);
        for id in [a, b] {
            let video = store.get_video(&id).await.unwrap().unwrap();
            assert_eq!(video.status, VideoStatus::Error);
        }
    }
}
