//! Entry points exposed to the transport layer.
//!
//! Every call returns once the durable record is written; the pipeline
//! itself runs in the background on the [`PipelineExecutor`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use autoclip_media::remove_file_if_exists;
use autoclip_models::{NewVideo, Video, VideoId, VideoStatus, VideoView};

use crate::error::{WorkerError, WorkerResult};
use crate::executor::PipelineExecutor;
use crate::pipeline::PipelineContext;

/// Video submission, reprocessing and lookup.
pub struct ClipService {
    ctx: Arc<PipelineContext>,
    executor: PipelineExecutor,
    /// Serializes reprocess calls per video
    reprocess_locks: Mutex<HashMap<VideoId, Arc<Mutex<()>>>>,
}

impl ClipService {
    pub fn new(ctx: PipelineContext) -> Self {
        let ctx = Arc::new(ctx);
        let executor = PipelineExecutor::new(Arc::clone(&ctx));
        Self {
            ctx,
            executor,
            reprocess_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn executor(&self) -> &PipelineExecutor {
        &self.executor
    }

    /// Register a source file and schedule its pipeline.
    ///
    /// The source is probed first; files that are missing or cannot yield
    /// any clip are rejected before a record is created.
    pub async fn submit_video(
        &self,
        source_path: impl AsRef<Path>,
        original_name: &str,
    ) -> WorkerResult<VideoId> {
        let source = source_path.as_ref();

        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(WorkerError::invalid_source(format!(
                "{} does not exist",
                source.display()
            )));
        }

        let info = self
            .ctx
            .media
            .probe
            .probe(source)
            .await
            .map_err(|e| WorkerError::invalid_source(e.to_string()))?;
        info.ensure_playable()
            .map_err(|e| WorkerError::invalid_source(e.to_string()))?;

        let video = self
            .ctx
            .store
            .create_video(NewVideo {
                original_name: original_name.to_string(),
                source_location: source.to_string_lossy().into_owned(),
            })
            .await?;

        info!(
            "Submitted video {} ({}, {:.1}s {}x{})",
            video.id, original_name, info.duration, info.width, info.height
        );
        self.executor
            .spawn(video.id.clone(), source.to_path_buf(), "process")
            .await?;

        Ok(video.id)
    }

    /// Drop previous results and run the pipeline again from the source.
    ///
    /// Concurrent calls for the same video run one after another; each
    /// stops the run scheduled by the one before it.
    pub async fn reprocess_video(&self, video_id: &VideoId) -> WorkerResult<()> {
        let video = self
            .ctx
            .store
            .get_video(video_id)
            .await?
            .ok_or_else(|| WorkerError::NotFound(video_id.clone()))?;

        let source = PathBuf::from(&video.source_location);
        if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
            return Err(WorkerError::SourceMissing(source));
        }

        let lock = self.reprocess_lock(video_id).await;
        let _guard = lock.lock().await;

        if self.executor.cancel_and_wait(video_id).await {
            info!("Stopped in-flight run for video {} before reprocessing", video_id);
        }

        let clips = self.ctx.store.get_clips(video_id).await?;
        for clip in &clips {
            if let Some(path) = self.ctx.worker.clip_file_for_location(&clip.output_location) {
                if let Err(e) = remove_file_if_exists(&path).await {
                    warn!("Failed to remove clip file {}: {}", path.display(), e);
                }
            }
            self.ctx.store.delete_clip(&clip.id).await?;
        }

        self.ctx.store.update_video_score(video_id, None).await?;
        self.ctx
            .store
            .update_video_status(video_id, VideoStatus::Uploaded)
            .await?;

        info!(
            "Reprocessing video {} (removed {} clips, was {})",
            video_id,
            clips.len(),
            video.status
        );
        self.executor
            .spawn(video_id.clone(), source, "reprocess")
            .await
    }

    async fn reprocess_lock(&self, video_id: &VideoId) -> Arc<Mutex<()>> {
        let mut locks = self.reprocess_locks.lock().await;
        Arc::clone(locks.entry(video_id.clone()).or_default())
    }

    /// A video together with its clips.
    pub async fn get_video_view(&self, video_id: &VideoId) -> WorkerResult<VideoView> {
        let video = self
            .ctx
            .store
            .get_video(video_id)
            .await?
            .ok_or_else(|| WorkerError::NotFound(video_id.clone()))?;
        let clips = self.ctx.store.get_clips(video_id).await?;
        Ok(VideoView { video, clips })
    }

    /// All videos, oldest first.
    pub async fn list_videos(&self) -> WorkerResult<Vec<Video>> {
        Ok(self.ctx.store.get_videos().await?)
    }

    /// Stop the running pipeline for a video; it ends in `error`.
    pub async fn cancel_video(&self, video_id: &VideoId) -> bool {
        self.executor.cancel(video_id).await
    }

    /// Wait for the pipeline of one video to finish.
    pub async fn wait_for(&self, video_id: &VideoId) {
        self.executor.wait(video_id).await
    }

    /// Wait for all scheduled pipelines to finish.
    pub async fn wait_all(&self) {
        self.executor.wait_all().await
    }

    pub async fn shutdown(&self) {
        self.executor.shutdown().await
    }
}
