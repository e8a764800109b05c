//! Shared fixtures for worker integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use autoclip_ai::{FallbackScorer, TranscriptionService};
use autoclip_media::{AudioExtractor, ClipCutter, MediaProbe, MediaResult, VideoInfo};
use autoclip_models::PipelineConfig;
use autoclip_store::{MemoryStore, VideoStore};
use autoclip_worker::{ClipService, MediaCapabilities, PipelineContext, WorkerConfig};

pub struct StaticProbe(pub f64);

#[async_trait]
impl MediaProbe for StaticProbe {
    async fn probe(&self, _path: &Path) -> MediaResult<VideoInfo> {
        Ok(VideoInfo {
            duration: self.0,
            width: 1280,
            height: 720,
            fps: 25.0,
            codec: "h264".to_string(),
        })
    }
}

pub struct CopyAudio;

#[async_trait]
impl AudioExtractor for CopyAudio {
    async fn extract_audio(&self, _source: &Path, output: &Path) -> MediaResult<PathBuf> {
        touch(output).await?;
        Ok(output.to_path_buf())
    }
}

/// Writes a placeholder file per clip and counts calls.
#[derive(Default)]
pub struct TouchCutter {
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

#[async_trait]
impl ClipCutter for TouchCutter {
    async fn cut_clip(
        &self,
        _source: &Path,
        _start: f64,
        _end: f64,
        output: &Path,
    ) -> MediaResult<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        touch(output).await?;
        Ok(output.to_path_buf())
    }
}

async fn touch(path: &Path) -> MediaResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, b"data").await?;
    Ok(())
}

pub struct Harness {
    pub temp: TempDir,
    pub store: Arc<MemoryStore>,
    pub cutter: Arc<TouchCutter>,
    pub service: ClipService,
}

impl Harness {
    pub fn worker_config(root: &Path) -> WorkerConfig {
        WorkerConfig {
            work_dir: root.join("uploads"),
            clips_dir: root.join("public/clips"),
            ..WorkerConfig::default()
        }
    }

    /// Service over fake media, with the given AI services.
    pub fn build(
        duration: f64,
        cutter: TouchCutter,
        transcription: TranscriptionService,
        scorer: FallbackScorer,
        pipeline: PipelineConfig,
    ) -> Self {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let cutter = Arc::new(cutter);
        let store_dyn: Arc<dyn VideoStore> = store.clone();

        let ctx = PipelineContext::new(
            store_dyn,
            MediaCapabilities {
                probe: Arc::new(StaticProbe(duration)),
                audio: Arc::new(CopyAudio),
                cutter: cutter.clone(),
            },
            transcription,
            scorer,
            pipeline,
            Self::worker_config(temp.path()),
        );

        Self {
            temp,
            store,
            cutter,
            service: ClipService::new(ctx),
        }
    }

    /// Offline service: synthetic transcripts and heuristic scores.
    pub fn offline(duration: f64) -> Self {
        Self::build(
            duration,
            TouchCutter::default(),
            TranscriptionService::synthetic(),
            FallbackScorer::heuristic(),
            PipelineConfig::default().with_min_score(0.0),
        )
    }

    /// Write a placeholder source file and return its path.
    pub async fn source(&self, name: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        tokio::fs::write(&path, b"source").await.unwrap();
        path
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.temp.path().join("public/clips")
    }
}
