//! Media capabilities consumed by the pipeline.
//!
//! Each capability is a small trait so the pipeline can be driven by fakes
//! in tests; [`FfmpegToolkit`] implements all three on top of the FFmpeg CLI.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use autoclip_models::{AudioEncoding, ClipEncoding};

use crate::audio::extract_audio;
use crate::command::{check_ffmpeg, check_ffprobe, FfmpegRunner};
use crate::cut::cut_clip;
use crate::error::MediaResult;
use crate::probe::{probe_video, VideoInfo};

/// Reads duration, dimensions and codec of a source file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> MediaResult<VideoInfo>;
}

/// Derives a transcription-ready audio file from a source video.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract_audio(&self, source: &Path, output: &Path) -> MediaResult<PathBuf>;
}

/// Encodes `[start, end)` of a source into a delivery-ready clip file.
#[async_trait]
pub trait ClipCutter: Send + Sync {
    async fn cut_clip(&self, source: &Path, start: f64, end: f64, output: &Path)
        -> MediaResult<PathBuf>;
}

/// FFmpeg/FFprobe backed implementation of every media capability.
#[derive(Debug, Clone, Default)]
pub struct FfmpegToolkit {
    clip_encoding: ClipEncoding,
    audio_encoding: AudioEncoding,
    /// Per-invocation time limit for FFmpeg children
    timeout_secs: Option<u64>,
}

impl FfmpegToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify both binaries are on PATH.
    pub fn check_available() -> MediaResult<()> {
        check_ffmpeg()?;
        check_ffprobe()?;
        Ok(())
    }

    pub fn with_clip_encoding(mut self, encoding: ClipEncoding) -> Self {
        self.clip_encoding = encoding;
        self
    }

    pub fn with_audio_encoding(mut self, encoding: AudioEncoding) -> Self {
        self.audio_encoding = encoding;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    fn runner(&self) -> FfmpegRunner {
        match self.timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        }
    }
}

#[async_trait]
impl MediaProbe for FfmpegToolkit {
    async fn probe(&self, path: &Path) -> MediaResult<VideoInfo> {
        probe_video(path).await
    }
}

#[async_trait]
impl AudioExtractor for FfmpegToolkit {
    async fn extract_audio(&self, source: &Path, output: &Path) -> MediaResult<PathBuf> {
        extract_audio(&self.runner(), source, output, &self.audio_encoding).await
    }
}

#[async_trait]
impl ClipCutter for FfmpegToolkit {
    async fn cut_clip(
        &self,
        source: &Path,
        start: f64,
        end: f64,
        output: &Path,
    ) -> MediaResult<PathBuf> {
        cut_clip(&self.runner(), source, output, start, end, &self.clip_encoding).await
    }
}
