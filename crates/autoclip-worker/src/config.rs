//! Worker configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use autoclip_models::{clip_file_name, VideoId};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory for temporary audio files
    pub work_dir: PathBuf,
    /// Directory clip files are written to
    pub clips_dir: PathBuf,
    /// URL prefix under which `clips_dir` is served
    pub clips_url_prefix: String,
    /// Maximum pipelines running at once; further runs wait in `uploaded`
    pub max_concurrent_pipelines: usize,
    /// Time box for a whole pipeline run (unset = no limit)
    pub pipeline_timeout: Option<Duration>,
    /// Time limit for a single FFmpeg invocation (unset = no limit)
    pub ffmpeg_timeout: Option<Duration>,
    /// JSON store file; in-memory store when unset
    pub store_path: Option<PathBuf>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("uploads"),
            clips_dir: PathBuf::from("public/clips"),
            clips_url_prefix: "/clips".to_string(),
            max_concurrent_pipelines: 4,
            pipeline_timeout: None,
            ffmpeg_timeout: None,
            store_path: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("WORKER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            clips_dir: std::env::var("WORKER_CLIPS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.clips_dir),
            clips_url_prefix: std::env::var("WORKER_CLIPS_URL_PREFIX")
                .map(|p| p.trim_end_matches('/').to_string())
                .unwrap_or(defaults.clips_url_prefix),
            max_concurrent_pipelines: std::env::var("WORKER_MAX_PIPELINES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent_pipelines),
            pipeline_timeout: std::env::var("WORKER_PIPELINE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            ffmpeg_timeout: std::env::var("WORKER_FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            store_path: std::env::var("WORKER_STORE_PATH").ok().map(PathBuf::from),
        }
    }

    /// Temporary transcription audio for a video.
    pub fn audio_path(&self, video_id: &VideoId) -> PathBuf {
        self.work_dir.join(format!("audio-{}.mp3", video_id))
    }

    /// Filesystem path of the `index`-th clip of a video.
    pub fn clip_path(&self, video_id: &VideoId, index: usize) -> PathBuf {
        self.clips_dir.join(clip_file_name(video_id, index))
    }

    /// Relative location the clip is served under.
    pub fn clip_location(&self, video_id: &VideoId, index: usize) -> String {
        format!("{}/{}", self.clips_url_prefix, clip_file_name(video_id, index))
    }

    /// Map a stored clip location back to its file in `clips_dir`.
    pub fn clip_file_for_location(&self, location: &str) -> Option<PathBuf> {
        let file_name = Path::new(location).file_name()?;
        Some(self.clips_dir.join(file_name))
    }
}
