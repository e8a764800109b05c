//! FFmpeg CLI wrapper for the clip pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Timeouts, and kill-on-drop for cancelled runs
//! - Probing, audio extraction and clip cutting behind capability traits
//! - A validating [`ClipExtractor`]

pub mod audio;
pub mod command;
pub mod cut;
pub mod error;
pub mod extractor;
pub mod fs_utils;
pub mod probe;
pub mod progress;
pub mod toolkit;

pub use audio::extract_audio;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use cut::cut_clip;
pub use error::{MediaError, MediaResult};
pub use extractor::ClipExtractor;
pub use fs_utils::remove_file_if_exists;
pub use probe::{get_duration, probe_video, VideoInfo};
pub use progress::FfmpegProgress;
pub use toolkit::{AudioExtractor, ClipCutter, FfmpegToolkit, MediaProbe};
