//! Encoding profiles for extracted audio and cut clips.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec for clips
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 23;
/// Target video bitrate for clips
pub const DEFAULT_VIDEO_BITRATE: &str = "2000k";
/// Clip audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Clips taller than this are scaled down
pub const DEFAULT_MAX_HEIGHT: u32 = 1080;
/// Output frame rate for clips
pub const DEFAULT_FPS: u32 = 30;

/// Codec used for transcription audio
pub const TRANSCRIPTION_AUDIO_CODEC: &str = "libmp3lame";
/// Sample rate expected by speech-to-text services
pub const TRANSCRIPTION_SAMPLE_RATE: u32 = 16_000;
/// Bitrate for transcription audio
pub const TRANSCRIPTION_AUDIO_BITRATE: &str = "64k";

/// Video encoding settings for cut clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipEncoding {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: String,

    #[serde(default = "default_max_height")]
    pub max_height: u32,

    #[serde(default = "default_fps")]
    pub fps: u32,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Move the moov atom to the front for progressive playback
    #[serde(default = "default_faststart")]
    pub faststart: bool,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_video_bitrate() -> String {
    DEFAULT_VIDEO_BITRATE.to_string()
}
fn default_max_height() -> u32 {
    DEFAULT_MAX_HEIGHT
}
fn default_fps() -> u32 {
    DEFAULT_FPS
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_faststart() -> bool {
    true
}

impl Default for ClipEncoding {
    fn default() -> Self {
        Self {
            codec: default_video_codec(),
            preset: default_preset(),
            crf: DEFAULT_CRF,
            video_bitrate: default_video_bitrate(),
            max_height: DEFAULT_MAX_HEIGHT,
            fps: DEFAULT_FPS,
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            faststart: true,
        }
    }
}

impl ClipEncoding {
    /// Returns a new config with updated CRF.
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// Scale filter that caps height without upscaling and keeps width even.
    pub fn scale_filter(&self) -> String {
        format!("scale=-2:'min({},ih)'", self.max_height)
    }

    /// Convert to FFmpeg output arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-b:v".to_string(),
            self.video_bitrate.clone(),
            "-vf".to_string(),
            self.scale_filter(),
            "-r".to_string(),
            self.fps.to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ];

        if self.faststart {
            args.extend_from_slice(&["-movflags".to_string(), "+faststart".to_string()]);
        }

        args
    }
}

/// Audio settings for the transcription track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AudioEncoding {
    pub codec: String,
    pub channels: u8,
    pub sample_rate: u32,
    pub bitrate: String,
}

impl Default for AudioEncoding {
    fn default() -> Self {
        Self {
            codec: TRANSCRIPTION_AUDIO_CODEC.to_string(),
            channels: 1,
            sample_rate: TRANSCRIPTION_SAMPLE_RATE,
            bitrate: TRANSCRIPTION_AUDIO_BITRATE.to_string(),
        }
    }
}

impl AudioEncoding {
    /// Convert to FFmpeg output arguments (video stream dropped).
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-vn".to_string(),
            "-acodec".to_string(),
            self.codec.clone(),
            "-ac".to_string(),
            self.channels.to_string(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-b:a".to_string(),
            self.bitrate.clone(),
        ]
    }
}
