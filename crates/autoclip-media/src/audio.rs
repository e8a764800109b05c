//! Transcription audio extraction.

use std::path::{Path, PathBuf};
use tracing::info;

use autoclip_models::AudioEncoding;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::fs_utils::{ensure_output_written, ensure_parent_dir, remove_file_if_exists};

/// Build the FFmpeg command that strips video and writes speech-ready audio.
pub fn audio_command(input: &Path, output: &Path, encoding: &AudioEncoding) -> FfmpegCommand {
    FfmpegCommand::new(input, output).output_args(encoding.to_ffmpeg_args())
}

/// Extract a mono, low-bitrate audio track suitable for speech-to-text.
pub async fn extract_audio(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &AudioEncoding,
) -> MediaResult<PathBuf> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!("Extracting audio: {} -> {}", input.display(), output.display());

    ensure_parent_dir(output).await?;

    let cmd = audio_command(input, output, encoding);
    if let Err(e) = runner.run(&cmd).await {
        let _ = remove_file_if_exists(output).await;
        return Err(e);
    }

    let size = ensure_output_written(output).await?;
    info!("Audio extracted: {} ({} bytes)", output.display(), size);

    Ok(output.to_path_buf())
}
