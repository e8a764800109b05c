//! Raw clip cutting.
//!
//! Re-encodes a `[start, end)` window of the source with the clip encode
//! profile. Boundaries are taken as given; see [`crate::ClipExtractor`] for
//! the validating wrapper.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use autoclip_models::ClipEncoding;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{ensure_output_written, ensure_parent_dir, remove_file_if_exists};

/// Build the FFmpeg command for one clip.
pub fn cut_command(
    input: &Path,
    output: &Path,
    start: f64,
    end: f64,
    encoding: &ClipEncoding,
) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .seek(start)
        .duration(end - start)
        .output_args(encoding.to_ffmpeg_args())
}

/// Cut and encode one clip, removing any partial output on failure.
pub async fn cut_clip(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    start: f64,
    end: f64,
    encoding: &ClipEncoding,
) -> MediaResult<PathBuf> {
    let input = input.as_ref();
    let output = output.as_ref();

    if start < 0.0 || end <= start {
        return Err(MediaError::internal(format!(
            "refusing to cut empty range {:.3}s..{:.3}s",
            start, end
        )));
    }

    let duration = end - start;
    info!(
        "Cutting clip: {} -> {} ({:.2}s - {:.2}s, {:.2}s)",
        input.display(),
        output.display(),
        start,
        end,
        duration
    );

    ensure_parent_dir(output).await?;

    let cmd = cut_command(input, output, start, end, encoding);
    let output_name = output.display().to_string();
    let run = runner
        .run_with_progress(&cmd, move |p| {
            debug!("Clip {}: {:.1}%", output_name, p.percentage(duration));
        })
        .await;

    let verified = match run {
        Ok(()) => ensure_output_written(output).await,
        Err(e) => Err(e),
    };

    match verified {
        Ok(size) => {
            info!("Clip created: {} ({:.2} MB)", output.display(), size as f64 / 1024.0 / 1024.0);
            Ok(output.to_path_buf())
        }
        Err(e) => {
            if let Err(cleanup) = remove_file_if_exists(output).await {
                warn!("Failed to clean up partial clip {}: {}", output.display(), cleanup);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_command_uses_clip_profile() {
        let cmd = cut_command(
            Path::new("source.mp4"),
            Path::new("clip-v1-0.mp4"),
            12.5,
            42.5,
            &ClipEncoding::default(),
        );
        let args = cmd.build_args();

        assert!(args.windows(2).any(|w| w[0] == "-ss" && w[1] == "12.500"));
        assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == "30.000"));
        assert!(args.windows(2).any(|w| w[0] == "-crf" && w[1] == "23"));
        assert!(args.windows(2).any(|w| w[0] == "-movflags" && w[1] == "+faststart"));
    }

    #[tokio::test]
    async fn test_cut_rejects_empty_range() {
        let result = cut_clip(
            &FfmpegRunner::new(),
            "source.mp4",
            "out.mp4",
            10.0,
            10.0,
            &ClipEncoding::default(),
        )
        .await;
        assert!(matches!(result, Err(MediaError::Internal(_))));
    }
}
