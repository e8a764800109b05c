//! Validating clip extraction.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use autoclip_models::{adjust_clip_boundaries, ClipBounds, PipelineConfig};

use crate::error::MediaResult;
use crate::fs_utils::{ensure_output_written, PartialOutput};
use crate::toolkit::{ClipCutter, MediaProbe};

/// Cuts clips after re-probing the source and re-validating the window.
///
/// The caller's boundaries are not trusted: the source duration is read
/// again and the window is passed through the boundary adjuster before
/// anything is encoded. No retries are performed.
#[derive(Clone)]
pub struct ClipExtractor {
    probe: Arc<dyn MediaProbe>,
    cutter: Arc<dyn ClipCutter>,
    config: PipelineConfig,
}

impl ClipExtractor {
    pub fn new(probe: Arc<dyn MediaProbe>, cutter: Arc<dyn ClipCutter>, config: PipelineConfig) -> Self {
        Self {
            probe,
            cutter,
            config,
        }
    }

    /// Cut `[start, end)` of `source` into `output`.
    ///
    /// Returns the window that was actually encoded.
    pub async fn extract(
        &self,
        source: &Path,
        start: f64,
        end: f64,
        output: &Path,
    ) -> MediaResult<ClipBounds> {
        let info = self.probe.probe(source).await?;
        let bounds = adjust_clip_boundaries(start, end, info.duration, &self.config)?;

        if (bounds.start - start).abs() > f64::EPSILON || (bounds.end - end).abs() > f64::EPSILON {
            debug!(
                "Clip window re-adjusted: {:.3}-{:.3} -> {:.3}-{:.3} (source {:.3}s)",
                start, end, bounds.start, bounds.end, info.duration
            );
        }

        // Removes the output on failure, and when this future is dropped mid-cut.
        let partial = PartialOutput::new(output);
        let path = self.cutter.cut_clip(source, bounds.start, bounds.end, output).await?;
        ensure_output_written(&path).await?;
        partial.keep();

        Ok(bounds)
    }
}
