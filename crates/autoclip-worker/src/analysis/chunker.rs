//! Transcript chunking.
//!
//! Walks the segments in order and groups consecutive ones into chunks.
//! Chunks grow until they reach the target length and the last segment
//! ends on a sentence break, and are closed early when the next segment
//! would push them past the maximum.

use tracing::debug;

use autoclip_models::{ClipChunk, PipelineConfig, TranscriptSegment};

/// Whether a segment's text ends a sentence.
fn is_natural_break(text: &str) -> bool {
    text.trim_end().ends_with(['.', '!', '?'])
}

/// Emit a finished chunk.
///
/// Chunks shorter than the minimum are dropped. A chunk made of a single
/// segment longer than the maximum is capped at `start + max`.
fn close_chunk(chunks: &mut Vec<ClipChunk>, mut chunk: ClipChunk, config: &PipelineConfig) {
    if chunk.duration < config.min_clip_secs {
        debug!(
            "Dropping short chunk {:.2}-{:.2} ({:.2}s)",
            chunk.start, chunk.end, chunk.duration
        );
        return;
    }

    if chunk.duration > config.max_clip_secs {
        chunk.end = chunk.start + config.max_clip_secs;
        chunk.duration = config.max_clip_secs;
    }

    chunks.push(chunk);
}

/// Group transcript segments into candidate clip chunks.
///
/// Segments shorter than `min_segment_secs` are ignored. Every emitted
/// chunk lasts between `min_clip_secs` and `max_clip_secs`, chunks are in
/// time order and never overlap.
pub fn build_chunks(segments: &[TranscriptSegment], config: &PipelineConfig) -> Vec<ClipChunk> {
    let mut chunks = Vec::new();
    let mut current: Option<ClipChunk> = None;

    for seg in segments {
        let seg_duration = seg.duration();
        if !seg_duration.is_finite() || seg_duration < config.min_segment_secs {
            continue;
        }

        let Some(chunk) = current.as_mut() else {
            current = Some(ClipChunk::from_segment(seg));
            continue;
        };

        let potential = chunk.duration_with(seg);

        if potential < config.min_clip_secs {
            chunk.extend(seg);
        } else if potential > config.max_clip_secs {
            if let Some(done) = current.take() {
                close_chunk(&mut chunks, done, config);
            }
            current = Some(ClipChunk::from_segment(seg));
        } else if potential >= config.target_clip_secs && is_natural_break(&seg.text) {
            chunk.extend(seg);
            if let Some(done) = current.take() {
                close_chunk(&mut chunks, done, config);
            }
        } else {
            chunk.extend(seg);
        }
    }

    if let Some(last) = current {
        close_chunk(&mut chunks, last, config);
    }

    debug!(
        "Built {} chunks from {} segments",
        chunks.len(),
        segments.len()
    );
    chunks
}
