//! Selection of scored chunks worth cutting.

use autoclip_models::{PipelineConfig, ScoredChunk};

/// Keep chunks scoring at least the threshold, best first, capped at
/// `max_clips`.
///
/// Equal scores keep the earlier chunk first.
pub fn select_top_chunks(mut scored: Vec<ScoredChunk>, config: &PipelineConfig) -> Vec<ScoredChunk> {
    scored.retain(|c| c.score >= config.min_score_threshold);
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.chunk.start.total_cmp(&b.chunk.start))
    });
    scored.truncate(config.max_clips);
    scored
}
