//! Virality scoring with heuristic fallback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use autoclip_models::{ClipChunk, ScoreSource, ScoredChunk, ViralityScore};

use crate::client::OracleClient;
use crate::error::AiResult;
use crate::heuristic::HeuristicScorer;

/// Scores a transcript window for social engagement potential.
#[async_trait]
pub trait ViralityScorer: Send + Sync {
    /// Score `text` (spanning `duration` seconds) in `[0, 100]` with a one-line summary.
    async fn score(&self, text: &str, duration: f64) -> AiResult<ViralityScore>;

    fn name(&self) -> &'static str;
}

#[async_trait]
impl ViralityScorer for OracleClient {
    async fn score(&self, text: &str, duration: f64) -> AiResult<ViralityScore> {
        self.score_text(text, duration).await
    }

    fn name(&self) -> &'static str {
        "oracle"
    }
}

/// Oracle scorer when available, heuristic otherwise or on any failure.
///
/// Never fails: every chunk comes back scored.
#[derive(Clone)]
pub struct FallbackScorer {
    primary: Option<Arc<dyn ViralityScorer>>,
    fallback: HeuristicScorer,
}

impl FallbackScorer {
    pub fn new(primary: Option<Arc<dyn ViralityScorer>>) -> Self {
        Self {
            primary,
            fallback: HeuristicScorer::new(),
        }
    }

    /// Heuristic-only scorer.
    pub fn heuristic() -> Self {
        Self::new(None)
    }

    pub fn has_oracle(&self) -> bool {
        self.primary.is_some()
    }

    /// Score one chunk.
    pub async fn score_chunk(&self, chunk: &ClipChunk) -> ScoredChunk {
        if let Some(primary) = &self.primary {
            match primary.score(&chunk.text, chunk.duration).await {
                Ok(result) => {
                    return ScoredChunk {
                        chunk: chunk.clone(),
                        score: result.score.clamp(0.0, 100.0),
                        summary: result.summary,
                        source: ScoreSource::Oracle,
                    };
                }
                Err(e) => {
                    warn!(
                        chunk_start = chunk.start,
                        retryable = e.is_retryable(),
                        "{} scoring failed, using heuristic: {}",
                        primary.name(),
                        e
                    );
                    metrics::counter!("autoclip_scoring_fallbacks_total").increment(1);
                }
            }
        }

        let result = self.fallback.evaluate(&chunk.text);
        ScoredChunk {
            chunk: chunk.clone(),
            score: result.score,
            summary: result.summary,
            source: ScoreSource::Heuristic,
        }
    }

    /// Score chunks one at a time, in order.
    pub async fn score_all(&self, chunks: &[ClipChunk]) -> Vec<ScoredChunk> {
        let mut scored = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let result = self.score_chunk(chunk).await;
            debug!(
                chunk_start = chunk.start,
                chunk_end = chunk.end,
                score = result.score,
                source = ?result.source,
                "Scored chunk"
            );
            scored.push(result);
        }
        scored
    }
}
