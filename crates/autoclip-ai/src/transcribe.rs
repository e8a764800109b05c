//! Transcription with a synthetic fallback.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use autoclip_models::{Transcript, TranscriptSegment};

use crate::client::OracleClient;
use crate::error::{AiError, AiResult};

/// Length of each synthetic placeholder segment in seconds.
pub const SYNTHETIC_SEGMENT_SECS: f64 = 8.0;

const PLACEHOLDER_SENTENCES: [&str; 10] = [
    "This section discusses key insights and valuable information.",
    "Here we explore important concepts that viewers find engaging.",
    "This moment captures attention with compelling content.",
    "An interesting perspective is shared here with the audience.",
    "This part reveals surprising details worth highlighting.",
    "Critical information is presented in this segment.",
    "The speaker makes an impactful point in this section.",
    "This clip contains highly shareable content.",
    "A memorable quote or moment occurs here.",
    "This segment demonstrates the main value proposition.",
];

/// Produces ordered, time-coded text from an audio file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> AiResult<Transcript>;

    fn name(&self) -> &'static str;
}

#[async_trait]
impl Transcriber for OracleClient {
    async fn transcribe(&self, audio_path: &Path) -> AiResult<Transcript> {
        self.transcribe_file(audio_path).await
    }

    fn name(&self) -> &'static str {
        "oracle"
    }
}

/// Deterministic placeholder transcript spanning a known duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticTranscriber;

impl SyntheticTranscriber {
    /// Evenly spaced placeholder segments over `[0, duration]`.
    ///
    /// An unknown duration (`<= 0`) yields a canned 30 second transcript.
    pub fn generate(&self, duration: f64) -> Transcript {
        if !duration.is_finite() || duration <= 0.0 {
            return Transcript::from_segments(vec![
                TranscriptSegment::new(0.0, 10.0, "This section contains valuable content."),
                TranscriptSegment::new(10.0, 20.0, "Here we discuss important topics."),
                TranscriptSegment::new(20.0, 30.0, "This moment captures key insights."),
            ]);
        }

        let mut segments = Vec::new();
        let mut current = 0.0;
        while current < duration {
            let end = (current + SYNTHETIC_SEGMENT_SECS).min(duration);
            let text = PLACEHOLDER_SENTENCES[segments.len() % PLACEHOLDER_SENTENCES.len()];
            segments.push(TranscriptSegment::new(current, end, text));
            current = end;
        }

        Transcript::from_segments(segments)
    }
}

/// Which path produced a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    Oracle,
    Synthetic,
}

/// Oracle transcriber when available, synthetic transcript otherwise.
///
/// Transcription failures never surface; they select the fallback.
#[derive(Clone)]
pub struct TranscriptionService {
    primary: Option<Arc<dyn Transcriber>>,
    fallback: SyntheticTranscriber,
}

impl TranscriptionService {
    pub fn new(primary: Option<Arc<dyn Transcriber>>) -> Self {
        Self {
            primary,
            fallback: SyntheticTranscriber,
        }
    }

    /// Synthetic-only service.
    pub fn synthetic() -> Self {
        Self::new(None)
    }

    /// Transcribe `audio_path`; `source_duration` sizes the fallback.
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        source_duration: f64,
    ) -> (Transcript, TranscriptSource) {
        let Some(primary) = &self.primary else {
            info!("No transcription oracle configured, using synthetic transcript");
            return (self.fallback.generate(source_duration), TranscriptSource::Synthetic);
        };

        let outcome = match primary.transcribe(audio_path).await {
            Ok(transcript) if transcript.is_empty() => {
                Err(AiError::invalid_response("transcription returned no segments"))
            }
            other => other,
        };

        match outcome {
            Ok(transcript) => {
                info!("Transcribed {} segments", transcript.segments.len());
                (transcript, TranscriptSource::Oracle)
            }
            Err(e) => {
                warn!(
                    retryable = e.is_retryable(),
                    "{} transcription failed, using synthetic transcript: {}",
                    primary.name(),
                    e
                );
                metrics::counter!("autoclip_transcription_fallbacks_total").increment(1);
                (self.fallback.generate(source_duration), TranscriptSource::Synthetic)
            }
        }
    }
}
