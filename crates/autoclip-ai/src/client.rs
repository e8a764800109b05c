//! OpenAI-compatible oracle HTTP client.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use autoclip_models::{Transcript, TranscriptSegment, ViralityScore};

use crate::config::OracleConfig;
use crate::error::{AiError, AiResult};

/// Rubric sent as the system prompt for every scoring request.
pub const SCORING_SYSTEM_PROMPT: &str = "You are an expert at analyzing video content for social media virality.
Rate the virality potential of video segments on a scale of 0-100 based on:
- Emotional impact and hook potential
- Information value and uniqueness
- Shareability and relatability
- Entertainment value
- Call-to-action or cliffhanger elements

Return JSON: { \"score\": number (0-100), \"summary\": \"one sentence describing the key moment\" }";

/// Whisper `verbose_json` response.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<TranscriptionSegment>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionSegment {
    start: f64,
    end: f64,
    text: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// JSON object the scoring model is asked to return.
#[derive(Debug, Deserialize)]
struct ScorePayload {
    score: Option<f64>,
    summary: Option<String>,
}

/// Client for an OpenAI-compatible transcription and chat API.
pub struct OracleClient {
    http: Client,
    config: OracleConfig,
}

impl OracleClient {
    pub fn new(config: OracleConfig) -> AiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables; `Ok(None)` when no key is configured.
    pub fn from_env() -> AiResult<Option<Self>> {
        OracleConfig::from_env().map(Self::new).transpose()
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Transcribe an audio file into time-coded segments.
    pub async fn transcribe_file(&self, audio_path: &Path) -> AiResult<Transcript> {
        let url = format!("{}/audio/transcriptions", self.config.base_url);
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());

        debug!("Sending {} bytes of audio to {}", bytes.len(), url);

        let file = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;
        let form = Form::new()
            .text("model", self.config.transcription_model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .part("file", file);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let body: TranscriptionResponse = check_status(response).await?.json().await?;

        let segments: Vec<TranscriptSegment> = body
            .segments
            .into_iter()
            .map(|s| TranscriptSegment::new(s.start, s.end, s.text.trim()))
            .collect();

        let mut transcript = Transcript::from_segments(segments);
        if !body.text.trim().is_empty() {
            transcript.full_text = body.text.trim().to_string();
        }
        Ok(transcript)
    }

    /// Ask the scoring model to rate one transcript window.
    pub async fn score_text(&self, text: &str, duration: f64) -> AiResult<ViralityScore> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = ChatRequest {
            model: &self.config.scoring_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SCORING_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Duration: {:.1}s\n\nTranscript:\n{}", duration, text),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let chat: ChatResponse = check_status(response).await?.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::invalid_response("completion has no content"))?;

        parse_score_payload(&content)
    }
}

/// Turn non-2xx responses into [`AiError::Http`].
async fn check_status(response: Response) -> AiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AiError::Http {
        status: status.as_u16(),
        body,
    })
}

/// Decode the model's JSON answer, clamping the score into `[0, 100]`.
fn parse_score_payload(content: &str) -> AiResult<ViralityScore> {
    let payload: ScorePayload = serde_json::from_str(content)?;

    let score = payload
        .score
        .filter(|s| s.is_finite())
        .ok_or_else(|| AiError::invalid_response("missing score"))?;
    let summary = payload
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AiError::invalid_response("missing summary"))?;

    Ok(ViralityScore {
        score: score.clamp(0.0, 100.0),
        summary,
    })
}
