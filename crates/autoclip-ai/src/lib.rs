//! Transcription and virality scoring for the clip pipeline.
//!
//! Each capability has an oracle implementation (an OpenAI-compatible HTTP
//! API) and a deterministic local one. The `TranscriptionService` and
//! `FallbackScorer` compositions pick the oracle when it is configured and
//! fall back per call when it fails.

pub mod client;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod score;
pub mod transcribe;

pub use client::OracleClient;
pub use config::OracleConfig;
pub use error::{AiError, AiResult};
pub use heuristic::{heuristic_score, heuristic_summary, HeuristicScorer};
pub use score::{FallbackScorer, ViralityScorer};
pub use transcribe::{SyntheticTranscriber, Transcriber, TranscriptSource, TranscriptionService};
