//! Video-to-clips pipeline worker.
//!
//! This crate provides:
//! - Transcript chunking and candidate selection
//! - The per-video pipeline orchestrator
//! - A task executor with per-video cancellation and time boxing
//! - `ClipService`, the surface consumed by the transport layer

pub mod analysis;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pipeline;
pub mod service;

#[cfg(test)]
mod test_support;

pub use analysis::{build_chunks, select_top_chunks};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::PipelineExecutor;
pub use logging::PipelineLogger;
pub use pipeline::{MediaCapabilities, PipelineContext, PipelineSummary};
pub use service::ClipService;
