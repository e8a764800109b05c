//! Durable store for the clip pipeline.
//!
//! This crate provides:
//! - The `VideoStore` CRUD interface consumed by the pipeline
//! - An in-memory implementation
//! - A JSON snapshot file implementation

pub mod error;
pub mod repo;
mod state;

pub use error::{StoreError, StoreResult};
pub use repo::{JsonFileStore, MemoryStore, VideoStore};
