//! Transcript analysis: grouping segments into candidate chunks and
//! picking which scored chunks become clips.

pub mod chunker;
pub mod selection;

pub use chunker::build_chunks;
pub use selection::select_top_chunks;
