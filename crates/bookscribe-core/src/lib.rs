//! bookscribe-core - data model, durable stores, and phrase search
//!
//! This crate holds the types shared across the pipeline and CLI, the two
//! per-book durable records (`state.json` and `segments.json`) with their
//! atomic-replace persistence, and the phrase search engine over a book's
//! segments.

pub mod atomic;
pub mod checkpoint;
pub mod error;
pub mod search;
pub mod segments;
pub mod types;

pub use checkpoint::CheckpointStore;
pub use error::{Error, Result};
pub use segments::SegmentStore;
pub use types::*;
