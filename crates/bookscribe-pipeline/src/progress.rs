//! Progress events emitted by pipeline components
//!
//! Components report progress through a sink instead of printing; the CLI
//! decides how (and whether) to render each event.

use bookscribe_core::Stage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    StageStarted {
        stage: Stage,
    },
    StageCompleted {
        stage: Stage,
    },
    /// A partially written destination is being continued from `offset`.
    DownloadResumed {
        offset: u64,
    },
    DownloadProgress {
        downloaded: u64,
        total: Option<u64>,
    },
    ConvertProgress {
        percent: u8,
    },
    ChunkStarted {
        index: usize,
        count: usize,
    },
    ChunkCompleted {
        index: usize,
        count: usize,
        total_segments: usize,
    },
    /// An incremental transcript save happened mid-chunk.
    SegmentsSaved {
        total_segments: usize,
        latest_end: f64,
    },
}

pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: ProgressEvent) {}
}
