//! Core type definitions for book transcription jobs

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage for a book job.
///
/// Stages advance strictly forward; a job never regresses except by
/// deleting its state record out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Downloading,
    Converting,
    Transcribing,
    Done,
}

impl Stage {
    /// The stage that follows a successful execution of this one.
    /// `Done` is terminal.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Downloading => Some(Stage::Converting),
            Stage::Converting => Some(Stage::Transcribing),
            Stage::Transcribing => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    /// The stage label used in state records, events, and logging.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Downloading => "downloading",
            Stage::Converting => "converting",
            Stage::Transcribing => "transcribing",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Durable job state for one book (`state.json`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobState {
    #[serde(default)]
    pub stage: Stage,
    /// Last known segment count, recorded when transcription completes.
    #[serde(default)]
    pub last_segment: usize,
    /// Which transcription model produced the segments. Informational;
    /// not validated against the segments file on resume.
    #[serde(default)]
    pub model: String,
    /// SHA-256 hex digests keyed by content label (`audio_original`,
    /// `audio_wav`). An integrity record, not re-verified before resume.
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

/// One timestamped unit of transcribed text.
///
/// Within a [`SegmentsFile`], segments are in non-decreasing `start`
/// order. `end` may overlap the next segment's `start` slightly where
/// chunk stitching was imperfect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// The persisted transcript for one book (`segments.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentsFile {
    pub model: String,
    pub audio_file: String,
    /// Fixed at first creation; never updated on resume.
    pub created_at: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl SegmentsFile {
    /// Start a fresh transcript with a creation timestamp of now.
    pub fn new(model: impl Into<String>, audio_file: impl Into<String>) -> Self {
        SegmentsFile {
            model: model.into(),
            audio_file: audio_file.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            segments: Vec::new(),
        }
    }

    /// End time of the last durably recorded segment; work below this
    /// offset is already covered.
    pub fn resume_offset(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }
}

/// One phrase-search hit, with its surrounding context window.
/// Derived by the search engine; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch {
    pub timestamp_start: f64,
    pub timestamp_end: f64,
    /// Index of the first segment the match touches.
    pub match_start: usize,
    /// Index of the last segment the match touches (may differ from
    /// `match_start` when the phrase spans a segment boundary).
    pub match_end: usize,
    /// Index of the first context segment.
    pub context_start: usize,
    pub context: Vec<Segment>,
}

/// Feed metadata captured at registration (`feed.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedInfo {
    pub title: String,
    pub audio_url: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub item: FeedItem,
}

/// The feed item the audio enclosure was found on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub published: String,
}

/// Format a second offset as `HH:MM:SS` for display and transcripts.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
