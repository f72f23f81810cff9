//! Transcript segment persistence
//!
//! One `segments.json` per book, append-grown by the transcription
//! controller and read-only to search. Saves go through the same
//! temp-write-then-rename discipline as the checkpoint store, so a
//! concurrent reader never observes a partially written transcript.

use std::path::{Path, PathBuf};

use crate::atomic;
use crate::error::Result;
use crate::types::SegmentsFile;

const SEGMENTS_FILE: &str = "segments.json";

pub struct SegmentStore {
    path: PathBuf,
}

impl SegmentStore {
    pub fn new(book_dir: &Path) -> Self {
        SegmentStore {
            path: book_dir.join(SEGMENTS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the transcript if one exists. Absence is not an error.
    pub fn load(&self) -> Result<Option<SegmentsFile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        atomic::read_json(&self.path).map(Some)
    }

    /// Atomically persist the full transcript.
    pub fn save(&self, file: &SegmentsFile) -> Result<()> {
        atomic::write_json(&self.path, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Segment;

    #[test]
    fn absent_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SegmentStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SegmentStore::new(dir.path());

        let mut file = SegmentsFile::new("large-v3-turbo", "book.wav");
        file.segments.push(Segment {
            start: 0.0,
            end: 2.0,
            text: "the cat".into(),
        });
        store.save(&file).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, file);
    }

    #[test]
    fn created_at_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = SegmentStore::new(dir.path());

        let file = SegmentsFile::new("tiny", "book.wav");
        let created_at = file.created_at.clone();
        store.save(&file).unwrap();

        let mut loaded = store.load().unwrap().unwrap();
        loaded.segments.push(Segment {
            start: 0.0,
            end: 1.0,
            text: "more".into(),
        });
        store.save(&loaded).unwrap();

        assert_eq!(store.load().unwrap().unwrap().created_at, created_at);
    }

    #[test]
    fn corrupt_transcript_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("segments.json"), "[1, 2").unwrap();

        let store = SegmentStore::new(dir.path());
        assert!(matches!(
            store.load().unwrap_err(),
            Error::CorruptState { .. }
        ));
    }
}
