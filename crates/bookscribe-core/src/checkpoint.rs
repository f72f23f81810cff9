//! Durable job state persisted per book
//!
//! One `state.json` per book directory records the current stage, the
//! last known segment count, the model identifier, and content checksums.
//! The pipeline saves after every stage transition; a missing record means
//! a brand-new job, never an error.

use std::path::{Path, PathBuf};

use crate::atomic;
use crate::error::Result;
use crate::types::JobState;

const STATE_FILE: &str = "state.json";

pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(book_dir: &Path) -> Self {
        CheckpointStore {
            path: book_dir.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the job state, defaulting to a fresh `downloading` job when no
    /// record exists yet.
    pub fn load(&self) -> Result<JobState> {
        if !self.path.exists() {
            return Ok(JobState::default());
        }
        atomic::read_json(&self.path)
    }

    /// Atomically persist the job state.
    pub fn save(&self, state: &JobState) -> Result<()> {
        atomic::write_json(&self.path, state)
    }
}
