//! Error taxonomy shared across the workspace

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the stores, the pipeline, and its collaborators.
#[derive(Error, Debug)]
pub enum Error {
    /// Disk or network failure. Fatal to the current run; rerunning the
    /// pipeline resumes from the last checkpoint.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An existing record on disk cannot be parsed. Fatal; no auto-repair.
    #[error("corrupt record {path}: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// An external tool or model returned non-success. Aborts the run
    /// without advancing the job's stage.
    #[error("{name}: {message}")]
    Collaborator { name: &'static str, message: String },

    /// A requested book, feed, or transcript does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Shorthand for a collaborator failure.
    pub fn collaborator(name: &'static str, message: impl Into<String>) -> Self {
        Error::Collaborator {
            name,
            message: message.into(),
        }
    }
}
