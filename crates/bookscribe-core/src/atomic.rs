//! Atomic JSON persistence shared by the durable stores
//!
//! Every record is written to a `.tmp` sibling and renamed into place, so
//! a crash mid-write never leaves a partial file and concurrent readers
//! only ever observe a complete record.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read and parse a JSON record. A malformed record is a fatal
/// [`Error::CorruptState`]; absence must be handled by the caller.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| Error::CorruptState {
        path: path.to_path_buf(),
        source,
    })
}
