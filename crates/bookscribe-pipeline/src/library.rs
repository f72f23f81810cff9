//! Per-book directory layout and listing

use std::fs;
use std::path::{Path, PathBuf};

use bookscribe_core::{CheckpointStore, Result, Stage};

/// Characters stripped from titles before use as directory names.
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

const MAX_TITLE_LEN: usize = 120;

/// A registered book and the stage its job has reached.
#[derive(Debug, Clone, PartialEq)]
pub struct BookEntry {
    pub title: String,
    pub stage: Stage,
}

/// The on-disk collection of books under one data directory.
pub struct Library {
    data_dir: PathBuf,
}

impl Library {
    pub fn new(data_dir: PathBuf) -> Self {
        Library { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding all state for one book.
    pub fn book_dir(&self, title: &str) -> PathBuf {
        self.data_dir.join(sanitize_title(title))
    }

    /// All registered books with their current stage, in name order.
    /// A missing data directory just means no books yet.
    pub fn list_books(&self) -> Result<Vec<BookEntry>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut dirs: Vec<PathBuf> = fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let title = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let state = CheckpointStore::new(&dir).load()?;
            entries.push(BookEntry {
                title,
                stage: state.stage,
            });
        }
        Ok(entries)
    }
}

/// Make a title safe to use as a directory name.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title.chars().filter(|c| !FORBIDDEN.contains(c)).collect();
    let trimmed = cleaned.trim();
    trimmed.chars().take(MAX_TITLE_LEN).collect()
}
