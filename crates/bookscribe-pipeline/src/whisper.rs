//! whisper.cpp transcription collaborator
//!
//! The model is an opaque external process: it is handed one bounded
//! audio clip and returns ordered, clip-relative segments. The production
//! implementation shells out to the whisper.cpp CLI with JSON output and
//! parses its millisecond offsets.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use bookscribe_core::{Error, Result};

use crate::config::Settings;

/// One clip-relative transcription entry, times starting at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

pub trait Transcriber {
    fn transcribe(&self, clip: &Path) -> Result<Vec<RawSegment>>;
}

pub struct WhisperCli {
    binary: String,
    model_path: PathBuf,
    language: String,
}

impl WhisperCli {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(WhisperCli {
            binary: settings.whisper_path.clone(),
            model_path: settings.model_path()?,
            language: settings.language.clone(),
        })
    }
}

impl Transcriber for WhisperCli {
    fn transcribe(&self, clip: &Path) -> Result<Vec<RawSegment>> {
        let out_prefix = clip.with_extension("");

        let output = Command::new(&self.binary)
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(clip)
            .arg("-l")
            .arg(&self.language)
            .args(["-oj", "-np"])
            .arg("-of")
            .arg(&out_prefix)
            .output()
            .map_err(|e| Error::collaborator("whisper", e.to_string()))?;

        if !output.status.success() {
            return Err(Error::collaborator(
                "whisper",
                format!(
                    "exit {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let json_path = out_prefix.with_extension("json");
        let raw = fs::read_to_string(&json_path).map_err(|e| {
            Error::collaborator(
                "whisper",
                format!("missing transcription output {}: {}", json_path.display(), e),
            )
        })?;
        let _ = fs::remove_file(&json_path);

        parse_output(&raw)
    }
}

#[derive(Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    transcription: Vec<WhisperEntry>,
}

#[derive(Deserialize)]
struct WhisperEntry {
    offsets: WhisperOffsets,
    text: String,
}

#[derive(Deserialize)]
struct WhisperOffsets {
    from: u64,
    to: u64,
}

/// Parse the whisper.cpp JSON document into ordered clip-relative
/// segments, dropping empty text and noise markers.
fn parse_output(raw: &str) -> Result<Vec<RawSegment>> {
    let parsed: WhisperOutput = serde_json::from_str(raw).map_err(|e| {
        Error::collaborator("whisper", format!("unparseable transcription output: {}", e))
    })?;

    Ok(parsed
        .transcription
        .into_iter()
        .filter_map(|entry| {
            let text = entry.text.trim();
            if text.is_empty() || is_noise_marker(text) {
                return None;
            }
            Some(RawSegment {
                start: entry.offsets.from as f64 / 1000.0,
                end: entry.offsets.to as f64 / 1000.0,
                text: text.to_string(),
            })
        })
        .collect())
}

/// Bracketed non-speech annotations emitted by whisper models.
fn is_noise_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ["[blank_audio]", "[inaudible]", "[silence]", "[music]", "[applause]", "[laughter]"]
        .iter()
        .any(|marker| lowered.contains(marker))
}
