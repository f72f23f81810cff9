//! Settings with documented defaults and an optional config-file override
//!
//! Configuration is loaded once at the boundary and passed explicitly into
//! component constructors; nothing reads ambient global state. The config
//! file lives in the platform config directory:
//! - Linux: `~/.config/bookscribe/config.json`
//! - macOS: `~/Library/Application Support/bookscribe/config.json`
//! - Windows: `%APPDATA%\bookscribe\config.json`

use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use bookscribe_core::{atomic, Error, Result};

fn default_model() -> String {
    "large-v3-turbo".to_string()
}

fn default_whisper_path() -> String {
    "whisper-cli".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whisper model identifier; the model file is
    /// `<model_dir>/ggml-<model>.bin`.
    pub model: String,
    /// Directory holding model files. Defaults to `models/` under the
    /// platform data directory.
    pub model_dir: Option<PathBuf>,
    pub whisper_path: String,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Target sample rate for normalized WAV output.
    pub sample_rate: u32,
    pub language: String,
    /// Root directory for per-book state. Defaults to `books/` under the
    /// platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            model: default_model(),
            model_dir: None,
            whisper_path: default_whisper_path(),
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            sample_rate: default_sample_rate(),
            language: default_language(),
            data_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from the default config path, falling back to the
    /// documented defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&project_dirs()?.config_dir().join("config.json"))
    }

    /// Load settings from a specific file. Missing fields take their
    /// defaults; a malformed file is fatal.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        atomic::read_json(path)
    }

    /// Resolved root directory for per-book state.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().join("books")),
        }
    }

    /// Path to the whisper model file.
    pub fn model_path(&self) -> Result<PathBuf> {
        let dir = match &self.model_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()?.data_dir().join("models"),
        };
        Ok(dir.join(format!("ggml-{}.bin", self.model)))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "bookscribe").ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "could not determine the platform home directory",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.model, "large-v3-turbo");
        assert_eq!(settings.ffmpeg_path, "ffmpeg");
        assert_eq!(settings.sample_rate, 16000);
        assert_eq!(settings.language, "en");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"model": "tiny", "sample_rate": 22050}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.model, "tiny");
        assert_eq!(settings.sample_rate, 22050);
        assert_eq!(settings.ffmpeg_path, "ffmpeg");
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "model = tiny").unwrap();

        assert!(matches!(
            Settings::load_from(&path).unwrap_err(),
            Error::CorruptState { .. }
        ));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let settings = Settings {
            data_dir: Some(PathBuf::from("/tmp/books")),
            ..Settings::default()
        };
        assert_eq!(settings.data_dir().unwrap(), PathBuf::from("/tmp/books"));
    }

    #[test]
    fn model_path_uses_ggml_naming() {
        let settings = Settings {
            model: "tiny".into(),
            model_dir: Some(PathBuf::from("/models")),
            ..Settings::default()
        };
        assert_eq!(
            settings.model_path().unwrap(),
            PathBuf::from("/models/ggml-tiny.bin")
        );
    }
}
