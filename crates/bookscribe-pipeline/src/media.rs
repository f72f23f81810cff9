//! ffmpeg-based audio collaborators: normalize, probe, clip extraction

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

use bookscribe_core::{Error, Result};

use crate::config::Settings;
use crate::progress::{ProgressEvent, ProgressSink};

pub trait Converter {
    /// Normalize `src` into a mono PCM WAV at `dest`. Idempotent: an
    /// existing destination is assumed complete and skipped.
    fn normalize(&self, src: &Path, dest: &Path, sink: &mut dyn ProgressSink) -> Result<()>;
}

pub trait DurationProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64>;
}

pub trait ClipExtractor {
    /// Extract `[start_secs, start_secs + duration_secs)` of `src` into
    /// an independent clip at `dest`.
    fn extract(&self, src: &Path, dest: &Path, start_secs: f64, duration_secs: f64) -> Result<()>;
}

/// Production implementation backed by the ffmpeg/ffprobe binaries.
pub struct FfmpegAudio {
    ffmpeg: String,
    ffprobe: String,
    sample_rate: u32,
}

impl FfmpegAudio {
    pub fn new(settings: &Settings) -> Self {
        FfmpegAudio {
            ffmpeg: settings.ffmpeg_path.clone(),
            ffprobe: settings.ffprobe_path.clone(),
            sample_rate: settings.sample_rate,
        }
    }
}

impl Converter for FfmpegAudio {
    fn normalize(&self, src: &Path, dest: &Path, sink: &mut dyn ProgressSink) -> Result<()> {
        if dest.exists() {
            tracing::info!(dest = %dest.display(), "normalized audio already exists, skipping");
            return Ok(());
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        // Probe failure here only costs the percentage display.
        let total_secs = self.duration_secs(src).ok();

        let mut child = Command::new(&self.ffmpeg)
            .args(["-v", "error"])
            .arg("-i")
            .arg(src)
            .args(["-ar", &self.sample_rate.to_string()])
            .args(["-ac", "1", "-c:a", "pcm_s16le", "-progress", "pipe:1", "-y"])
            .arg(dest)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::collaborator("ffmpeg", e.to_string()))?;

        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let line = line?;
                if let Some(raw) = line.strip_prefix("out_time_ms=") {
                    if let (Ok(micros), Some(total)) = (raw.trim().parse::<u64>(), total_secs) {
                        if total > 0.0 {
                            let done = micros as f64 / 1_000_000.0;
                            let percent = (done * 100.0 / total).min(100.0) as u8;
                            sink.emit(ProgressEvent::ConvertProgress { percent });
                        }
                    }
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::collaborator("ffmpeg", e.to_string()))?;
        if !output.status.success() {
            // A partial destination must not satisfy the exists-check on
            // the next run.
            let _ = fs::remove_file(dest);
            return Err(Error::collaborator(
                "ffmpeg",
                format!(
                    "exit {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        tracing::info!(dest = %dest.display(), "conversion complete");
        Ok(())
    }
}

impl DurationProbe for FfmpegAudio {
    fn duration_secs(&self, path: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .map_err(|e| Error::collaborator("ffprobe", e.to_string()))?;

        if !output.status.success() {
            return Err(Error::collaborator(
                "ffprobe",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        text.trim().parse::<f64>().map_err(|_| {
            Error::collaborator(
                "ffprobe",
                format!("unparseable duration {:?} for {}", text.trim(), path.display()),
            )
        })
    }
}

impl ClipExtractor for FfmpegAudio {
    fn extract(&self, src: &Path, dest: &Path, start_secs: f64, duration_secs: f64) -> Result<()> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error"])
            .arg("-ss")
            .arg(format!("{:.3}", start_secs))
            .arg("-t")
            .arg(format!("{:.3}", duration_secs))
            .arg("-i")
            .arg(src)
            .args(["-c", "copy", "-y"])
            .arg(dest)
            .output()
            .map_err(|e| Error::collaborator("ffmpeg", e.to_string()))?;

        if !output.status.success() {
            let _ = fs::remove_file(dest);
            return Err(Error::collaborator(
                "ffmpeg",
                format!(
                    "clip extraction at {:.1}s failed: {}",
                    start_secs,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(())
    }
}
