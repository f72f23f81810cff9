//! Resumable HTTP audio download
//!
//! A partially written destination is continued with a byte-range request.
//! Servers that ignore the range (200) restart the file; 416 means the
//! destination already holds the complete download.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::RANGE;
use reqwest::StatusCode;

use bookscribe_core::{Error, Result};

use crate::progress::{ProgressEvent, ProgressSink};

const READ_BUFFER_BYTES: usize = 1 << 20;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub trait Downloader {
    /// Retrieve `url` into `dest`, continuing any partial download.
    /// Idempotent: a complete destination is a no-op.
    fn fetch(&self, url: &str, dest: &Path, sink: &mut dyn ProgressSink) -> Result<()>;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::collaborator("download", e.to_string()))?;
        Ok(HttpDownloader { client })
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Path, sink: &mut dyn ProgressSink) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let existing = dest.metadata().map(|m| m.len()).unwrap_or(0);
        let mut request = self.client.get(url);
        if existing > 0 {
            request = request.header(RANGE, format!("bytes={}-", existing));
            sink.emit(ProgressEvent::DownloadResumed { offset: existing });
        }

        let mut response = request
            .send()
            .map_err(|e| Error::collaborator("download", e.to_string()))?;
        let status = response.status();

        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            tracing::info!(dest = %dest.display(), "download already complete");
            return Ok(());
        }

        let (mut file, mut downloaded) = if status == StatusCode::PARTIAL_CONTENT {
            (OpenOptions::new().append(true).open(dest)?, existing)
        } else if status.is_success() {
            if existing > 0 {
                tracing::warn!("server ignored range request, restarting download");
            }
            (File::create(dest)?, 0)
        } else {
            return Err(Error::collaborator(
                "download",
                format!("HTTP {} from {}", status, url),
            ));
        };

        let total = response.content_length().map(|len| len + downloaded);

        let mut buffer = vec![0u8; READ_BUFFER_BYTES];
        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|e| Error::collaborator("download", e.to_string()))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])?;
            downloaded += read as u64;
            sink.emit(ProgressEvent::DownloadProgress { downloaded, total });
        }
        file.flush()?;

        tracing::info!(dest = %dest.display(), bytes = downloaded, "download complete");
        Ok(())
    }
}
