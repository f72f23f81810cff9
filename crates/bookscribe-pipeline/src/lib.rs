//! bookscribe-pipeline - the resumable stage pipeline and its collaborators
//!
//! Drives one book through download → convert → transcribe → done with a
//! checkpoint after every completed stage, chunked transcription with
//! mid-file resume, and the boundary collaborators: resumable HTTP
//! download, ffmpeg conversion/probing/extraction, whisper.cpp
//! transcription, and RSS feed parsing.

pub mod checksum;
pub mod chunker;
pub mod config;
pub mod download;
pub mod feed;
pub mod library;
pub mod media;
pub mod pipeline;
pub mod progress;
pub mod whisper;

pub use chunker::ChunkedTranscriber;
pub use config::Settings;
pub use download::{Downloader, HttpDownloader};
pub use library::Library;
pub use media::{ClipExtractor, Converter, DurationProbe, FfmpegAudio};
pub use pipeline::StagePipeline;
pub use progress::{NullSink, ProgressEvent, ProgressSink};
pub use whisper::{RawSegment, Transcriber, WhisperCli};
