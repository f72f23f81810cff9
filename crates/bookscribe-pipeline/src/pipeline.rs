//! Stage state machine driving one book through the pipeline
//!
//! Each stage runs exactly once per successful execution and the job
//! state is persisted before the next stage begins, so a crash between
//! stages resumes at the right place. A collaborator failure aborts the
//! run with the checkpoint untouched; rerunning retries the same stage.

use std::fs;
use std::path::{Path, PathBuf};

use bookscribe_core::{
    format_timestamp, CheckpointStore, FeedInfo, Result, SegmentStore, SegmentsFile, Stage,
};

use crate::checksum::sha256_file;
use crate::chunker::ChunkedTranscriber;
use crate::config::Settings;
use crate::download::Downloader;
use crate::feed;
use crate::media::{ClipExtractor, Converter, DurationProbe};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::whisper::Transcriber;

pub struct StagePipeline<'a> {
    downloader: &'a dyn Downloader,
    converter: &'a dyn Converter,
    probe: &'a dyn DurationProbe,
    extractor: &'a dyn ClipExtractor,
    transcriber: &'a dyn Transcriber,
    settings: &'a Settings,
}

impl<'a> StagePipeline<'a> {
    pub fn new(
        downloader: &'a dyn Downloader,
        converter: &'a dyn Converter,
        probe: &'a dyn DurationProbe,
        extractor: &'a dyn ClipExtractor,
        transcriber: &'a dyn Transcriber,
        settings: &'a Settings,
    ) -> Self {
        StagePipeline {
            downloader,
            converter,
            probe,
            extractor,
            transcriber,
            settings,
        }
    }

    /// Advance the book's job from its checkpointed stage to `done`.
    /// Invoking on a finished job is a no-op that reports completion.
    pub fn run(
        &self,
        book_dir: &Path,
        info: &FeedInfo,
        sink: &mut dyn ProgressSink,
    ) -> Result<Stage> {
        let checkpoints = CheckpointStore::new(book_dir);
        let mut state = checkpoints.load()?;
        state.model = self.settings.model.clone();

        let audio_path = book_dir.join(format!("book{}", feed::audio_extension(&info.audio_url)));
        let wav_path = book_dir.join("book.wav");

        while state.stage != Stage::Done {
            let stage = state.stage;
            sink.emit(ProgressEvent::StageStarted { stage });
            tracing::info!(%stage, book = %book_dir.display(), "running stage");

            match stage {
                Stage::Downloading => {
                    self.downloader.fetch(&info.audio_url, &audio_path, sink)?;
                    state
                        .checksums
                        .insert("audio_original".into(), sha256_file(&audio_path)?);
                }
                Stage::Converting => {
                    self.converter.normalize(&audio_path, &wav_path, sink)?;
                    state
                        .checksums
                        .insert("audio_wav".into(), sha256_file(&wav_path)?);
                }
                Stage::Transcribing => {
                    let store = SegmentStore::new(book_dir);
                    let controller = ChunkedTranscriber::new(
                        self.probe,
                        self.extractor,
                        self.transcriber,
                        &self.settings.model,
                    );
                    state.last_segment = controller.run(&wav_path, &store, sink)?;
                    if let Some(file) = store.load()? {
                        write_transcript(book_dir, &file)?;
                    }
                }
                Stage::Done => unreachable!("loop guard excludes the terminal stage"),
            }

            // next() is Some for every stage inside the loop.
            if let Some(next) = stage.next() {
                state.stage = next;
                checkpoints.save(&state)?;
            }
            sink.emit(ProgressEvent::StageCompleted { stage });
        }

        Ok(state.stage)
    }
}

/// Render the plain-text transcript alongside the segments file.
pub fn write_transcript(book_dir: &Path, file: &SegmentsFile) -> Result<PathBuf> {
    let path = book_dir.join("transcript.txt");
    let mut out = String::new();
    for segment in &file.segments {
        out.push('[');
        out.push_str(&format_timestamp(segment.start));
        out.push_str("] ");
        out.push_str(&segment.text);
        out.push('\n');
    }
    fs::write(&path, out)?;
    tracing::info!(path = %path.display(), lines = file.segments.len(), "transcript written");
    Ok(path)
}
