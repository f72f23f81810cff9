//! Chunked transcription with mid-file resume
//!
//! Long audio is processed in fixed-duration chunks because the
//! transcription collaborator has a bounded input ceiling and because
//! incremental persistence bounds rework after an interruption. Resume
//! is driven purely by the end time of the last persisted segment, never
//! by chunk indices, so a restart re-attempts exactly the chunks whose
//! end exceeds that offset — including a partially transcribed one.

use std::path::Path;

use bookscribe_core::{Result, Segment, SegmentStore, SegmentsFile};

use crate::media::{ClipExtractor, DurationProbe};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::whisper::Transcriber;

/// Upper bound on audio handed to the transcription collaborator.
pub const CHUNK_DURATION_SECS: f64 = 7200.0;

/// Persist the transcript every this many newly appended segments, which
/// caps data loss on interruption to one interval's worth of work.
pub const SAVE_INTERVAL: usize = 50;

pub struct ChunkedTranscriber<'a> {
    probe: &'a dyn DurationProbe,
    extractor: &'a dyn ClipExtractor,
    transcriber: &'a dyn Transcriber,
    model: String,
    chunk_duration: f64,
    save_interval: usize,
}

impl<'a> ChunkedTranscriber<'a> {
    pub fn new(
        probe: &'a dyn DurationProbe,
        extractor: &'a dyn ClipExtractor,
        transcriber: &'a dyn Transcriber,
        model: impl Into<String>,
    ) -> Self {
        ChunkedTranscriber {
            probe,
            extractor,
            transcriber,
            model: model.into(),
            chunk_duration: CHUNK_DURATION_SECS,
            save_interval: SAVE_INTERVAL,
        }
    }

    /// Override the chunking constants (shorter chunks for short media or
    /// tests).
    pub fn with_chunking(mut self, chunk_duration: f64, save_interval: usize) -> Self {
        self.chunk_duration = chunk_duration;
        self.save_interval = save_interval.max(1);
        self
    }

    /// Transcribe `audio_path` into `store`, resuming any prior progress.
    /// Returns the total segment count on completion.
    pub fn run(
        &self,
        audio_path: &Path,
        store: &SegmentStore,
        sink: &mut dyn ProgressSink,
    ) -> Result<usize> {
        let audio_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut file = match store.load()? {
            Some(existing) => existing,
            None => SegmentsFile::new(&self.model, &audio_name),
        };
        let resume_offset = file.resume_offset();
        if resume_offset > 0.0 {
            tracing::info!(
                resume_offset,
                segments = file.segments.len(),
                "resuming transcription"
            );
        }

        let total_secs = self.probe.duration_secs(audio_path)?;
        let chunk_count = if total_secs > 0.0 {
            (total_secs / self.chunk_duration).ceil() as usize
        } else {
            0
        };

        let clip_dir = audio_path.parent().unwrap_or_else(|| Path::new("."));
        let mut appended = 0;

        for index in 0..chunk_count {
            let chunk_start = index as f64 * self.chunk_duration;
            let chunk_end = (chunk_start + self.chunk_duration).min(total_secs);
            if chunk_end <= resume_offset {
                tracing::debug!(index, chunk_end, "chunk already covered, skipping");
                continue;
            }

            sink.emit(ProgressEvent::ChunkStarted {
                index,
                count: chunk_count,
            });

            // The clip is removed when this handle drops, on success and
            // on every error path out of this iteration.
            let clip = tempfile::Builder::new()
                .prefix("chunk-")
                .suffix(".wav")
                .tempfile_in(clip_dir)?
                .into_temp_path();

            self.extractor
                .extract(audio_path, &clip, chunk_start, chunk_end - chunk_start)?;
            let entries = self.transcriber.transcribe(&clip)?;
            drop(clip);

            for entry in entries {
                let end = chunk_start + entry.end;
                if end <= resume_offset {
                    // Chunk overlaps the resume point; this part is
                    // already persisted.
                    continue;
                }
                file.segments.push(Segment {
                    start: chunk_start + entry.start,
                    end,
                    text: entry.text,
                });
                appended += 1;
                if appended % self.save_interval == 0 {
                    store.save(&file)?;
                    sink.emit(ProgressEvent::SegmentsSaved {
                        total_segments: file.segments.len(),
                        latest_end: end,
                    });
                }
            }

            store.save(&file)?;
            sink.emit(ProgressEvent::ChunkCompleted {
                index,
                count: chunk_count,
                total_segments: file.segments.len(),
            });
        }

        store.save(&file)?;
        tracing::info!(segments = file.segments.len(), "transcription complete");
        Ok(file.segments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullSink;
    use crate::whisper::RawSegment;
    use bookscribe_core::Error;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::path::PathBuf;

    struct FixedProbe(f64);

    impl DurationProbe for FixedProbe {
        fn duration_secs(&self, _path: &Path) -> Result<f64> {
            Ok(self.0)
        }
    }

    /// Records every extraction and writes the chunk start into the clip
    /// so the mock transcriber can produce deterministic output.
    #[derive(Default)]
    struct RecordingExtractor {
        calls: RefCell<Vec<(f64, f64)>>,
    }

    impl ClipExtractor for RecordingExtractor {
        fn extract(
            &self,
            _src: &Path,
            dest: &Path,
            start_secs: f64,
            duration_secs: f64,
        ) -> Result<()> {
            self.calls.borrow_mut().push((start_secs, duration_secs));
            fs::write(dest, format!("{}", start_secs))?;
            Ok(())
        }
    }

    /// Emits two fixed clip-relative entries per chunk, derived from the
    /// chunk start the extractor wrote into the clip.
    struct ScriptedTranscriber {
        fail_on_call: Option<usize>,
        calls: Cell<usize>,
    }

    impl ScriptedTranscriber {
        fn new() -> Self {
            ScriptedTranscriber {
                fail_on_call: None,
                calls: Cell::new(0),
            }
        }

        fn failing_on(call: usize) -> Self {
            ScriptedTranscriber {
                fail_on_call: Some(call),
                calls: Cell::new(0),
            }
        }
    }

    impl Transcriber for ScriptedTranscriber {
        fn transcribe(&self, clip: &Path) -> Result<Vec<RawSegment>> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if self.fail_on_call == Some(call) {
                return Err(Error::collaborator("whisper", "model crashed"));
            }

            let chunk_start: f64 = fs::read_to_string(clip).unwrap().parse().unwrap();
            Ok(vec![
                RawSegment {
                    start: 0.2,
                    end: 1.8,
                    text: format!("first at {}", chunk_start),
                },
                RawSegment {
                    start: 2.0,
                    end: 3.9,
                    text: format!("second at {}", chunk_start),
                },
            ])
        }
    }

    fn audio_file(dir: &Path) -> PathBuf {
        let path = dir.join("book.wav");
        fs::write(&path, "wav").unwrap();
        path
    }

    #[test]
    fn zero_duration_completes_with_no_segments() {
        let dir = tempfile::tempdir().unwrap();
        let audio = audio_file(dir.path());
        let store = SegmentStore::new(dir.path());

        let probe = FixedProbe(0.0);
        let extractor = RecordingExtractor::default();
        let transcriber = ScriptedTranscriber::new();
        let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny");

        let count = controller.run(&audio, &store, &mut NullSink).unwrap();
        assert_eq!(count, 0);
        assert!(extractor.calls.borrow().is_empty());
        // Final persist still writes an (empty) transcript.
        assert!(store.load().unwrap().unwrap().segments.is_empty());
    }

    #[test]
    fn splits_audio_into_bounded_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let audio = audio_file(dir.path());
        let store = SegmentStore::new(dir.path());

        let probe = FixedProbe(10.0);
        let extractor = RecordingExtractor::default();
        let transcriber = ScriptedTranscriber::new();
        let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny")
            .with_chunking(4.0, 50);

        let count = controller.run(&audio, &store, &mut NullSink).unwrap();
        assert_eq!(count, 6);
        // Chunks [0,4), [4,8), [8,10); the last one is short.
        assert_eq!(
            *extractor.calls.borrow(),
            vec![(0.0, 4.0), (4.0, 4.0), (8.0, 2.0)]
        );

        let file = store.load().unwrap().unwrap();
        assert_eq!(file.segments[0].start, 0.2);
        assert_eq!(file.segments[2].start, 4.2);
        // Chunk-relative times were shifted to absolute.
        assert_eq!(file.segments[5].end, 8.0 + 3.9);
    }

    #[test]
    fn resume_skips_covered_chunks_and_segments() {
        let dir = tempfile::tempdir().unwrap();
        let audio = audio_file(dir.path());
        let store = SegmentStore::new(dir.path());

        // Prior run persisted segments up to 5.0s.
        let mut existing = SegmentsFile::new("tiny", "book.wav");
        existing.segments.push(Segment {
            start: 0.0,
            end: 5.0,
            text: "already done".into(),
        });
        store.save(&existing).unwrap();

        let probe = FixedProbe(10.0);
        let extractor = RecordingExtractor::default();
        let transcriber = ScriptedTranscriber::new();
        let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny")
            .with_chunking(4.0, 50);

        controller.run(&audio, &store, &mut NullSink).unwrap();

        // Chunk [0,4) ends at or below the resume offset and is never
        // extracted; [4,8) and [8,10) are re-attempted.
        assert_eq!(*extractor.calls.borrow(), vec![(4.0, 4.0), (8.0, 2.0)]);

        // Chunk [4,8) overlaps the resume point: its first entry ends at
        // 5.8 (> 5.0) and is kept; nothing emitted ends at or below 5.0.
        let file = store.load().unwrap().unwrap();
        assert!(file.segments[1..].iter().all(|s| s.end > 5.0));
        assert_eq!(file.segments[1].end, 4.0 + 1.8);
    }

    #[test]
    fn boundary_overlap_discards_already_covered_entries() {
        let dir = tempfile::tempdir().unwrap();
        let audio = audio_file(dir.path());
        let store = SegmentStore::new(dir.path());

        // Resume offset lands inside the second chunk, past its first
        // entry's end (4.0 + 1.8 = 5.8).
        let mut existing = SegmentsFile::new("tiny", "book.wav");
        existing.segments.push(Segment {
            start: 0.0,
            end: 6.0,
            text: "already done".into(),
        });
        store.save(&existing).unwrap();

        let probe = FixedProbe(8.0);
        let extractor = RecordingExtractor::default();
        let transcriber = ScriptedTranscriber::new();
        let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny")
            .with_chunking(4.0, 50);

        controller.run(&audio, &store, &mut NullSink).unwrap();

        let file = store.load().unwrap().unwrap();
        // Only the second entry of chunk [4,8) survives (ends at 7.9).
        assert_eq!(file.segments.len(), 2);
        assert_eq!(file.segments[1].text, "second at 4");
        assert!(file.segments[1].end > 6.0);
    }

    #[test]
    fn failed_chunk_keeps_prior_progress_and_cleans_clips() {
        let dir = tempfile::tempdir().unwrap();
        let audio = audio_file(dir.path());
        let store = SegmentStore::new(dir.path());

        let probe = FixedProbe(10.0);
        let extractor = RecordingExtractor::default();
        let transcriber = ScriptedTranscriber::failing_on(1);
        let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny")
            .with_chunking(4.0, 50);

        let err = controller.run(&audio, &store, &mut NullSink).unwrap_err();
        assert!(matches!(err, Error::Collaborator { .. }));

        // The first chunk's segments were persisted before the failure.
        let file = store.load().unwrap().unwrap();
        assert_eq!(file.segments.len(), 2);

        // No temporary clip leaked.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("chunk-"))
            .collect();
        assert!(leftovers.is_empty(), "leaked clips: {:?}", leftovers);
    }

    #[test]
    fn interrupted_run_resumes_to_identical_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let audio = audio_file(dir.path());
        let store = SegmentStore::new(dir.path());
        let probe = FixedProbe(10.0);

        // Interrupted after the first of three chunks...
        {
            let extractor = RecordingExtractor::default();
            let transcriber = ScriptedTranscriber::failing_on(1);
            let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny")
                .with_chunking(4.0, 50);
            controller.run(&audio, &store, &mut NullSink).unwrap_err();
        }
        // ...then rerun to completion.
        {
            let extractor = RecordingExtractor::default();
            let transcriber = ScriptedTranscriber::new();
            let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny")
                .with_chunking(4.0, 50);
            controller.run(&audio, &store, &mut NullSink).unwrap();
        }
        let resumed = store.load().unwrap().unwrap();

        // Reference: one uninterrupted run in a fresh directory.
        let fresh_dir = tempfile::tempdir().unwrap();
        let fresh_audio = audio_file(fresh_dir.path());
        let fresh_store = SegmentStore::new(fresh_dir.path());
        let extractor = RecordingExtractor::default();
        let transcriber = ScriptedTranscriber::new();
        let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny")
            .with_chunking(4.0, 50);
        controller.run(&fresh_audio, &fresh_store, &mut NullSink).unwrap();
        let uninterrupted = fresh_store.load().unwrap().unwrap();

        assert_eq!(resumed.segments, uninterrupted.segments);
    }

    #[test]
    fn saves_at_the_configured_interval() {
        let dir = tempfile::tempdir().unwrap();
        let audio = audio_file(dir.path());
        let store = SegmentStore::new(dir.path());

        struct CountingSink {
            incremental_saves: usize,
        }
        impl ProgressSink for CountingSink {
            fn emit(&mut self, event: ProgressEvent) {
                if matches!(event, ProgressEvent::SegmentsSaved { .. }) {
                    self.incremental_saves += 1;
                }
            }
        }

        let probe = FixedProbe(8.0);
        let extractor = RecordingExtractor::default();
        let transcriber = ScriptedTranscriber::new();
        let controller = ChunkedTranscriber::new(&probe, &extractor, &transcriber, "tiny")
            .with_chunking(4.0, 2);

        let mut sink = CountingSink {
            incremental_saves: 0,
        };
        controller.run(&audio, &store, &mut sink).unwrap();
        // Four appended segments with an interval of two.
        assert_eq!(sink.incremental_saves, 2);
    }
}
