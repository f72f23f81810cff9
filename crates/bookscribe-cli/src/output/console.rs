//! Console rendering of pipeline progress events
//!
//! The pipeline emits structured events; this sink turns them into
//! terminal lines, throttling the byte-level ones to 5% steps.

use bookscribe_pipeline::{ProgressEvent, ProgressSink};

use super::colors;

const PERCENT_STEP: i64 = 5;

pub struct ConsoleSink {
    last_download_pct: i64,
    last_convert_pct: i64,
}

impl ConsoleSink {
    pub fn new() -> Self {
        ConsoleSink {
            last_download_pct: -1,
            last_convert_pct: -1,
        }
    }
}

impl ProgressSink for ConsoleSink {
    fn emit(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { stage } => {
                println!("Stage: {}", colors::colored_stage(stage));
            }
            ProgressEvent::StageCompleted { stage } => {
                println!("{}", colors::success(&format!("{} complete", stage)));
            }
            ProgressEvent::DownloadResumed { offset } => {
                println!("Resuming download from byte {}", offset);
            }
            ProgressEvent::DownloadProgress { downloaded, total } => {
                if let Some(total) = total.filter(|&t| t > 0) {
                    let pct = (downloaded * 100 / total) as i64;
                    if pct % PERCENT_STEP == 0 && pct != self.last_download_pct {
                        println!("Downloading: {}% ({}/{} bytes)", pct, downloaded, total);
                        self.last_download_pct = pct;
                    }
                }
            }
            ProgressEvent::ConvertProgress { percent } => {
                let pct = percent as i64;
                if pct % PERCENT_STEP == 0 && pct != self.last_convert_pct {
                    println!("Converting: {}%", pct);
                    self.last_convert_pct = pct;
                }
            }
            ProgressEvent::ChunkStarted { index, count } => {
                println!("Transcribing chunk {}/{}", index + 1, count);
            }
            ProgressEvent::ChunkCompleted {
                index,
                count,
                total_segments,
            } => {
                println!(
                    "Chunk {}/{} complete ({} segments)",
                    index + 1,
                    count,
                    total_segments
                );
            }
            ProgressEvent::SegmentsSaved {
                total_segments,
                latest_end,
            } => {
                println!(
                    "Progress: {} segments, latest at {:.1}s",
                    total_segments, latest_end
                );
            }
        }
    }
}
