//! Process command - resume the pipeline for a registered book

use std::path::Path;

use anyhow::Result;

use bookscribe_core::{CheckpointStore, FeedInfo, Stage};
use bookscribe_pipeline::{
    feed, FfmpegAudio, HttpDownloader, Library, Settings, StagePipeline, WhisperCli,
};

use crate::cli::Cli;
use crate::output::colors;
use crate::output::console::ConsoleSink;

pub fn run(_cli: &Cli, settings: &Settings, title: &str) -> Result<()> {
    let library = Library::new(settings.data_dir()?);
    let book_dir = library.book_dir(title);
    if !book_dir.exists() {
        anyhow::bail!("book not found: {}", title);
    }
    let info = feed::load_feed(&book_dir)?;

    let state = CheckpointStore::new(&book_dir).load()?;
    if state.stage == Stage::Done {
        println!(
            "{}",
            colors::success(&format!("Book already complete: {}", title))
        );
        return Ok(());
    }

    execute(settings, &book_dir, &info)
}

/// Wire up the production collaborators and drive the pipeline to done.
pub(crate) fn execute(settings: &Settings, book_dir: &Path, info: &FeedInfo) -> Result<()> {
    let downloader = HttpDownloader::new()?;
    let media = FfmpegAudio::new(settings);
    let transcriber = WhisperCli::new(settings)?;

    let pipeline = StagePipeline::new(
        &downloader,
        &media,
        &media,
        &media,
        &transcriber,
        settings,
    );

    let mut sink = ConsoleSink::new();
    pipeline.run(book_dir, info, &mut sink)?;

    println!(
        "{}",
        colors::success(&format!("Pipeline complete: {}", info.title))
    );
    Ok(())
}
