//! Add command - register an RSS feed and process it

use anyhow::Result;

use bookscribe_pipeline::{feed, Library, Settings};

use crate::cli::Cli;
use crate::commands::process;
use crate::output::colors;

pub fn run(_cli: &Cli, settings: &Settings, url: &str) -> Result<()> {
    println!("Parsing RSS feed: {}", url);
    let info = feed::fetch_feed(url)?;
    println!("Book: {}", colors::colored_title(&info.title));

    let library = Library::new(settings.data_dir()?);
    let book_dir = library.book_dir(&info.title);
    feed::save_feed(&book_dir, &info)?;

    process::execute(settings, &book_dir, &info)
}
