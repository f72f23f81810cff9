//! Search command - phrase search over a book's transcript

use anyhow::Result;

use bookscribe_core::{format_timestamp, search, SegmentStore};
use bookscribe_pipeline::{Library, Settings};

use crate::cli::{Cli, OutputFormat};
use crate::output::colors;

pub fn run(cli: &Cli, settings: &Settings, title: &str, query: &str) -> Result<()> {
    let library = Library::new(settings.data_dir()?);
    let book_dir = library.book_dir(title);

    let store = SegmentStore::new(&book_dir);
    let file = match store.load()? {
        Some(file) => file,
        None => anyhow::bail!("no transcript for book: {}", title),
    };

    let matches = search::find_matches(&file, query);

    match cli.format {
        OutputFormat::Human => {
            if matches.is_empty() {
                println!("No matches found for: {:?}", query);
                return Ok(());
            }

            println!(
                "{}",
                colors::header(&format!("{} match(es) for: {:?}", matches.len(), query))
            );
            println!();

            for (i, m) in matches.iter().enumerate() {
                println!(
                    "── Match {} [{} → {}] ──",
                    i + 1,
                    format_timestamp(m.timestamp_start),
                    format_timestamp(m.timestamp_end)
                );
                for segment in &m.context {
                    println!(
                        "  {} {}",
                        colors::colored_time(&format!("[{}]", format_timestamp(segment.start))),
                        segment.text.trim()
                    );
                }
                println!();
            }
        }
        OutputFormat::Json => {
            for m in &matches {
                println!("{}", serde_json::to_string(m)?);
            }
        }
    }

    Ok(())
}
