//! List command - show registered books and their stage

use anyhow::Result;

use bookscribe_pipeline::{Library, Settings};

use crate::cli::{Cli, OutputFormat};
use crate::output::colors;

pub fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let library = Library::new(settings.data_dir()?);
    let books = library.list_books()?;

    match cli.format {
        OutputFormat::Human => {
            if books.is_empty() {
                println!("No books found");
            } else {
                println!("{}", colors::header(&format!("Books ({})", books.len())));
                println!();
                for book in &books {
                    println!(
                        "{} – {}",
                        colors::colored_title(&book.title),
                        colors::colored_stage(book.stage)
                    );
                }
            }
        }
        OutputFormat::Json => {
            for book in &books {
                println!(
                    "{}",
                    serde_json::json!({
                        "title": book.title,
                        "stage": book.stage.label(),
                    })
                );
            }
        }
    }

    Ok(())
}
