//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Turn audiobook RSS feeds into searchable, timestamped transcripts
#[derive(Parser, Debug)]
#[command(name = "bookscribe")]
#[command(version)]
#[command(about = "Turn audiobook RSS feeds into searchable, timestamped transcripts")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root directory for per-book state
    #[arg(long, global = true, env = "BOOKSCRIBE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output (one object per line for lists)
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register an RSS feed and process it into a transcript
    Add {
        /// RSS feed URL with an audio enclosure
        url: String,

        /// Override the transcription model
        #[arg(long)]
        model: Option<String>,
    },

    /// List all books and their pipeline stage
    List,

    /// Resume processing for a registered book
    Process {
        /// Book title (as shown by list)
        title: String,

        /// Override the transcription model
        #[arg(long)]
        model: Option<String>,
    },

    /// Search a book's transcript for a phrase
    Search {
        /// Book title (as shown by list)
        title: String,

        /// Phrase to look for (case-insensitive)
        query: String,
    },
}
