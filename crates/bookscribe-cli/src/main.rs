//! bookscribe - audiobook RSS feeds to searchable transcripts

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bookscribe_pipeline::Settings;

use cli::{Cli, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if cli.data_dir.is_some() {
        settings.data_dir = cli.data_dir.clone();
    }

    match &cli.command {
        Command::Add { url, model } => {
            if let Some(model) = model {
                settings.model = model.clone();
            }
            commands::add::run(&cli, &settings, url)
        }
        Command::List => commands::list::run(&cli, &settings),
        Command::Process { title, model } => {
            if let Some(model) = model {
                settings.model = model.clone();
            }
            commands::process::run(&cli, &settings, title)
        }
        Command::Search { title, query } => commands::search::run(&cli, &settings, title, query),
    }
}
