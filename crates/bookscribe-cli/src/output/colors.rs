//! ANSI color helpers for terminal output

use bookscribe_core::Stage;
use colored::Colorize;

/// Get colored stage indicator
pub fn colored_stage(stage: Stage) -> String {
    match stage {
        Stage::Downloading => "downloading".cyan().to_string(),
        Stage::Converting => "converting".yellow().to_string(),
        Stage::Transcribing => "transcribing".blue().to_string(),
        Stage::Done => "done".green().to_string(),
    }
}

/// Get colored timestamp
pub fn colored_time(timestamp: &str) -> String {
    timestamp.white().dimmed().to_string()
}

/// Get colored book title
pub fn colored_title(title: &str) -> String {
    title.cyan().bold().to_string()
}

/// Get colored header
pub fn header(text: &str) -> String {
    text.bold().underline().to_string()
}

/// Get colored success message
pub fn success(text: &str) -> String {
    format!("{} {}", "✓".green(), text)
}
