//! RSS feed fetching and audio-enclosure discovery
//!
//! Only enough feed handling to register a book: the channel title and
//! the first item carrying an audio enclosure. No further validation of
//! the feed format is attempted.

use std::path::Path;

use rss::Channel;

use bookscribe_core::{atomic, Error, FeedInfo, FeedItem, Result};

const FEED_FILE: &str = "feed.json";

const KNOWN_AUDIO_EXTENSIONS: &[&str] = &[".m4b", ".m4a", ".mp3", ".mp4", ".ogg", ".opus", ".wav"];

/// Fetch and parse a feed URL into the metadata we persist.
pub fn fetch_feed(url: &str) -> Result<FeedInfo> {
    let client = reqwest::blocking::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| Error::collaborator("feed fetch", e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .map_err(|e| Error::collaborator("feed fetch", e.to_string()))?;
    if !response.status().is_success() {
        return Err(Error::collaborator(
            "feed fetch",
            format!("HTTP {} from {}", response.status(), url),
        ));
    }
    let body = response
        .bytes()
        .map_err(|e| Error::collaborator("feed fetch", e.to_string()))?;
    parse_feed(&body)
}

/// Parse raw RSS bytes, locating the first audio enclosure.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedInfo> {
    let channel = Channel::read_from(bytes)
        .map_err(|e| Error::collaborator("feed parse", e.to_string()))?;

    let title = if channel.title().is_empty() {
        "Untitled".to_string()
    } else {
        channel.title().to_string()
    };

    let mut audio_url = None;
    let mut item_meta = FeedItem::default();
    let mut duration_seconds = None;

    for item in channel.items() {
        if let Some(enclosure) = item.enclosure() {
            let is_audio = enclosure.mime_type().starts_with("audio/")
                || has_audio_extension(enclosure.url());
            if is_audio {
                audio_url = Some(enclosure.url().to_string());
                item_meta = FeedItem {
                    title: item.title().unwrap_or_default().to_string(),
                    link: item.link().unwrap_or_default().to_string(),
                    published: item.pub_date().unwrap_or_default().to_string(),
                };
                duration_seconds = item
                    .itunes_ext()
                    .and_then(|ext| ext.duration())
                    .and_then(parse_duration);
                break;
            }
        }
    }

    let audio_url = audio_url
        .ok_or_else(|| Error::collaborator("feed parse", "no audio enclosure found in feed"))?;

    Ok(FeedInfo {
        title,
        audio_url,
        duration_seconds,
        item: item_meta,
    })
}

/// Parse an itunes-style duration: `HH:MM:SS`, `MM:SS`, or bare seconds.
fn parse_duration(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.split(':').collect();
    match parts.as_slice() {
        [h, m, s] => Some(
            h.parse::<u64>().ok()? as f64 * 3600.0
                + m.parse::<u64>().ok()? as f64 * 60.0
                + s.parse::<f64>().ok()?,
        ),
        [m, s] => Some(m.parse::<u64>().ok()? as f64 * 60.0 + s.parse::<f64>().ok()?),
        [raw] => raw.parse::<f64>().ok(),
        _ => None,
    }
}

/// File extension for the downloaded audio, from the enclosure URL.
/// Unknown extensions default to `.m4b`.
pub fn audio_extension(url: &str) -> &'static str {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url.to_lowercase(),
    };
    KNOWN_AUDIO_EXTENSIONS
        .iter()
        .find(|ext| path.ends_with(*ext))
        .copied()
        .unwrap_or(".m4b")
}

fn has_audio_extension(url: &str) -> bool {
    let lowered = url.to_lowercase();
    KNOWN_AUDIO_EXTENSIONS
        .iter()
        .any(|ext| lowered.contains(*ext))
}

/// Atomically persist the feed metadata into the book directory.
pub fn save_feed(book_dir: &Path, info: &FeedInfo) -> Result<()> {
    atomic::write_json(&book_dir.join(FEED_FILE), info)
}

/// Load previously registered feed metadata; absence means the book was
/// never registered.
pub fn load_feed(book_dir: &Path) -> Result<FeedInfo> {
    let path = book_dir.join(FEED_FILE);
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "no feed registered in {}",
            book_dir.display()
        )));
    }
    atomic::read_json(&path)
}
