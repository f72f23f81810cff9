//! Phrase search over a book's segments
//!
//! All segment texts are trimmed, lowercased, and joined with single
//! spaces into one search buffer, with each segment's starting byte
//! offset recorded alongside. A raw substring match is then mapped back
//! to the segment range it touches and wrapped in a bounded context
//! window.

use crate::types::{SearchMatch, SegmentsFile};

/// Context radius around a match, in segments, clamped at both ends.
pub const CONTEXT_SEGMENTS: usize = 2;

/// Find every occurrence of `query` in the transcript, case-insensitive.
///
/// Matches are reported left-to-right; after a hit the scan restarts one
/// character later, so overlapping and adjacent occurrences are all
/// reported. An empty query or an empty transcript yields no matches.
pub fn find_matches(file: &SegmentsFile, query: &str) -> Vec<SearchMatch> {
    let segments = &file.segments;
    if segments.is_empty() || query.is_empty() {
        return Vec::new();
    }

    let texts: Vec<String> = segments
        .iter()
        .map(|s| s.text.trim().to_lowercase())
        .collect();

    // Starting byte offset of each segment within the joined buffer.
    let mut offsets = Vec::with_capacity(texts.len());
    let mut pos = 0;
    for text in &texts {
        offsets.push(pos);
        pos += text.len() + 1;
    }
    let joined = texts.join(" ");
    let needle = query.to_lowercase();

    let mut matches = Vec::new();
    let mut from = 0;
    while let Some(found) = joined[from..].find(&needle) {
        let idx = from + found;

        // Last segment whose offset is <= the match start / end. The
        // first offset is always 0, so partition_point is at least 1.
        let match_start = offsets.partition_point(|&o| o <= idx) - 1;
        let last_byte = idx + needle.len() - 1;
        let match_end = offsets.partition_point(|&o| o <= last_byte) - 1;

        let context_start = match_start.saturating_sub(CONTEXT_SEGMENTS);
        let context_end = (match_end + CONTEXT_SEGMENTS).min(segments.len() - 1);

        matches.push(SearchMatch {
            timestamp_start: segments[match_start].start,
            timestamp_end: segments[match_end].end,
            match_start,
            match_end,
            context_start,
            context: segments[context_start..=context_end].to_vec(),
        });

        // Advance one character, not past the whole match.
        from = idx
            + joined[idx..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(1);
    }

    matches
}
