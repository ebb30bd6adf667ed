//! YouTube URL handling.

use crate::error::{Result, TekstError};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// Matches various YouTube URL formats and bare video IDs
static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:
            # Full YouTube URLs
            (?:https?://)?
            (?:www\.|m\.)?
            (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        # Bare video ID (11 characters)
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("Invalid regex")
});

/// Extract the video ID from a YouTube URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let caps = VIDEO_ID.captures(input.trim())?;

    // Try group 1 (URL format) then group 2 (bare ID)
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Canonical watch page URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Turn user input into a URL to load.
///
/// A bare video ID becomes a watch URL. Any other input must be an absolute
/// http(s) URL and is passed through as given.
pub fn resolve_url(input: &str) -> Result<String> {
    let input = input.trim();
    if !input.contains('/') {
        if let Some(id) = extract_video_id(input) {
            return Ok(watch_url(&id));
        }
    }

    let parsed = Url::parse(input)
        .map_err(|e| TekstError::InvalidInput(format!("'{}' is not a valid URL: {}", input, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(input.to_string()),
        other => Err(TekstError::InvalidInput(format!(
            "unsupported URL scheme '{}' in {}",
            other, input
        ))),
    }
}
