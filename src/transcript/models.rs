//! Data models for transcripts.

use serde::{Deserialize, Serialize};

/// A single timed unit of transcript text.
///
/// Times are in seconds. `duration` is the gap to the next segment's start and
/// is 0 for the final segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text.
    pub text: String,
    /// Start offset in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End offset in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Deep links to this segment on the page at `base_url`.
    pub fn link<'a>(&'a self, base_url: &'a str) -> SegmentLink<'a> {
        SegmentLink::new(base_url, self)
    }
}

/// One row scraped from the transcript panel, before any time parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegmentRow {
    pub timestamp_text: String,
    pub text: String,
}

impl RawSegmentRow {
    pub const DEFAULT_TIMESTAMP: &'static str = "0:00";

    pub fn new(timestamp_text: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp_text: timestamp_text.into(),
            text: text.into(),
        }
    }

    /// Build a row from optional labels, falling back to `"0:00"` and `""`.
    pub fn from_labels(timestamp_text: Option<String>, text: Option<String>) -> Self {
        let timestamp_text = timestamp_text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_TIMESTAMP.to_string());
        let text = text.map(|t| t.trim().to_string()).unwrap_or_default();
        Self {
            timestamp_text,
            text,
        }
    }
}

/// Payload returned by the timed transcript tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedTranscript {
    pub transcript: Vec<TranscriptSegment>,
    pub total_items: usize,
    pub url: String,
}

impl TimedTranscript {
    /// Re-attach deep links to every segment, e.g. after loading the payload from disk.
    pub fn links(&self) -> impl Iterator<Item = SegmentLink<'_>> {
        self.transcript
            .iter()
            .map(move |segment| SegmentLink::new(&self.url, segment))
    }
}

/// Deep links into a video for one segment.
///
/// Built on demand from a base URL and a plain segment. This is a view, not
/// part of the stored transcript, and deliberately has no `Serialize` impl.
#[derive(Debug, Clone, Copy)]
pub struct SegmentLink<'a> {
    base_url: &'a str,
    segment: &'a TranscriptSegment,
}

impl<'a> SegmentLink<'a> {
    pub fn new(base_url: &'a str, segment: &'a TranscriptSegment) -> Self {
        Self { base_url, segment }
    }

    pub fn segment(&self) -> &'a TranscriptSegment {
        self.segment
    }

    /// URL that starts playback at the segment start.
    pub fn start_url(&self) -> String {
        self.at(self.segment.start)
    }

    /// URL that starts playback at the segment end.
    pub fn end_url(&self) -> String {
        self.at(self.segment.end())
    }

    fn at(&self, seconds: f64) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}t={}s",
            self.base_url,
            separator,
            seconds.max(0.0).floor() as u64
        )
    }
}
