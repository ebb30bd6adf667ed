//! Transcript output formatting (text, JSON, SRT, VTT).

use super::models::{TimedTranscript, TranscriptSegment};
use super::view::flat_text;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use text, json, srt, or vtt.", s)),
        }
    }
}

/// Render segments extracted from `url` in the given format.
pub fn format_transcript(segments: &[TranscriptSegment], url: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => flat_text(segments).transcript,
        OutputFormat::Json => format_json(segments, url),
        OutputFormat::Srt => format_cues(segments, "", srt_timestamp),
        OutputFormat::Vtt => format_cues(segments, "WEBVTT\n\n", vtt_timestamp),
    }
}

fn format_json(segments: &[TranscriptSegment], url: &str) -> String {
    let payload = TimedTranscript {
        transcript: segments.to_vec(),
        total_items: segments.len(),
        url: url.to_string(),
    };
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
}

fn format_cues(segments: &[TranscriptSegment], header: &str, stamp: fn(f64) -> String) -> String {
    let mut output = String::from(header);

    for (i, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            stamp(segment.start),
            stamp(segment.end())
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

fn split_millis(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// 00:00:00,000
fn srt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// 00:00:00.000
fn vtt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split_millis(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}
