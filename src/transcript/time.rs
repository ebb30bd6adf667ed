//! Timestamp parsing and segment timing.

use super::models::{RawSegmentRow, TranscriptSegment};

/// Parse a transcript display timestamp ("H:MM:SS" or "MM:SS") into seconds.
///
/// The seconds field may be fractional ("1:02:03.5"). Anything else, including
/// empty or missing input, yields 0. Scraped labels are best-effort, so this never fails.
pub fn parse_timestamp<'a>(input: impl Into<Option<&'a str>>) -> f64 {
    let Some(input) = input.into() else {
        return 0.0;
    };

    let parts: Vec<&str> = input.trim().split(':').map(str::trim).collect();
    let parsed = match parts.as_slice() {
        [hours, minutes, seconds] => whole(hours)
            .zip(whole(minutes))
            .zip(fractional(seconds))
            .map(|((h, m), s)| h * 3600.0 + m * 60.0 + s),
        [minutes, seconds] => whole(minutes)
            .zip(fractional(seconds))
            .map(|(m, s)| m * 60.0 + s),
        _ => None,
    };

    parsed.unwrap_or(0.0)
}

fn whole(part: &str) -> Option<f64> {
    part.parse::<u64>().ok().map(|v| v as f64)
}

fn fractional(part: &str) -> Option<f64> {
    // Rejects "inf", "NaN" and signs, which f64::from_str would otherwise accept.
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    part.parse::<f64>().ok()
}

/// Fill in segment durations from the gap to the next segment's start.
///
/// Runs after every start is known. The last segment has nothing to look ahead
/// to, so its duration is 0.
pub fn infer_durations(timed: Vec<(String, f64)>) -> Vec<TranscriptSegment> {
    let starts: Vec<f64> = timed.iter().map(|(_, start)| *start).collect();

    timed
        .into_iter()
        .enumerate()
        .map(|(i, (text, start))| {
            let duration = starts
                .get(i + 1)
                .map(|next| (next - start).max(0.0))
                .unwrap_or(0.0);
            TranscriptSegment::new(text, start, duration)
        })
        .collect()
}

/// Turn scraped panel rows into timed segments.
pub fn segments_from_rows(rows: Vec<RawSegmentRow>) -> Vec<TranscriptSegment> {
    let timed = rows
        .into_iter()
        .map(|row| {
            let start = parse_timestamp(row.timestamp_text.as_str());
            (row.text, start)
        })
        .collect();
    infer_durations(timed)
}
