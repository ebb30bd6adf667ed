//! Derived transcript views: flat text and cursor pagination.
//!
//! Cursors are decimal start offsets. Views are recomputed from the full
//! transcript on every call; nothing is cached between calls.

use super::models::TranscriptSegment;
use crate::error::{Result, TekstError};
use serde::Serialize;
use std::num::IntErrorKind;

/// The whole transcript as one string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatTranscript {
    pub transcript: String,
    /// Length in characters.
    pub total_length: usize,
}

/// Join segment texts with single spaces.
pub fn flat_text(segments: &[TranscriptSegment]) -> FlatTranscript {
    let transcript = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let total_length = transcript.chars().count();

    FlatTranscript {
        transcript,
        total_length,
    }
}

/// One page of flat transcript text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPage {
    pub transcript: String,
    pub next_cursor: Option<String>,
    pub total_length: usize,
}

/// One page of segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPage<'a, T> {
    pub items: &'a [T],
    pub next_cursor: Option<String>,
    pub total_items: usize,
}

/// Page through `text` by characters.
pub fn paginate_text(text: &str, cursor: Option<&str>, page_size: usize) -> Result<TextPage> {
    let offset = parse_cursor(cursor)?;
    let total_length = text.chars().count();
    let window = Window::new(offset, page_size, total_length)?;

    let transcript = text
        .chars()
        .skip(window.start)
        .take(window.end - window.start)
        .collect();

    Ok(TextPage {
        transcript,
        next_cursor: window.next_cursor(),
        total_length,
    })
}

/// Page through a slice of items.
pub fn paginate_items<'a, T>(
    items: &'a [T],
    cursor: Option<&str>,
    page_size: usize,
) -> Result<ItemPage<'a, T>> {
    let offset = parse_cursor(cursor)?;
    let window = Window::new(offset, page_size, items.len())?;

    Ok(ItemPage {
        items: &items[window.start..window.end],
        next_cursor: window.next_cursor(),
        total_items: items.len(),
    })
}

/// Decode a cursor. Missing or blank means start of data.
fn parse_cursor(cursor: Option<&str>) -> Result<usize> {
    match cursor.map(str::trim) {
        None | Some("") => Ok(0),
        Some(raw) => raw.parse::<usize>().map_err(|e| {
            let reason = match e.kind() {
                IntErrorKind::PosOverflow => "is out of range",
                _ => "is not a decimal offset",
            };
            TekstError::InvalidCursor(format!("'{}' {}", raw, reason))
        }),
    }
}

struct Window {
    start: usize,
    end: usize,
    requested_end: usize,
    total: usize,
}

impl Window {
    fn new(offset: usize, page_size: usize, total: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(TekstError::InvalidInput("page size must be at least 1".to_string()));
        }
        let requested_end = offset.saturating_add(page_size);
        Ok(Self {
            start: offset.min(total),
            end: requested_end.min(total),
            requested_end,
            total,
        })
    }

    fn next_cursor(&self) -> Option<String> {
        (self.requested_end < self.total).then(|| self.requested_end.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(texts: &[&str]) -> Vec<TranscriptSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TranscriptSegment::new(*t, i as f64, 1.0))
            .collect()
    }

    #[test]
    fn test_flat_text() {
        let flat = flat_text(&segments(&["a", "b", "c"]));
        assert_eq!(flat.transcript, "a b c");
        assert_eq!(flat.total_length, 5);

        let empty = flat_text(&[]);
        assert_eq!(empty.transcript, "");
        assert_eq!(empty.total_length, 0);
    }

    #[test]
    fn test_paginate_text_walk() {
        let text: String = (0..12000).map(|i| (b'a' + (i % 26) as u8) as char).collect();

        let first = paginate_text(&text, None, 5000).unwrap();
        assert_eq!(first.transcript.len(), 5000);
        assert_eq!(first.next_cursor.as_deref(), Some("5000"));
        assert_eq!(first.total_length, 12000);

        let second = paginate_text(&text, Some("5000"), 5000).unwrap();
        assert_eq!(second.transcript, &text[5000..10000]);
        assert_eq!(second.next_cursor.as_deref(), Some("10000"));

        let last = paginate_text(&text, Some("10000"), 5000).unwrap();
        assert_eq!(last.transcript.len(), 2000);
        assert_eq!(last.next_cursor, None);
    }

    #[test]
    fn test_invalid_cursor() {
        let err = paginate_text("hello", Some("abc"), 10).unwrap_err();
        assert!(matches!(err, TekstError::InvalidCursor(_)));

        let items = segments(&["a"]);
        let err = paginate_items(&items, Some("-1"), 10).unwrap_err();
        assert!(matches!(err, TekstError::InvalidCursor(_)));
    }

    #[test]
    fn test_overflowing_cursor_is_out_of_range() {
        let err = paginate_text("abc", Some("99999999999999999999999"), 5).unwrap_err();
        assert!(matches!(&err, TekstError::InvalidCursor(msg) if msg.contains("out of range")));

        let err = paginate_text("abc", Some("-1"), 5).unwrap_err();
        assert!(err.to_string().contains("not a decimal offset"));
    }

    #[test]
    fn test_cursor_past_end() {
        let page = paginate_text("short", Some("99"), 10).unwrap();
        assert_eq!(page.transcript, "");
        assert_eq!(page.next_cursor, None);
        assert_eq!(page.total_length, 5);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            paginate_text("abc", None, 0),
            Err(TekstError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_pages_split_on_characters() {
        let text = "héllo wörld";
        let page = paginate_text(text, None, 2).unwrap();
        assert_eq!(page.transcript, "hé");
        assert_eq!(page.total_length, 11);
    }

    #[test]
    fn test_text_pages_reassemble() {
        let text = "The quick brown fox jumps over the lazy dog, in ünïcödé too.";
        let mut cursor: Option<String> = None;
        let mut rebuilt = String::new();
        loop {
            let page = paginate_text(text, cursor.as_deref(), 7).unwrap();
            rebuilt.push_str(&page.transcript);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_item_pages_reassemble() {
        let items = segments(&["a", "b", "c", "d", "e", "f", "g"]);
        let mut cursor: Option<String> = None;
        let mut rebuilt = Vec::new();
        loop {
            let page = paginate_items(&items, cursor.as_deref(), 3).unwrap();
            assert_eq!(page.total_items, 7);
            rebuilt.extend_from_slice(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn test_exact_fit_has_no_next_cursor() {
        let items = segments(&["a", "b"]);
        let page = paginate_items(&items, Some("0"), 2).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor, None);
    }
}
