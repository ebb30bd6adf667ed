//! Transcript data model, timing and derived views.

mod format;
mod models;
mod time;
mod view;

pub use format::{format_transcript, OutputFormat};
pub use models::{RawSegmentRow, SegmentLink, TimedTranscript, TranscriptSegment};
pub use time::{infer_durations, parse_timestamp, segments_from_rows};
pub use view::{flat_text, paginate_items, paginate_text, FlatTranscript, ItemPage, TextPage};
