//! MCP tool definitions for Tekst.

use super::protocol::Tool;
use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Value};

pub const GET_VIDEO_INFO: &str = "get_video_info";
pub const GET_TRANSCRIPT: &str = "get_transcript";
pub const GET_TIMED_TRANSCRIPT: &str = "get_timed_transcript";

pub const DEFAULT_LANGUAGE: &str = "en";

/// Arguments for `get_video_info`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct VideoInfoArgs {
    /// The full URL of the YouTube video
    pub url: String,
}

/// Arguments for `get_transcript` and `get_timed_transcript`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TranscriptArgs {
    /// The full URL of the YouTube video
    pub url: String,
    /// Language code (default: en)
    #[serde(default)]
    pub lang: Option<String>,
    /// Resume offset from a previous response's next_cursor. Omit to get the whole transcript.
    #[serde(default)]
    pub cursor: Option<String>,
}

impl TranscriptArgs {
    pub fn language(&self) -> &str {
        self.lang
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }
}

/// JSON Schema for a tool's arguments, without the document-level keys.
fn input_schema<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| json!({}));
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.insert("type".to_string(), json!("object"));
    }
    schema
}

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: GET_TRANSCRIPT.to_string(),
            description: "Fetches the plain text transcript of a YouTube video. \
                Pass a cursor to read long transcripts page by page."
                .to_string(),
            input_schema: input_schema::<TranscriptArgs>(),
        },
        Tool {
            name: GET_TIMED_TRANSCRIPT.to_string(),
            description: "Fetches the transcript with timestamps: each segment has text, \
                start and duration in seconds."
                .to_string(),
            input_schema: input_schema::<TranscriptArgs>(),
        },
        Tool {
            name: GET_VIDEO_INFO.to_string(),
            description: "Fetches metadata about the video: title, description, length, \
                view count, author, publish date and keywords."
                .to_string(),
            input_schema: input_schema::<VideoInfoArgs>(),
        },
    ]
}
