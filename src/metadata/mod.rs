//! Video metadata.
//!
//! Metadata comes from an external downloader rather than the browser: it is
//! cheaper, and the watch page does not need to be rendered for it.

mod ytdlp;

pub use ytdlp::YtDlp;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata about a video, in the shape returned by the `get_video_info` tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Duration in whole seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Upload date as reported upstream (YYYYMMDD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl VideoInfo {
    /// Map a yt-dlp JSON dump onto the fields we expose.
    pub fn from_ytdlp_json(json: &Value) -> Self {
        let text = |key: &str| json[key].as_str().map(|s| s.to_string());

        Self {
            title: text("title"),
            description: text("description"),
            length_seconds: json["duration"].as_f64().map(|d| d.max(0.0).round() as u64),
            view_count: json["view_count"].as_u64(),
            author: text("uploader"),
            publish_date: text("upload_date"),
            keywords: json["tags"].as_array().map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(|s| s.to_string()))
                    .collect()
            }),
        }
    }

    /// Upload date as a calendar date, if it is in yt-dlp's YYYYMMDD form.
    pub fn published_on(&self) -> Option<NaiveDate> {
        let raw = self.publish_date.as_deref()?;
        if raw.len() != 8 {
            return None;
        }
        NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
    }
}

/// Trait for video metadata providers.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo>;
}
