//! yt-dlp metadata implementation.

use super::{MetadataSource, VideoInfo};
use crate::error::{Result, TekstError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Runs yt-dlp in JSON dump mode.
pub struct YtDlp {
    binary: String,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl MetadataSource for YtDlp {
    #[instrument(skip(self))]
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        debug!("Running {}", self.binary);

        let result = Command::new(&self.binary)
            .args([
                "--dump-single-json",
                "--no-download",
                "--no-warnings",
                "--no-check-certificates",
                "--prefer-free-formats",
                url,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TekstError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(TekstError::ToolFailed(format!("{} execution failed: {e}", self.binary)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TekstError::ToolFailed(format!(
                "{} failed for {}: {}",
                self.binary,
                url,
                stderr.trim()
            )));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| TekstError::ToolFailed(format!("Failed to parse {} output: {}", self.binary, e)))?;

        Ok(VideoInfo::from_ytdlp_json(&json))
    }
}
