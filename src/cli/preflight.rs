//! Pre-flight checks before expensive operations.
//!
//! Validates that the external programs a command needs are present before
//! launching a browser or spawning yt-dlp.

use crate::config::Settings;
use crate::error::{Result, TekstError};
use std::path::PathBuf;
use std::process::Command;

/// Executables tried, in order, when no `browser.chrome_path` is configured.
pub const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Transcript extraction needs Chrome.
    Transcript,
    /// Video info needs yt-dlp.
    Info,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Transcript => {
            locate_chrome(settings)?;
        }
        Operation::Info => {
            check_tool(&settings.metadata.ytdlp_path)?;
        }
    }
    Ok(())
}

/// Find the Chrome executable the browser session would use.
///
/// A configured path must exist. Otherwise the first candidate on `PATH` that
/// answers `--version` wins.
pub fn locate_chrome(settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = settings.browser.chrome_executable() {
        return if path.exists() {
            Ok(path)
        } else {
            Err(TekstError::ToolNotFound(format!(
                "Chrome at configured path {}",
                path.display()
            )))
        };
    }

    CHROME_CANDIDATES
        .iter()
        .find(|name| check_tool(name).is_ok())
        .map(PathBuf::from)
        .ok_or_else(|| TekstError::ToolNotFound("google-chrome or chromium".to_string()))
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TekstError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TekstError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TekstError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
