//! Tekst - YouTube transcripts for AI assistants
//!
//! A local MCP server and CLI that fetches a video's metadata, its plain
//! transcript, or its timed transcript. Video pages expose no usable transcript
//! API, so transcripts are read from the rendered transcript panel in a
//! headless Chrome.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `browser` - Chrome session and the transcript extraction steps
//! - `transcript` - Segment models, timestamp parsing, text views and pagination
//! - `metadata` - Video metadata via yt-dlp
//! - `mcp` - JSON-RPC 2.0 server over stdio
//! - `youtube` - URL and video ID handling
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tekst::browser::{BrowserSession, TranscriptExtractor};
//! use tekst::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let session = Arc::new(BrowserSession::new(settings.browser.clone()));
//!     let extractor = TranscriptExtractor::new(session.clone(), settings.browser.clone());
//!
//!     let segments = extractor
//!         .extract("https://www.youtube.com/watch?v=jNQXAC9IVRw", "en")
//!         .await?;
//!     println!("{} segments", segments.len());
//!
//!     session.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod metadata;
pub mod transcript;
pub mod youtube;

pub use error::{Result, TekstError};
