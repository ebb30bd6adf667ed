//! Headless browser transcript extraction.
//!
//! Provides a trait-based interface over the browser so the extraction steps can be
//! driven against Chrome ([`BrowserSession`]) or any other page implementation.

mod extractor;
mod session;

pub use extractor::TranscriptExtractor;
pub use session::{BrowserSession, ChromeLauncher};

use crate::config::BrowserSettings;
use crate::error::Result;
use crate::transcript::{RawSegmentRow, TranscriptSegment};
use async_trait::async_trait;

/// One isolated browser tab.
///
/// Implementations report load failures from [`navigate`](Self::navigate) as
/// [`TekstError::Navigation`](crate::error::TekstError::Navigation).
#[async_trait]
pub trait TranscriptPage: Send {
    /// Load `url` and wait for it to settle.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Click the first element matching `selector`. Returns false if there is none.
    async fn click_selector(&mut self, selector: &str) -> Result<bool>;

    /// Click the first `button` whose text contains `label`. Returns false if there is none.
    async fn click_button_containing(&mut self, label: &str) -> Result<bool>;

    /// Number of elements matching `selector`.
    async fn count(&mut self, selector: &str) -> Result<usize>;

    /// Read every `row_selector` element in document order, taking the timestamp
    /// and text from the given child selectors.
    async fn scrape_rows(
        &mut self,
        row_selector: &str,
        timestamp_selector: &str,
        text_selector: &str,
    ) -> Result<Vec<RawSegmentRow>>;

    /// Close the tab.
    async fn close(&mut self) -> Result<()>;
}

/// Opens fresh pages in a shared browser.
#[async_trait]
pub trait PageProvider: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn TranscriptPage>>;
}

/// Anything that can produce a timed transcript for a video URL.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(&self, url: &str, language: &str) -> Result<Vec<TranscriptSegment>>;
}

/// Starts a browser process.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, settings: &BrowserSettings) -> Result<Box<dyn RunningBrowser>>;
}

/// A launched browser.
#[async_trait]
pub trait RunningBrowser: Send + Sync {
    /// Open a blank tab that sends `user_agent`.
    async fn new_page(&self, user_agent: &str) -> Result<Box<dyn TranscriptPage>>;

    /// Terminate the browser. Failures are logged, not returned.
    async fn close(&self);
}
