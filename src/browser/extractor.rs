//! Transcript extraction from the video watch page.
//!
//! The page has no transcript API we can use, so this drives the UI: expand the
//! description, click "Show transcript", wait for the panel, read its rows.
//! Nothing is retried. A page that fails to render is reported as-is.

use super::{PageProvider, TranscriptPage, TranscriptSource};
use crate::config::BrowserSettings;
use crate::error::{Result, TekstError};
use crate::transcript::{segments_from_rows, RawSegmentRow, TranscriptSegment};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

const EXPAND_SELECTOR: &str = "#expand";
const SHOW_TRANSCRIPT_LABEL: &str = "Show transcript";
const ROW_SELECTOR: &str = "ytd-transcript-segment-renderer";
const TIMESTAMP_SELECTOR: &str = ".segment-timestamp";
const TEXT_SELECTOR: &str = ".segment-text";

/// Extracts timed transcripts, one fresh page per call.
pub struct TranscriptExtractor {
    pages: Arc<dyn PageProvider>,
    settings: BrowserSettings,
}

impl TranscriptExtractor {
    pub fn new(pages: Arc<dyn PageProvider>, settings: BrowserSettings) -> Self {
        Self { pages, settings }
    }

    /// Extract the transcript shown on the watch page at `url`.
    ///
    /// The page is closed whether or not extraction succeeds.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn extract(&self, url: &str, language: &str) -> Result<Vec<TranscriptSegment>> {
        debug!(language, "Opening page");
        let mut page = self.pages.open_page().await?;

        let outcome = self.read_panel(page.as_mut(), url).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }

        let segments = segments_from_rows(outcome?);
        info!(segments = segments.len(), "Transcript extracted");
        Ok(segments)
    }

    async fn read_panel(
        &self,
        page: &mut dyn TranscriptPage,
        url: &str,
    ) -> Result<Vec<RawSegmentRow>> {
        let nav_timeout = self.settings.navigation_timeout();
        match timeout(nav_timeout, page.navigate(url)).await {
            Ok(loaded) => loaded?,
            Err(_) => {
                return Err(TekstError::Navigation(format!(
                    "{} did not load within {}s",
                    url,
                    nav_timeout.as_secs()
                )))
            }
        }
        debug!("Page loaded");

        match page.click_selector(EXPAND_SELECTOR).await {
            Ok(true) => debug!("Expanded description"),
            Ok(false) => debug!("No description expander"),
            Err(e) => debug!("Ignoring description expander failure: {}", e),
        }

        sleep(self.settings.settle_delay()).await;

        if !page.click_button_containing(SHOW_TRANSCRIPT_LABEL).await? {
            return Err(TekstError::TranscriptUnavailable(
                "'Show transcript' control not found; captions may be disabled for this video"
                    .to_string(),
            ));
        }
        debug!("Opened transcript panel");

        self.wait_for_rows(page).await?;

        page.scrape_rows(ROW_SELECTOR, TIMESTAMP_SELECTOR, TEXT_SELECTOR)
            .await
    }

    async fn wait_for_rows(&self, page: &mut dyn TranscriptPage) -> Result<()> {
        let panel_timeout = self.settings.panel_timeout();
        let poll_interval = self.settings.poll_interval();

        let appeared = timeout(panel_timeout, async {
            loop {
                if page.count(ROW_SELECTOR).await? > 0 {
                    return Ok::<(), TekstError>(());
                }
                sleep(poll_interval).await;
            }
        })
        .await;

        match appeared {
            Ok(result) => result,
            Err(_) => Err(TekstError::TranscriptUnavailable(format!(
                "transcript panel did not render within {}s",
                panel_timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl TranscriptSource for TranscriptExtractor {
    async fn fetch_transcript(&self, url: &str, language: &str) -> Result<Vec<TranscriptSegment>> {
        self.extract(url, language).await
    }
}
