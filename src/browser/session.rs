//! Shared Chrome instance and its pages, over the DevTools protocol.

use super::{BrowserLauncher, PageProvider, RunningBrowser, TranscriptPage};
use crate::config::BrowserSettings;
use crate::error::{Result, TekstError};
use crate::transcript::RawSegmentRow;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::CloseParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, SetLifecycleEventsEnabledParams};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle events that count as "network activity has settled".
const IDLE_EVENTS: &[&str] = &["networkAlmostIdle", "networkIdle"];

/// The process-wide browser.
///
/// The browser is launched on the first [`open_page`](PageProvider::open_page) call.
/// Concurrent first callers wait on the same launch, so at most one browser
/// exists per session. A failed launch leaves the session empty and the next
/// call tries again. Pages are opened per request and never reused.
pub struct BrowserSession {
    settings: BrowserSettings,
    launcher: Box<dyn BrowserLauncher>,
    launched: OnceCell<Box<dyn RunningBrowser>>,
}

impl BrowserSession {
    /// A session that launches Chrome.
    pub fn new(settings: BrowserSettings) -> Self {
        Self::with_launcher(settings, ChromeLauncher)
    }

    pub fn with_launcher(settings: BrowserSettings, launcher: impl BrowserLauncher + 'static) -> Self {
        Self {
            settings,
            launcher: Box::new(launcher),
            launched: OnceCell::new(),
        }
    }

    /// Whether the browser has been launched yet.
    pub fn is_running(&self) -> bool {
        self.launched.initialized()
    }

    /// Close the browser if it was ever launched.
    pub async fn shutdown(&self) {
        if let Some(browser) = self.launched.get() {
            info!("Closing browser");
            browser.close().await;
        }
    }

    async fn browser(&self) -> Result<&dyn RunningBrowser> {
        let launched = self
            .launched
            .get_or_try_init(|| self.launcher.launch(&self.settings))
            .await?;
        Ok(&**launched)
    }
}

#[async_trait]
impl PageProvider for BrowserSession {
    async fn open_page(&self) -> Result<Box<dyn TranscriptPage>> {
        let browser = self.browser().await?;
        browser.new_page(&self.settings.user_agent).await
    }
}

/// Launches a local Chrome/Chromium.
pub struct ChromeLauncher;

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, settings: &BrowserSettings) -> Result<Box<dyn RunningBrowser>> {
        let mut builder = BrowserConfig::builder().arg("--disable-dev-shm-usage");
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox().arg("--disable-setuid-sandbox");
        }
        if let Some(path) = settings.chrome_executable() {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(TekstError::Browser)?;

        info!(headless = settings.headless, "Launching browser");
        let (browser, mut handler) = Browser::launch(config).await?;

        // The handler drives the CDP connection and must be polled for the browser to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser connection event error: {}", e);
                }
            }
            debug!("Browser connection closed");
        });

        Ok(Box::new(Chrome { browser, handler }))
    }
}

struct Chrome {
    browser: Browser,
    handler: JoinHandle<()>,
}

#[async_trait]
impl RunningBrowser for Chrome {
    async fn new_page(&self, user_agent: &str) -> Result<Box<dyn TranscriptPage>> {
        let page = self.browser.new_page("about:blank").await?;

        let configured = page
            .set_user_agent(SetUserAgentOverrideParams::new(user_agent.to_string()))
            .await
            .map(|_| ());
        if let Err(e) = configured {
            let _ = page.close().await;
            return Err(e.into());
        }

        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) {
        if let Err(e) = self.browser.execute(CloseParams::default()).await {
            warn!("Browser did not close cleanly: {}", e);
        }
        self.handler.abort();
    }
}

/// One lifecycle event, reduced to what the idle wait needs.
#[derive(Debug, Clone, PartialEq)]
struct LifecycleSignal {
    main_frame: bool,
    name: String,
}

/// Wait until the main frame's new document reports network idle.
///
/// Events before the main frame's `init` belong to the previous document and
/// are skipped. Callers bound this with the navigation timeout.
async fn wait_for_network_idle<S>(events: S) -> Result<()>
where
    S: Stream<Item = LifecycleSignal>,
{
    let mut events = std::pin::pin!(events);
    let mut committed = false;

    while let Some(signal) = events.next().await {
        if !signal.main_frame {
            continue;
        }
        match signal.name.as_str() {
            "init" => committed = true,
            name if committed && IDLE_EVENTS.contains(&name) => return Ok(()),
            _ => {}
        }
    }

    Err(TekstError::Navigation(
        "page closed before network activity settled".to_string(),
    ))
}

/// A Chrome tab. All DOM work runs as page-side JavaScript.
struct ChromiumPage {
    page: Page,
}

#[derive(Debug, Deserialize)]
struct ScrapedRow {
    timestamp: Option<String>,
    text: Option<String>,
}

impl ChromiumPage {
    async fn evaluate<T: DeserializeOwned>(&self, expression: String) -> Result<T> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(TekstError::Browser)?;
        let result = self.page.evaluate_expression(params).await?;
        Ok(result.into_value()?)
    }
}

/// Quote a value as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

const NAVIGATION_STATUS_JS: &str = "(() => {
    const entry = performance.getEntriesByType('navigation')[0];
    return entry && entry.responseStatus ? entry.responseStatus : 0;
})()";

#[async_trait]
impl TranscriptPage for ChromiumPage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let failed = |e: CdpError| TekstError::Navigation(format!("{}: {}", url, e));

        self.page
            .execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(failed)?;
        // Subscribe before navigating; events buffer until read.
        let events = self
            .page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(failed)?;

        self.page.goto(url).await.map_err(failed)?;

        let main_frame = self.page.mainframe().await.map_err(failed)?;
        let signals = events.map(move |event| LifecycleSignal {
            main_frame: main_frame.as_ref() == Some(&event.frame_id),
            name: event.name.clone(),
        });
        wait_for_network_idle(signals).await?;
        debug!("Network idle");

        let status: u32 = self.evaluate(NAVIGATION_STATUS_JS.to_string()).await?;
        if status >= 400 {
            return Err(TekstError::Navigation(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }
        Ok(())
    }

    async fn click_selector(&mut self, selector: &str) -> Result<bool> {
        let js = format!(
            "(() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.click();
                return true;
            }})()",
            js_string(selector)
        );
        self.evaluate(js).await
    }

    async fn click_button_containing(&mut self, label: &str) -> Result<bool> {
        let js = format!(
            "(() => {{
                const label = {};
                const button = Array.from(document.querySelectorAll('button'))
                    .find(b => (b.textContent || '').includes(label));
                if (!button) return false;
                button.click();
                return true;
            }})()",
            js_string(label)
        );
        self.evaluate(js).await
    }

    async fn count(&mut self, selector: &str) -> Result<usize> {
        let js = format!("document.querySelectorAll({}).length", js_string(selector));
        self.evaluate(js).await
    }

    async fn scrape_rows(
        &mut self,
        row_selector: &str,
        timestamp_selector: &str,
        text_selector: &str,
    ) -> Result<Vec<RawSegmentRow>> {
        let js = format!(
            "Array.from(document.querySelectorAll({})).map(el => ({{
                timestamp: el.querySelector({})?.textContent ?? null,
                text: el.querySelector({})?.textContent ?? null,
            }}))",
            js_string(row_selector),
            js_string(timestamp_selector),
            js_string(text_selector)
        );
        let rows: Vec<ScrapedRow> = self.evaluate(js).await?;

        Ok(rows
            .into_iter()
            .map(|row| RawSegmentRow::from_labels(row.timestamp, row.text))
            .collect())
    }

    async fn close(&mut self) -> Result<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}
