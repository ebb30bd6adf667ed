//! Transcript command implementation.

use crate::browser::{BrowserSession, TranscriptExtractor};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::{format_transcript, OutputFormat};
use crate::youtube::resolve_url;
use anyhow::Result;
use std::sync::Arc;

/// Fetch one transcript and print or save it.
pub async fn run_transcript(
    input: &str,
    timed: bool,
    format: &str,
    output: Option<String>,
    lang: &str,
    settings: Settings,
) -> Result<()> {
    let mut format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    if timed && format == OutputFormat::Text {
        format = OutputFormat::Json;
    }

    let url = resolve_url(input)?;

    if let Err(e) = preflight::check(Operation::Transcript, &settings) {
        // Chrome may still be found in a platform install location off PATH.
        if settings.browser.chrome_path.is_some() {
            Output::error(&format!("{}", e));
            Output::info("Run 'tekst doctor' for detailed diagnostics.");
            return Err(e.into());
        }
        Output::warning(&format!("{}; trying default install locations", e));
    }

    let session = Arc::new(BrowserSession::new(settings.browser.clone()));
    let extractor = TranscriptExtractor::new(session.clone(), settings.browser.clone());

    let spinner = Output::spinner("Fetching transcript...");
    let result = extractor.extract(&url, lang).await;
    spinner.finish_and_clear();
    session.shutdown().await;

    let segments = result?;
    let rendered = format_transcript(&segments, &url, format);

    match output {
        Some(path) => {
            let path = Settings::expand_path(&path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)?;
            Output::success(&format!(
                "Wrote {} segments to {}",
                segments.len(),
                path.display()
            ));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
