//! Info command implementation.

use crate::cli::output::{content_preview, format_count, format_duration};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::metadata::{MetadataSource, VideoInfo, YtDlp};
use crate::youtube::resolve_url;
use anyhow::Result;

/// Print metadata for one video.
pub async fn run_info(input: &str, json: bool, settings: Settings) -> Result<()> {
    let url = resolve_url(input)?;

    if let Err(e) = preflight::check(Operation::Info, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tekst doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let spinner = Output::spinner("Fetching video info...");
    let result = YtDlp::new(settings.metadata.ytdlp_path.clone()).fetch_info(&url).await;
    spinner.finish_and_clear();
    let info = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_info(&info, &url);
    }

    Ok(())
}

fn print_info(info: &VideoInfo, url: &str) {
    Output::header(info.title.as_deref().unwrap_or("(untitled)"));
    Output::kv("URL", url);
    if let Some(author) = &info.author {
        Output::kv("Author", author);
    }
    if let Some(date) = info.published_on() {
        Output::kv("Published", &date.format("%Y-%m-%d").to_string());
    } else if let Some(raw) = &info.publish_date {
        Output::kv("Published", raw);
    }
    if let Some(length) = info.length_seconds {
        Output::kv("Length", &format_duration(length));
    }
    if let Some(views) = info.view_count {
        Output::kv("Views", &format_count(views));
    }
    if let Some(keywords) = info.keywords.as_ref().filter(|k| !k.is_empty()) {
        Output::kv("Keywords", &keywords.join(", "));
    }
    if let Some(description) = info.description.as_deref().filter(|d| !d.is_empty()) {
        Output::kv("Description", &content_preview(description, 200));
    }
}
