//! Doctor command - verify system requirements and configuration.

use crate::cli::preflight::CHROME_CANDIDATES;
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Tekst Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Browser").bold());
    let chrome = check_chrome(settings);
    chrome.print();
    checks.push(chrome);
    let sandbox = check_sandbox(settings);
    sandbox.print();
    checks.push(sandbox);

    println!();

    println!("{}", style("Metadata").bold());
    let ytdlp = check_tool("yt-dlp", &settings.metadata.ytdlp_path, install_hint_ytdlp());
    ytdlp.print();
    checks.push(ytdlp);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Tekst.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Tekst is ready to use.");
    }

    Ok(())
}

/// Check if an external tool answers `--version`.
fn check_tool(name: &str, binary: &str, hint: &str) -> CheckResult {
    match Command::new(binary).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check the configured Chrome, or the first candidate found on PATH.
fn check_chrome(settings: &Settings) -> CheckResult {
    if let Some(path) = settings.browser.chrome_executable() {
        return if path.exists() {
            check_tool("Chrome", &path.to_string_lossy(), install_hint_chrome())
        } else {
            CheckResult::error(
                "Chrome",
                &format!("{} does not exist", path.display()),
                "Fix browser.chrome_path or remove it to auto-detect",
            )
        };
    }

    CHROME_CANDIDATES
        .iter()
        .map(|candidate| check_tool("Chrome", candidate, install_hint_chrome()))
        .find(|check| check.status == CheckStatus::Ok)
        .unwrap_or_else(|| {
            CheckResult::error(
                "Chrome",
                &format!("none of {} found", CHROME_CANDIDATES.join(", ")),
                install_hint_chrome(),
            )
        })
}

fn check_sandbox(settings: &Settings) -> CheckResult {
    if settings.browser.sandbox {
        CheckResult::ok("Sandbox", "enabled")
    } else {
        CheckResult::warning(
            "Sandbox",
            "disabled",
            "Set browser.sandbox = true when not running in a container",
        )
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: tekst config init",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for Chrome.
fn install_hint_chrome() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install Google Chrome, then set browser.chrome_path to the app binary"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install chromium (or your package manager)"
    } else {
        "Install from: https://www.google.com/chrome/"
    }
}
