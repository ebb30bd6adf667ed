//! Configuration settings for Tekst.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub browser: BrowserSettings,
    pub metadata: MetadataSettings,
    pub pagination: PaginationSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Headless browser settings used by the transcript extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run Chrome without a window.
    pub headless: bool,
    /// Path to a Chrome/Chromium executable. Auto-detected when unset.
    pub chrome_path: Option<String>,
    /// User agent sent by every page.
    pub user_agent: String,
    /// Keep Chrome's sandbox enabled. Containers usually need this off.
    pub sandbox: bool,
    /// Upper bound for loading the watch page.
    pub navigation_timeout_secs: u64,
    /// Pause before looking for the transcript button, so deferred rendering can finish.
    pub settle_delay_ms: u64,
    /// Upper bound for the transcript panel to render after the click.
    pub panel_timeout_secs: u64,
    /// How often to check for the transcript panel.
    pub poll_interval_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            sandbox: false,
            navigation_timeout_secs: 60,
            settle_delay_ms: 2000,
            panel_timeout_secs: 10,
            poll_interval_ms: 250,
        }
    }
}

impl BrowserSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn panel_timeout(&self) -> Duration {
        Duration::from_secs(self.panel_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Expanded Chrome executable path, if configured.
    pub fn chrome_executable(&self) -> Option<PathBuf> {
        self.chrome_path.as_deref().map(Settings::expand_path)
    }
}

/// Video metadata settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// yt-dlp binary name or path.
    pub ytdlp_path: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
        }
    }
}

/// Page sizes for cursor-based transcript reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    /// Characters per page of flat transcript text.
    pub text_page_size: usize,
    /// Segments per page of timed transcript.
    pub item_page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            text_page_size: 5000,
            item_page_size: 100,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TekstError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tekst")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.browser.headless);
        assert_eq!(settings.browser.navigation_timeout(), Duration::from_secs(60));
        assert_eq!(settings.browser.settle_delay(), Duration::from_millis(2000));
        assert_eq!(settings.browser.panel_timeout(), Duration::from_secs(10));
        assert_eq!(settings.pagination.text_page_size, 5000);
        assert_eq!(settings.pagination.item_page_size, 100);
        assert_eq!(settings.metadata.ytdlp_path, "yt-dlp");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[browser]\npanel_timeout_secs = 30\n\n[pagination]\ntext_page_size = 800").unwrap();

        let settings = Settings::load_from(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(settings.browser.panel_timeout_secs, 30);
        assert_eq!(settings.browser.navigation_timeout_secs, 60);
        assert_eq!(settings.pagination.text_page_size, 800);
        assert_eq!(settings.pagination.item_page_size, 100);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.general.log_level, "warn");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.browser.chrome_path = Some("/opt/chrome/chrome".to_string());
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.browser.chrome_executable(), Some(PathBuf::from("/opt/chrome/chrome")));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[browser\nheadless = ").unwrap();
        let err = Settings::load_from(Some(&file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, crate::error::TekstError::TomlParse(_)));
    }
}
