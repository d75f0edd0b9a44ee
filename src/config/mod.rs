use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::logging::LoggingConfig;
use crate::scraper::selectors::SelectorMap;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraping: ScrapingConfig,
    pub pagination: PaginationConfig,
    pub selectors: SelectorMap,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    pub headless: bool,
    pub browser_timeout_seconds: u64,
    /// Appended to the page URL before navigation
    pub reviews_path_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub scroll_settle_ms: u64,
    pub expand_pause_ms: u64,
    pub login_dismiss_timeout_ms: u64,
    /// Extra fragments requested beyond the caller's count
    pub overcollect_margin: usize,
    /// Leading records dropped from every run; the first card on the page is a container
    pub leading_skip: usize,
    pub max_scroll_iterations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub default_format: String,
    pub output_directory: PathBuf,
    pub pretty: bool,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            headless: true,
            browser_timeout_seconds: 60,
            reviews_path_suffix: "/reviews".to_string(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            scroll_settle_ms: 3000,
            expand_pause_ms: 1000,
            login_dismiss_timeout_ms: 5000,
            overcollect_margin: 2,
            leading_skip: 1,
            max_scroll_iterations: 200,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: "json".to_string(),
            output_directory: get_data_directory().join("exports"),
            pretty: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults
    pub async fn load() -> Result<Self> {
        let config_path = get_config_path();

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            info!("No configuration file found, using defaults");
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from specific file
    pub async fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_toml(&content)?;

        info!("Configuration loaded from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to default location
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&config_path, self.to_toml()?).await?;

        info!("Configuration saved to: {}", config_path.display());
        Ok(config_path)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scraping.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Scraping request_timeout_seconds must be > 0"));
        }

        if self.scraping.browser_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Scraping browser_timeout_seconds must be > 0"));
        }

        if self.pagination.max_scroll_iterations == 0 {
            return Err(anyhow::anyhow!("Pagination max_scroll_iterations must be > 0"));
        }

        if self.export.default_format.parse::<crate::export::ExportFormat>().is_err() {
            return Err(anyhow::anyhow!(
                "Export default_format must be json or csv, got '{}'",
                self.export.default_format
            ));
        }

        self.selectors.compile()?;

        Ok(())
    }
}

/// Get the default data directory
fn get_data_directory() -> PathBuf {
    directories::ProjectDirs::from("com", "fbreview", "scraper")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("data"))
}

/// Get the configuration file path
pub fn get_config_path() -> PathBuf {
    directories::ProjectDirs::from("com", "fbreview", "scraper")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("config.toml"))
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        Self::apply_from(config, |key| std::env::var(key).ok());
    }

    fn apply_from(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("FBR_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(settle) = lookup("FBR_SCROLL_SETTLE_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.pagination.scroll_settle_ms = settle;
        }

        if let Some(limit) = lookup("FBR_MAX_SCROLL_ITERATIONS").and_then(|v| v.parse::<usize>().ok()) {
            config.pagination.max_scroll_iterations = limit;
        }

        if let Some(headless) = lookup("FBR_HEADLESS") {
            config.scraping.headless = headless.to_lowercase() == "true";
        }

        if let Some(dir) = lookup("FBR_OUTPUT_DIR") {
            config.export.output_directory = PathBuf::from(dir);
        }
    }
}
