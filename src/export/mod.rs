use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod csv_exporter;
pub mod json_exporter;

use crate::config::ExportConfig;
use crate::extract::ReviewRecord;

/// Export manager for writing review records to disk
pub struct ExportManager {
    config: ExportConfig,
}

/// Export format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(anyhow::anyhow!("Invalid export format: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Export statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStats {
    pub format: ExportFormat,
    pub file_path: PathBuf,
    pub record_count: usize,
    pub file_size_bytes: u64,
    pub export_duration_ms: u64,
}

impl ExportManager {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Where an export lands when the caller gives no path
    pub fn default_path(&self, page_url: &str, format: ExportFormat) -> PathBuf {
        self.config
            .output_directory
            .join(crate::utils::export_filename(page_url, format.extension()))
    }

    /// Write records to `output_path` in the given format
    pub async fn export(
        &self,
        records: &[ReviewRecord],
        output_path: &Path,
        format: ExportFormat,
    ) -> Result<ExportStats> {
        info!("Exporting {} records to {} as {}", records.len(), output_path.display(), format);

        let start_time = std::time::Instant::now();

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file_size_bytes = match format {
            ExportFormat::Json => json_exporter::export_json(records, output_path, self.config.pretty).await?,
            ExportFormat::Csv => csv_exporter::export_csv(records, output_path).await?,
        };

        let stats = ExportStats {
            format,
            file_path: output_path.to_path_buf(),
            record_count: records.len(),
            file_size_bytes,
            export_duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Export completed: {} records in {}ms, file size: {} bytes",
            stats.record_count, stats.export_duration_ms, stats.file_size_bytes
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record() -> ReviewRecord {
        ReviewRecord {
            recommendation: Some("Ana recommends Harbor Coffee.".to_string()),
            author_title: Some("Ana".to_string()),
            author_image: None,
            review_text: Some("Great, \"strong\" coffee".to_string()),
            review_link: Some("https://www.facebook.com/harbor/posts/1".to_string()),
            date: Some("3 March 2025".to_string()),
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_default_path_uses_page_name() {
        let config = ExportConfig {
            output_directory: PathBuf::from("/tmp/exports"),
            ..ExportConfig::default()
        };
        let manager = ExportManager::new(&config);

        let path = manager.default_path("https://www.facebook.com/harborcoffee/", ExportFormat::Json);

        assert_eq!(path, PathBuf::from("/tmp/exports/harborcoffee_reviews.json"));
    }

    #[tokio::test]
    async fn test_export_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let manager = ExportManager::new(&ExportConfig::default());
        let path = dir.path().join("nested").join("reviews.csv");

        let stats = manager.export(&[record(), record()], &path, ExportFormat::Csv).await.unwrap();

        assert_eq!(stats.record_count, 2);
        assert!(stats.file_size_bytes > 0);
        assert!(path.exists());
    }
}
