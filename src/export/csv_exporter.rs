use anyhow::Result;
use csv::WriterBuilder;
use std::path::Path;
use tracing::{debug, info};

use crate::extract::ReviewRecord;

/// Export records as CSV with a fixed header; returns the file size in bytes
pub async fn export_csv(records: &[ReviewRecord], output_path: &Path) -> Result<u64> {
    debug!("Exporting {} records to CSV: {}", records.len(), output_path.display());

    let body = to_csv(records)?;
    tokio::fs::write(output_path, body).await?;

    let file_size = tokio::fs::metadata(output_path).await?.len();

    info!("CSV export completed: {} records, {} bytes", records.len(), file_size);

    Ok(file_size)
}

/// Render records as CSV; absent fields become empty cells
pub fn to_csv(records: &[ReviewRecord]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    writer.write_record(ReviewRecord::FIELDS)?;

    for record in records {
        writer.write_record(record.values().iter().map(|v| v.unwrap_or_default()))?;
    }

    writer.flush()?;
    Ok(writer.into_inner().map_err(|e| anyhow::anyhow!("CSV buffer error: {}", e))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_export_csv_rows() {
        let file = NamedTempFile::new().unwrap();
        let records = vec![
            ReviewRecord {
                recommendation: Some("Ana recommends Harbor Coffee.".to_string()),
                author_title: Some("Ana".to_string()),
                review_text: Some("Line one\nLine two, with \"quotes\"".to_string()),
                ..ReviewRecord::default()
            },
            ReviewRecord::default(),
        ];

        export_csv(&records, file.path()).await.unwrap();

        let mut reader = csv::Reader::from_path(file.path()).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, ReviewRecord::FIELDS.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Ana");
        assert_eq!(&rows[0][2], "");
        assert_eq!(&rows[0][3], "Line one\nLine two, with \"quotes\"");
        assert!(rows[1].iter().all(str::is_empty));
    }

    #[test]
    fn test_header_only_when_empty() {
        let bytes = to_csv(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "recommendation,author_title,author_image,review_text,review_link,date\n"
        );
    }
}
