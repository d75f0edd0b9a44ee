use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

use crate::extract::ReviewRecord;

/// Export records as a JSON array; returns the file size in bytes
pub async fn export_json(records: &[ReviewRecord], output_path: &Path, pretty: bool) -> Result<u64> {
    debug!("Exporting {} records to JSON: {}", records.len(), output_path.display());

    let body = to_json(records, pretty)?;
    tokio::fs::write(output_path, body).await?;

    let file_size = tokio::fs::metadata(output_path).await?.len();

    info!("JSON export completed: {} records, {} bytes", records.len(), file_size);

    Ok(file_size)
}

/// Serialize records; absent fields are written as `null`
pub fn to_json(records: &[ReviewRecord], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_export_json_array() {
        let file = NamedTempFile::new().unwrap();
        let records = vec![
            ReviewRecord {
                author_title: Some("Ana".to_string()),
                date: Some("3 March 2025".to_string()),
                ..ReviewRecord::default()
            },
            ReviewRecord::default(),
        ];

        let size = export_json(&records, file.path(), true).await.unwrap();
        assert!(size > 0);

        let written: Value = serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        let array = written.as_array().unwrap();
        assert_eq!(array.len(), 2);

        let first = array[0].as_object().unwrap();
        let mut keys: Vec<&str> = first.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = ReviewRecord::FIELDS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(first["author_title"], "Ana");
        assert!(first["author_image"].is_null());
        assert!(array[1].as_object().unwrap().values().all(Value::is_null));
    }

    #[test]
    fn test_compact_and_empty() {
        assert_eq!(to_json(&[], false).unwrap(), "[]");

        let compact = to_json(&[ReviewRecord::default()], false).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"review_text\":null"));
    }
}
