/// Utility functions and helpers

/// Format file size in human readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    const THRESHOLD: u64 = 1024;

    if bytes < THRESHOLD {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD as f64 && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD as f64;
        unit_index += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_index])
}

/// Format duration in human readable format
pub fn format_duration(duration: std::time::Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        format!("{}m {}s", total_seconds / 60, total_seconds % 60)
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        format!("{}h {}m {}s", hours, minutes, total_seconds % 60)
    }
}

/// Extract domain from URL
pub fn extract_domain(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|s| s.to_string())
}

/// Sanitize filename for filesystem
pub fn sanitize_filename(filename: &str) -> String {
    let invalid_chars = ['<', '>', ':', '"', '|', '?', '*', '/', '\\'];
    let mut sanitized = filename.to_string();

    for &ch in &invalid_chars {
        sanitized = sanitized.replace(ch, "_");
    }

    if sanitized.len() > 200 {
        let mut cut = 200;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
    }

    sanitized
}

/// `<page>_reviews.<ext>`, named after the last path segment of the page URL
/// or its host when the path is empty
pub fn export_filename(page_url: &str, extension: &str) -> String {
    let name = url::Url::parse(page_url.trim())
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| {
                    segments
                        .filter(|s| !s.is_empty() && *s != "reviews")
                        .last()
                        .map(str::to_string)
                })
        })
        .or_else(|| extract_domain(page_url))
        .unwrap_or_else(|| "page".to_string());

    format!("{}_reviews.{}", sanitize_filename(&name), extension)
}
