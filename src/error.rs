use thiserror::Error;

/// Error types for a review scraping run
#[derive(Error, Debug)]
pub enum ReviewScrapeError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid selector for {role}: {selector}")]
    Selector { role: String, selector: String },

    #[error("Invalid page URL: {url}")]
    InvalidUrl { url: String },

    // Network errors
    #[error("Target unreachable: {url}{}", status_suffix(.status))]
    UnreachableTarget { url: String, status: Option<u16> },

    #[error("Network error: {message}")]
    Network { message: String },

    // Browser errors
    #[error("Browser error: {message}")]
    Browser { message: String },

    // Export errors
    #[error("Export error: {message}")]
    Export { message: String },

    #[error("File write failed: {path}")]
    FileWrite { path: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ReviewScrapeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Create a browser error
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser { message: message.into() }
    }

    /// Create an export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export { message: message.into() }
    }

    /// Errors whose message is meant to be shown to the person who started the run
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::UnreachableTarget { .. } | Self::InvalidUrl { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } | Self::Selector { .. } => "configuration",
            Self::InvalidUrl { .. } => "input",
            Self::UnreachableTarget { .. } | Self::Network { .. } => "network",
            Self::Browser { .. } => "browser",
            Self::Export { .. } | Self::FileWrite { .. } => "export",
            Self::Internal { .. } => "internal",
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

/// Result type alias for review scraping
pub type ReviewScrapeResult<T> = std::result::Result<T, ReviewScrapeError>;

/// Convert anyhow::Error to ReviewScrapeError
impl From<anyhow::Error> for ReviewScrapeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ReviewScrapeError::config("Invalid setting");
        assert_eq!(error.category(), "configuration");
        assert!(!error.is_user_facing());
    }

    #[test]
    fn test_unreachable_message() {
        let error = ReviewScrapeError::UnreachableTarget {
            url: "https://example.com/reviews".to_string(),
            status: Some(404),
        };
        assert_eq!(error.category(), "network");
        assert!(error.is_user_facing());
        assert_eq!(
            error.to_string(),
            "Target unreachable: https://example.com/reviews (status 404)"
        );

        let fault = ReviewScrapeError::UnreachableTarget {
            url: "http://nonexistent.invalid".to_string(),
            status: None,
        };
        assert_eq!(fault.to_string(), "Target unreachable: http://nonexistent.invalid");
    }

    #[test]
    fn test_from_anyhow() {
        let error: ReviewScrapeError = anyhow::anyhow!("boom").into();
        assert_eq!(error.category(), "internal");
        assert!(error.to_string().contains("boom"));
    }
}
