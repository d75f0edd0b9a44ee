//! Review extraction for social-network business pages.
//!
//! A run probes the page, loads its reviews tab in a browser, scrolls until
//! enough review cards have rendered and turns each card into a
//! [`ReviewRecord`]:
//! - [`extract`]: per-card field extraction and date normalization
//! - [`scraper`]: browser seams, reachability probe and the scroll loop
//! - [`core`]: the pipeline that ties a run together
//! - [`export`]: JSON and CSV output

pub mod core;
pub mod config;
pub mod scraper;
pub mod extract;
pub mod export;
pub mod utils;
pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use crate::core::ReviewPipeline;
pub use crate::config::AppConfig;
pub use crate::error::{ReviewScrapeError, ReviewScrapeResult};
pub use crate::extract::ReviewRecord;
