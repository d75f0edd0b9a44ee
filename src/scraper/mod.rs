//! Browser-facing side of a run: page access, reachability, scrolling.

pub mod browser;
pub mod http_client;
pub mod pagination;
pub mod selectors;

#[cfg(test)]
pub(crate) mod fixture;

pub use browser::{BrowserPage, PageProvider, PlaywrightProvider};
pub use http_client::{HttpClient, ProbeStatus, ReachabilityCheck};
pub use pagination::{PaginationOutcome, ScrollPaginator, StopReason};
pub use selectors::SelectorMap;

/// Markup of one review card, snapshotted in page order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewFragment {
    /// Zero-based position among the cards on the page
    pub position: usize,
    pub html: String,
}
