use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header::{HeaderMap, HeaderValue}, Client};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

use crate::config::ScrapingConfig;
use crate::error::{ReviewScrapeError, ReviewScrapeResult};

/// Outcome of probing a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStatus {
    pub status_code: u16,
    pub ok: bool,
}

/// Answers "is this page there?" before a browser is started.
///
/// `Err` means the probe itself failed at the network level.
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    async fn check(&self, url: &Url) -> Result<ProbeStatus>;
}

/// HTTP client used for the reachability probe
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(config: &ScrapingConfig) -> ReviewScrapeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"));
        headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ReviewScrapeError::network(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl ReachabilityCheck for HttpClient {
    async fn check(&self, url: &Url) -> Result<ProbeStatus> {
        let start = Instant::now();

        let response = self.client
            .get(url.as_str())
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        debug!(
            "Probe of {} returned {} in {}ms",
            url,
            status,
            start.elapsed().as_millis()
        );

        Ok(ProbeStatus {
            status_code: status.as_u16(),
            ok: status.is_success(),
        })
    }
}
