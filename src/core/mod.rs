use chrono::{Datelike, Local, NaiveDateTime};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::error::{ReviewScrapeError, ReviewScrapeResult};
use crate::extract::{RecordExtractor, ReviewRecord};
use crate::logging::{LogContext, PerformanceLogger, RequestIdGenerator};
use crate::scraper::{BrowserPage, PageProvider, ReachabilityCheck, ScrollPaginator};

/// Runs one review extraction end to end: probe, open a page, scroll,
/// extract, trim.
pub struct ReviewPipeline<C, B> {
    config: AppConfig,
    extractor: RecordExtractor,
    checker: C,
    browser: B,
}

impl<C, B> ReviewPipeline<C, B>
where
    C: ReachabilityCheck,
    B: PageProvider,
{
    pub fn new(config: AppConfig, checker: C, browser: B) -> ReviewScrapeResult<Self> {
        let extractor = RecordExtractor::new(config.selectors.compile()?);

        Ok(Self {
            config,
            extractor,
            checker,
            browser,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The reviews address for a page URL
    pub fn reviews_url(&self, page_url: &str) -> ReviewScrapeResult<Url> {
        let invalid = || ReviewScrapeError::InvalidUrl { url: page_url.to_string() };

        let mut url = Url::parse(page_url.trim()).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(invalid());
        }

        let suffix = &self.config.scraping.reviews_path_suffix;
        let base = url.path().trim_end_matches('/').to_string();
        if !base.ends_with(suffix.as_str()) {
            url.set_path(&format!("{}{}", base, suffix));
        }

        Ok(url)
    }

    /// Extract up to `requested_count` reviews from the page at `page_url`
    pub async fn run(&self, page_url: &str, requested_count: usize) -> ReviewScrapeResult<Vec<ReviewRecord>> {
        self.run_at(page_url, requested_count, Local::now().naive_local()).await
    }

    /// [`ReviewPipeline::run`] with an explicit clock for relative dates
    pub async fn run_at(
        &self,
        page_url: &str,
        requested_count: usize,
        now: NaiveDateTime,
    ) -> ReviewScrapeResult<Vec<ReviewRecord>> {
        let context = LogContext::new("pipeline", "run")
            .with_request_id(RequestIdGenerator::generate())
            .with_url(page_url)
            .with_number_field("requested", requested_count as i64);
        let perf = PerformanceLogger::new(context);
        let start = perf.context().clone();
        crate::log_info!(start, "Starting review extraction");

        match self.execute(page_url, requested_count, now, perf.context()).await {
            Ok(records) => {
                perf.finish_with_status(&format!("Extracted {} reviews", records.len()), "ok");
                Ok(records)
            }
            Err(e) => {
                perf.finish_with_error("Review extraction failed", &e);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        page_url: &str,
        requested_count: usize,
        now: NaiveDateTime,
        context: &LogContext,
    ) -> ReviewScrapeResult<Vec<ReviewRecord>> {
        let url = self.reviews_url(page_url)?;

        if requested_count == 0 {
            return Ok(Vec::new());
        }

        self.ensure_reachable(&url).await?;

        let mut page = self.browser
            .open_page()
            .await
            .map_err(|e| ReviewScrapeError::browser(e.to_string()))?;

        let result = self.scrape_page(&mut page, &url, requested_count, now).await;

        if let Err(e) = page.close().await {
            let ctx = context
                .clone()
                .with_error_category("browser")
                .with_string_field("error", e.to_string());
            crate::log_warn!(ctx, "Failed to release browser page");
        }

        result
    }

    async fn ensure_reachable(&self, url: &Url) -> ReviewScrapeResult<()> {
        match self.checker.check(url).await {
            Ok(status) if status.ok => Ok(()),
            Ok(status) => Err(ReviewScrapeError::UnreachableTarget {
                url: url.to_string(),
                status: Some(status.status_code),
            }),
            Err(e) => {
                warn!("Reachability probe failed for {}: {}", url, e);
                Err(ReviewScrapeError::UnreachableTarget {
                    url: url.to_string(),
                    status: None,
                })
            }
        }
    }

    async fn scrape_page<P: BrowserPage>(
        &self,
        page: &mut P,
        url: &Url,
        requested_count: usize,
        now: NaiveDateTime,
    ) -> ReviewScrapeResult<Vec<ReviewRecord>> {
        let pagination = &self.config.pagination;
        let browser_err = |e: anyhow::Error| ReviewScrapeError::browser(e.to_string());

        page.navigate(url.as_str()).await.map_err(browser_err)?;

        self.dismiss_login(page).await;

        let target = requested_count + pagination.overcollect_margin;
        let outcome = ScrollPaginator::new(pagination, &self.config.selectors)
            .collect(page, target)
            .await
            .map_err(browser_err)?;

        let records = self.extractor.extract_all(&outcome.fragments, now.year(), now);

        let trimmed: Vec<ReviewRecord> = records
            .into_iter()
            .skip(pagination.leading_skip)
            .take(requested_count)
            .collect();

        info!(
            "Kept {} of {} requested reviews (stop: {}, iterations: {})",
            trimmed.len(),
            requested_count,
            outcome.stop_reason.as_str(),
            outcome.iterations
        );

        Ok(trimmed)
    }

    /// Close the login interstitial if one shows up
    async fn dismiss_login<P: BrowserPage>(&self, page: &mut P) {
        let timeout = Duration::from_millis(self.config.pagination.login_dismiss_timeout_ms);

        for selector in &self.config.selectors.login_dismiss {
            match page.find_one(selector, timeout).await {
                Ok(Some(button)) => match page.click(&button).await {
                    Ok(()) => {
                        info!("Dismissed login prompt");
                        return;
                    }
                    Err(e) => warn!("Could not dismiss login prompt: {}", e),
                },
                Ok(None) => {}
                Err(e) => warn!("Login prompt lookup failed: {}", e),
            }
        }
    }
}
