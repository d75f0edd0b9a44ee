use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::browser::BrowserPage;
use super::selectors::SelectorMap;
use super::ReviewFragment;
use crate::config::PaginationConfig;

/// Why the scroll loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    /// Scrolling no longer grew the page
    HeightStable,
    IterationLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::TargetReached => "target_reached",
            StopReason::HeightStable => "height_stable",
            StopReason::IterationLimit => "iteration_limit",
        }
    }
}

/// Fragments collected by one scroll loop, in page order
#[derive(Debug)]
pub struct PaginationOutcome {
    pub fragments: Vec<ReviewFragment>,
    pub iterations: usize,
    pub stop_reason: StopReason,
}

struct PaginationState {
    last_page_height: i64,
    collected_fragment_count: usize,
}

/// Drives infinite scroll until enough review cards are on the page
pub struct ScrollPaginator<'a> {
    config: &'a PaginationConfig,
    selectors: &'a SelectorMap,
}

impl<'a> ScrollPaginator<'a> {
    pub fn new(config: &'a PaginationConfig, selectors: &'a SelectorMap) -> Self {
        Self { config, selectors }
    }

    /// Scroll until `target_count` cards are present or the page stops
    /// growing, then snapshot at most `target_count` cards.
    pub async fn collect<P: BrowserPage>(&self, page: &mut P, target_count: usize) -> Result<PaginationOutcome> {
        let settle = Duration::from_millis(self.config.scroll_settle_ms);

        let mut state = PaginationState {
            last_page_height: page.scroll_height().await?,
            collected_fragment_count: 0,
        };
        let mut iterations = 0;

        let stop_reason = loop {
            if state.collected_fragment_count >= target_count {
                break StopReason::TargetReached;
            }
            if iterations >= self.config.max_scroll_iterations {
                warn!(
                    "Stopping after {} scroll iterations with {} of {} cards",
                    iterations, state.collected_fragment_count, target_count
                );
                break StopReason::IterationLimit;
            }
            iterations += 1;

            page.scroll_to_bottom().await?;
            tokio::time::sleep(settle).await;

            let height = page.scroll_height().await?;
            if height == state.last_page_height {
                debug!("Page height settled at {}", height);
                break StopReason::HeightStable;
            }
            state.last_page_height = height;

            self.expand_truncated(page).await;

            state.collected_fragment_count = self.find_cards(page).await?.len();
            debug!(
                iteration = iterations,
                height = height,
                cards = state.collected_fragment_count,
                "Scrolled review page"
            );
        };

        let cards = self.find_cards(page).await?;
        let mut fragments = Vec::with_capacity(cards.len().min(target_count));

        for (position, card) in cards.iter().take(target_count).enumerate() {
            let html = match page.fragment_html(card).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Could not read review card {}: {}", position, e);
                    String::new()
                }
            };
            fragments.push(ReviewFragment { position, html });
        }

        info!(
            "Collected {} review cards in {} iterations ({})",
            fragments.len(),
            iterations,
            stop_reason.as_str()
        );

        Ok(PaginationOutcome {
            fragments,
            iterations,
            stop_reason,
        })
    }

    /// All review cards, using the first candidate selector that matches anything
    async fn find_cards<P: BrowserPage>(&self, page: &mut P) -> Result<Vec<P::Element>> {
        for selector in &self.selectors.review_card {
            let cards = page.find_all(selector).await?;
            if !cards.is_empty() {
                return Ok(cards);
            }
        }
        Ok(Vec::new())
    }

    /// Click every "See more" once; failures are logged and skipped
    async fn expand_truncated<P: BrowserPage>(&self, page: &mut P) {
        let pause = Duration::from_millis(self.config.expand_pause_ms);

        for selector in &self.selectors.see_more {
            let buttons = match page.find_all(selector).await {
                Ok(buttons) => buttons,
                Err(e) => {
                    warn!("Could not look up expand buttons: {}", e);
                    continue;
                }
            };

            for button in &buttons {
                if let Err(e) = page.click(button).await {
                    warn!("Failed to expand review text: {}", e);
                    continue;
                }
                tokio::time::sleep(pause).await;
            }
        }
    }
}
