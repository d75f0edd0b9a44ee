use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A loaded, scrollable page owned by one pipeline run.
///
/// Selectors are passed through to the browser's own selector engine.
#[async_trait]
pub trait BrowserPage: Send {
    type Element: Send + Sync;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn scroll_height(&mut self) -> Result<i64>;

    async fn scroll_to_bottom(&mut self) -> Result<()>;

    async fn find_all(&mut self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Wait up to `timeout` for an element to appear
    async fn find_one(&mut self, selector: &str, timeout: Duration) -> Result<Option<Self::Element>>;

    async fn click(&mut self, element: &Self::Element) -> Result<()>;

    /// Markup of the element's subtree
    async fn fragment_html(&mut self, element: &Self::Element) -> Result<String>;

    async fn close(&mut self) -> Result<()>;
}

/// Hands out fresh pages
#[async_trait]
pub trait PageProvider: Send + Sync {
    type Page: BrowserPage;

    async fn open_page(&self) -> Result<Self::Page>;
}

#[cfg(feature = "browser")]
pub use self::playwright_backend::{PlaywrightElement, PlaywrightPage, PlaywrightProvider};

#[cfg(feature = "browser")]
mod playwright_backend {
    use super::*;
    use playwright::api::{Browser, ElementHandle, Page, Viewport};
    use playwright::Playwright;
    use tracing::{debug, warn};

    use crate::config::ScrapingConfig;

    /// Launches headless Chromium through Playwright
    pub struct PlaywrightProvider {
        config: ScrapingConfig,
        playwright: Playwright,
    }

    // Ensure the provider is Send + Sync
    unsafe impl Send for PlaywrightProvider {}
    unsafe impl Sync for PlaywrightProvider {}

    impl PlaywrightProvider {
        pub async fn new(config: &ScrapingConfig) -> Result<Self> {
            debug!("Initializing Playwright");

            let playwright = Playwright::initialize().await?;
            playwright.prepare()?;

            Ok(Self {
                config: config.clone(),
                playwright,
            })
        }
    }

    #[async_trait]
    impl PageProvider for PlaywrightProvider {
        type Page = PlaywrightPage;

        async fn open_page(&self) -> Result<PlaywrightPage> {
            let browser = self.playwright
                .chromium()
                .launcher()
                .headless(self.config.headless)
                .launch()
                .await?;

            let context = browser
                .context_builder()
                .user_agent(&self.config.user_agent)
                .viewport(Some(Viewport { width: 1920, height: 1080 }))
                .build()
                .await?;

            let page = context.new_page().await?;
            page.set_default_timeout((self.config.browser_timeout_seconds * 1000) as u32).await?;

            Ok(PlaywrightPage { browser, page })
        }
    }

    /// One Chromium instance with a single page
    pub struct PlaywrightPage {
        browser: Browser,
        page: Page,
    }

    // Playwright handles are driven from a single task for the whole run
    unsafe impl Send for PlaywrightPage {}
    unsafe impl Sync for PlaywrightPage {}

    /// Element handle tied to a [`PlaywrightPage`]
    pub struct PlaywrightElement(ElementHandle);

    unsafe impl Send for PlaywrightElement {}
    unsafe impl Sync for PlaywrightElement {}

    #[async_trait]
    impl BrowserPage for PlaywrightPage {
        type Element = PlaywrightElement;

        async fn navigate(&mut self, url: &str) -> Result<()> {
            debug!("Navigating to {}", url);
            self.page.goto_builder(url).goto().await?;
            Ok(())
        }

        async fn scroll_height(&mut self) -> Result<i64> {
            let height: serde_json::Value = self.page
                .evaluate::<(), serde_json::Value>("document.body.scrollHeight", ())
                .await?;
            Ok(height.as_i64().unwrap_or(0))
        }

        async fn scroll_to_bottom(&mut self) -> Result<()> {
            self.page
                .evaluate::<(), serde_json::Value>("window.scrollTo(0, document.body.scrollHeight)", ())
                .await?;
            Ok(())
        }

        async fn find_all(&mut self, selector: &str) -> Result<Vec<PlaywrightElement>> {
            let handles = self.page.query_selector_all(selector).await?;
            Ok(handles.into_iter().map(PlaywrightElement).collect())
        }

        async fn find_one(&mut self, selector: &str, timeout: Duration) -> Result<Option<PlaywrightElement>> {
            let found = self.page
                .wait_for_selector_builder(selector)
                .timeout(timeout.as_millis() as f64)
                .wait_for_selector()
                .await?;
            Ok(found.map(PlaywrightElement))
        }

        async fn click(&mut self, element: &PlaywrightElement) -> Result<()> {
            element.0.click_builder().click().await?;
            Ok(())
        }

        async fn fragment_html(&mut self, element: &PlaywrightElement) -> Result<String> {
            Ok(element.0.inner_html().await?)
        }

        async fn close(&mut self) -> Result<()> {
            if let Err(e) = self.browser.close().await {
                warn!("Failed to close browser: {}", e);
                return Err(e.into());
            }
            Ok(())
        }
    }
}

/// Stand-in when the browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct PlaywrightProvider;

#[cfg(not(feature = "browser"))]
impl PlaywrightProvider {
    /// Succeeds so the reachability probe still runs; pages cannot be opened
    pub async fn new(_config: &crate::config::ScrapingConfig) -> Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(feature = "browser"))]
pub struct DisabledPage;

#[cfg(not(feature = "browser"))]
#[async_trait]
impl BrowserPage for DisabledPage {
    type Element = ();

    async fn navigate(&mut self, _url: &str) -> Result<()> {
        Err(anyhow::anyhow!("Browser feature not enabled"))
    }

    async fn scroll_height(&mut self) -> Result<i64> {
        Err(anyhow::anyhow!("Browser feature not enabled"))
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        Err(anyhow::anyhow!("Browser feature not enabled"))
    }

    async fn find_all(&mut self, _selector: &str) -> Result<Vec<()>> {
        Err(anyhow::anyhow!("Browser feature not enabled"))
    }

    async fn find_one(&mut self, _selector: &str, _timeout: Duration) -> Result<Option<()>> {
        Err(anyhow::anyhow!("Browser feature not enabled"))
    }

    async fn click(&mut self, _element: &()) -> Result<()> {
        Err(anyhow::anyhow!("Browser feature not enabled"))
    }

    async fn fragment_html(&mut self, _element: &()) -> Result<String> {
        Err(anyhow::anyhow!("Browser feature not enabled"))
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageProvider for PlaywrightProvider {
    type Page = DisabledPage;

    async fn open_page(&self) -> Result<DisabledPage> {
        Err(anyhow::anyhow!("Browser feature not enabled"))
    }
}
