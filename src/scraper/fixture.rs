//! In-memory review page for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::browser::{BrowserPage, PageProvider};
use super::selectors::SelectorMap;

/// Markup for one synthetic review card using the default selector classes
pub fn review_card(index: usize, with_date: bool) -> String {
    let date = if with_date {
        format!(
            r#"<span class="x4k7w5x x1h91t0o x1h9r5lt x1jfb8zj xv2umb2"><a href="https://www.facebook.com/harbor/posts/{index}">{day} March</a></span>"#,
            index = index,
            day = index % 28 + 1,
        )
    } else {
        String::new()
    };

    format!(
        r#"<a class="x1i10hfl x1qjc9v5 xjbqb8w xjqpnuy" aria-label="Reviewer {index}" href="/u/{index}"><svg><image xlink:href="https://cdn.example.com/{index}.jpg"></image></svg></a>
<h2 class="x1heor9g x1qlqyl8 x1pd3egz x1a2a7pz"><span>Reviewer {index}</span> recommends <strong>Harbor Coffee</strong> .</h2>
{date}
<div class="xdj266r x11i5rnm xat24cr x1mh8g0r x1vvkbs">Review number {index} <img alt="👍" src="t.png"></div>"#,
        index = index,
        date = date,
    )
}

#[derive(Debug, Default)]
pub struct FixtureLog {
    pub navigations: Vec<String>,
    pub expand_clicks: usize,
    pub failed_clicks: usize,
    pub login_dismissed: bool,
    pub closes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureElement {
    Card(usize),
    SeeMore,
    LoginClose,
}

/// Reveals `per_scroll` more cards on every scroll to the bottom
#[derive(Clone)]
pub struct FixturePage {
    cards: Vec<String>,
    visible: usize,
    per_scroll: usize,
    endless: bool,
    extra_height: i64,
    see_more: usize,
    failing_see_more: bool,
    login_popup: bool,
    stuck_login: bool,
    broken_login_lookup: bool,
    broken_scroll: bool,
    selectors: SelectorMap,
    log: Arc<Mutex<FixtureLog>>,
}

impl FixturePage {
    pub fn new(cards: Vec<String>, per_scroll: usize) -> Self {
        Self {
            visible: per_scroll.min(cards.len()),
            cards,
            per_scroll,
            endless: false,
            extra_height: 0,
            see_more: 0,
            failing_see_more: false,
            login_popup: false,
            stuck_login: false,
            broken_login_lookup: false,
            broken_scroll: false,
            selectors: SelectorMap::default(),
            log: Arc::new(Mutex::new(FixtureLog::default())),
        }
    }

    /// Height keeps growing even when no cards are added
    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn with_see_more(mut self, buttons: usize) -> Self {
        self.see_more = buttons;
        self
    }

    pub fn failing_see_more(mut self) -> Self {
        self.failing_see_more = true;
        self
    }

    pub fn with_login_popup(mut self) -> Self {
        self.login_popup = true;
        self
    }

    /// The login close button is found but clicking it fails
    pub fn with_stuck_login(mut self) -> Self {
        self.login_popup = true;
        self.stuck_login = true;
        self
    }

    /// Looking for the login close button fails outright
    pub fn with_broken_login_lookup(mut self) -> Self {
        self.broken_login_lookup = true;
        self
    }

    /// Scrolling fails, as when the browser crashes mid-run
    pub fn broken_scroll(mut self) -> Self {
        self.broken_scroll = true;
        self
    }

    pub fn log(&self) -> Arc<Mutex<FixtureLog>> {
        self.log.clone()
    }

    fn matches(candidates: &[String], selector: &str) -> bool {
        candidates.iter().any(|c| c == selector)
    }
}

#[async_trait]
impl BrowserPage for FixturePage {
    type Element = FixtureElement;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.log.lock().unwrap().navigations.push(url.to_string());
        Ok(())
    }

    async fn scroll_height(&mut self) -> Result<i64> {
        Ok(1000 + self.visible as i64 * 100 + self.extra_height)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        if self.broken_scroll {
            return Err(anyhow::anyhow!("Target page, context or browser has been closed"));
        }
        self.visible = (self.visible + self.per_scroll).min(self.cards.len());
        if self.endless {
            self.extra_height += 50;
        }
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<FixtureElement>> {
        if Self::matches(&self.selectors.review_card, selector) {
            return Ok((0..self.visible).map(FixtureElement::Card).collect());
        }
        if Self::matches(&self.selectors.see_more, selector) {
            return Ok(vec![FixtureElement::SeeMore; self.see_more]);
        }
        Ok(Vec::new())
    }

    async fn find_one(&mut self, selector: &str, _timeout: Duration) -> Result<Option<FixtureElement>> {
        if self.broken_login_lookup {
            return Err(anyhow::anyhow!("Timeout 5000ms exceeded while waiting for selector"));
        }
        if self.login_popup && Self::matches(&self.selectors.login_dismiss, selector) {
            return Ok(Some(FixtureElement::LoginClose));
        }
        Ok(None)
    }

    async fn click(&mut self, element: &FixtureElement) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        match element {
            FixtureElement::SeeMore if self.failing_see_more => {
                log.failed_clicks += 1;
                Err(anyhow::anyhow!("element is not attached to the DOM"))
            }
            FixtureElement::SeeMore => {
                log.expand_clicks += 1;
                Ok(())
            }
            FixtureElement::LoginClose if self.stuck_login => {
                log.failed_clicks += 1;
                Err(anyhow::anyhow!("element is outside of the viewport"))
            }
            FixtureElement::LoginClose => {
                log.login_dismissed = true;
                self.login_popup = false;
                Ok(())
            }
            FixtureElement::Card(_) => Ok(()),
        }
    }

    async fn fragment_html(&mut self, element: &FixtureElement) -> Result<String> {
        match element {
            FixtureElement::Card(i) => Ok(self.cards[*i].clone()),
            _ => Ok(String::new()),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Opens copies of a template page that share its log
pub struct FixtureProvider {
    template: FixturePage,
    opened: AtomicUsize,
}

impl FixtureProvider {
    pub fn new(template: FixturePage) -> Self {
        Self {
            template,
            opened: AtomicUsize::new(0),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageProvider for FixtureProvider {
    type Page = FixturePage;

    async fn open_page(&self) -> Result<FixturePage> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(self.template.clone())
    }
}
