//! Structural selectors for review pages.
//!
//! Every logical role maps to one or more CSS selectors tried in order. The
//! defaults track the obfuscated class signatures the site currently serves;
//! when the markup shifts, override them in the `[selectors]` config section
//! instead of touching code.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{ReviewScrapeError, ReviewScrapeResult};

/// Role → candidate selector mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorMap {
    /// One review card on the page (evaluated by the browser)
    pub review_card: Vec<String>,
    /// "See more" affordances that expand truncated text (evaluated by the browser)
    pub see_more: Vec<String>,
    /// Close button of the login interstitial (evaluated by the browser)
    pub login_dismiss: Vec<String>,
    pub author_anchor: Vec<String>,
    /// Avatar image, looked up inside the author anchor only
    pub author_image: Vec<String>,
    pub recommendation: Vec<String>,
    pub date_link: Vec<String>,
    pub review_body: Vec<String>,
}

impl Default for SelectorMap {
    fn default() -> Self {
        Self {
            review_card: vec!["div.x1yztbdb.x1n2onr6.xh8yej3.x1ja2u2z".to_string()],
            see_more: vec!["div.x1i10hfl.xjbqb8w.x1ejq31n.xd10rxx[role=\"button\"]".to_string()],
            login_dismiss: vec!["div[aria-label=\"Close\"][role=\"button\"]".to_string()],
            author_anchor: vec!["a.x1i10hfl.x1qjc9v5.xjbqb8w.xjqpnuy".to_string()],
            author_image: vec!["image".to_string(), "img".to_string()],
            recommendation: vec!["h2.x1heor9g.x1qlqyl8.x1pd3egz.x1a2a7pz".to_string()],
            date_link: vec!["span.x4k7w5x.x1h91t0o.x1h9r5lt.x1jfb8zj.xv2umb2".to_string()],
            review_body: vec![
                "div.xdj266r.x11i5rnm.xat24cr.x1mh8g0r.x1vvkbs".to_string(),
                "div.x1iorvi4.x1pi30zi.x1l90r2v.x1swvt13".to_string(),
                "span.x193iq5w.xeuugli.x13faqbe.x1vvkbs".to_string(),
            ],
        }
    }
}

/// Selectors parsed for in-process DOM matching
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub author_anchor: Vec<Selector>,
    pub author_image: Vec<Selector>,
    pub recommendation: Vec<Selector>,
    pub date_link: Vec<Selector>,
    pub review_body: Vec<Selector>,
    pub anchor: Selector,
    pub image: Selector,
}

impl SelectorMap {
    /// Parse the fragment-level roles and check the browser-level ones are present.
    ///
    /// Browser-level roles are handed to the page as-is, so only their presence
    /// is checked here.
    pub fn compile(&self) -> ReviewScrapeResult<CompiledSelectors> {
        for (role, candidates) in [
            ("review_card", &self.review_card),
            ("see_more", &self.see_more),
            ("login_dismiss", &self.login_dismiss),
        ] {
            require_candidates(role, candidates)?;
        }

        Ok(CompiledSelectors {
            author_anchor: compile_role("author_anchor", &self.author_anchor)?,
            author_image: compile_role("author_image", &self.author_image)?,
            recommendation: compile_role("recommendation", &self.recommendation)?,
            date_link: compile_role("date_link", &self.date_link)?,
            review_body: compile_role("review_body", &self.review_body)?,
            anchor: parse_one("anchor", "a")?,
            image: parse_one("image", "img")?,
        })
    }
}

fn require_candidates(role: &str, candidates: &[String]) -> ReviewScrapeResult<()> {
    if candidates.iter().all(|c| c.trim().is_empty()) {
        return Err(ReviewScrapeError::config(format!(
            "Selector role '{}' needs at least one candidate",
            role
        )));
    }
    Ok(())
}

fn compile_role(role: &str, candidates: &[String]) -> ReviewScrapeResult<Vec<Selector>> {
    require_candidates(role, candidates)?;
    candidates
        .iter()
        .filter(|c| !c.trim().is_empty())
        .map(|c| parse_one(role, c))
        .collect()
}

fn parse_one(role: &str, selector: &str) -> ReviewScrapeResult<Selector> {
    Selector::parse(selector).map_err(|e| {
        tracing::debug!("Selector parse failure for {}: {}", role, e);
        ReviewScrapeError::Selector {
            role: role.to_string(),
            selector: selector.to_string(),
        }
    })
}
