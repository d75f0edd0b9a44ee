use chrono::NaiveDateTime;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

pub mod date;

use crate::scraper::selectors::CompiledSelectors;
use crate::scraper::ReviewFragment;

/// One review as exported. Every field is optional on its own; a missing
/// field is `None` (serialized as `null`), never an empty placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub recommendation: Option<String>,
    pub author_title: Option<String>,
    pub author_image: Option<String>,
    pub review_text: Option<String>,
    pub review_link: Option<String>,
    pub date: Option<String>,
}

impl ReviewRecord {
    /// Column names in export order
    pub const FIELDS: [&'static str; 6] = [
        "recommendation",
        "author_title",
        "author_image",
        "review_text",
        "review_link",
        "date",
    ];

    /// Field values in the same order as [`ReviewRecord::FIELDS`]
    pub fn values(&self) -> [Option<&str>; 6] {
        [
            self.recommendation.as_deref(),
            self.author_title.as_deref(),
            self.author_image.as_deref(),
            self.review_text.as_deref(),
            self.review_link.as_deref(),
            self.date.as_deref(),
        ]
    }
}

/// Converts review-card markup into [`ReviewRecord`]s
pub struct RecordExtractor {
    selectors: CompiledSelectors,
}

impl RecordExtractor {
    pub fn new(selectors: CompiledSelectors) -> Self {
        Self { selectors }
    }

    /// Extract a record from a single review card
    pub fn extract(&self, fragment: &ReviewFragment, current_year: i32, now: NaiveDateTime) -> ReviewRecord {
        let document = Html::parse_fragment(&fragment.html);

        let (author_title, author_image) = match first_match(&document, &self.selectors.author_anchor) {
            Some(anchor) => (
                anchor.value().attr("aria-label").map(str::to_string),
                self.author_image(anchor),
            ),
            None => (None, None),
        };

        let recommendation = first_match(&document, &self.selectors.recommendation)
            .map(|el| tidy_period_spacing(&collapse_text(el)));

        let (date, review_link) = match first_match(&document, &self.selectors.date_link) {
            Some(el) => {
                let raw = collapse_text(el);
                let date = (!raw.is_empty()).then(|| date::normalize(&raw, current_year, now));
                (date, self.embedded_href(el))
            }
            None => (None, None),
        };

        let review_text = self.review_text(&document);

        debug!(
            position = fragment.position,
            has_author = author_title.is_some(),
            has_date = date.is_some(),
            has_text = review_text.is_some(),
            "Extracted review card"
        );

        ReviewRecord {
            recommendation,
            author_title,
            author_image,
            review_text,
            review_link,
            date,
        }
    }

    /// Extract every fragment, keeping source order
    pub fn extract_all(&self, fragments: &[ReviewFragment], current_year: i32, now: NaiveDateTime) -> Vec<ReviewRecord> {
        fragments
            .iter()
            .map(|fragment| self.extract(fragment, current_year, now))
            .collect()
    }

    fn author_image(&self, anchor: ElementRef<'_>) -> Option<String> {
        self.selectors.author_image.iter().find_map(|selector| {
            anchor.select(selector).find_map(|img| {
                let attrs = img.value();
                attrs
                    .attr("xlink:href")
                    .or_else(|| attrs.attr("href"))
                    .or_else(|| attrs.attr("src"))
                    .map(str::to_string)
            })
        })
    }

    fn embedded_href(&self, el: ElementRef<'_>) -> Option<String> {
        if el.value().name() == "a" {
            if let Some(href) = el.value().attr("href") {
                return Some(href.to_string());
            }
        }
        el.select(&self.selectors.anchor)
            .find_map(|a| a.value().attr("href"))
            .map(str::to_string)
    }

    fn review_text(&self, document: &Html) -> Option<String> {
        for selector in &self.selectors.review_body {
            for candidate in document.select(selector) {
                let text = flatten_with_alt_text(candidate, &self.selectors.image);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }
}

fn first_match<'a>(document: &'a Html, candidates: &[Selector]) -> Option<ElementRef<'a>> {
    candidates
        .iter()
        .find_map(|selector| document.select(selector).next())
}

/// Join all text nodes with single spaces
pub fn collapse_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove whitespace sitting directly before a period
pub fn tidy_period_spacing(text: &str) -> String {
    static SPACE_BEFORE_PERIOD: OnceLock<Regex> = OnceLock::new();
    SPACE_BEFORE_PERIOD
        .get_or_init(|| Regex::new(r"\s+\.").expect("static regex"))
        .replace_all(text, ".")
        .into_owned()
}

/// Plain text of `el` where inline images contribute their alt text.
///
/// Block elements start a new line; each line has its whitespace collapsed
/// and empty lines are dropped.
pub fn flatten_with_alt_text(el: ElementRef<'_>, image: &Selector) -> String {
    let mut raw = String::new();

    for node in el.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(element) => {
                if let Some(img) = ElementRef::wrap(node) {
                    if image.matches(&img) {
                        if let Some(alt) = element.attr("alt") {
                            raw.push_str(alt);
                        }
                        continue;
                    }
                }
                if matches!(element.name(), "div" | "p" | "br" | "li") {
                    raw.push('\n');
                }
            }
            _ => {}
        }
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
