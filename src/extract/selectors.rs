//! Selector-driven extraction: the source's own selectors first, then a
//! fixed list of selectors that fit most news CMS templates.

use super::{ExtractionMethod, NON_CONTENT_TAGS, Page, TITLE_PLACEHOLDER, first_text};
use crate::models::Candidate;
use scraper::Html;
use tracing::debug;

/// Titles must be longer than this to be used.
const MIN_TITLE_CHARS: usize = 5;
/// Content blocks must be longer than this to be used.
const MIN_CONTENT_CHARS: usize = 50;

const CONFIGURED_SKIP: &[&str] = &["script", "style", "noscript", "template", "nav"];
const GENERIC_SKIP: &[&str] = &["script", "style", "noscript", "template", "nav", "footer"];

const GENERIC_TITLE_SELECTORS: &[&str] = &["h1", "h2", ".title", ".headline", ".story-headline"];
const GENERIC_CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".article-content",
    ".story-content",
    ".news-content",
    ".post-content",
    ".entry-content",
    ".content",
    ".main-content",
    "main",
];

/// Uses the `title`, `content` and `date` selectors of the source descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfiguredSelectorExtraction;

impl ExtractionMethod for ConfiguredSelectorExtraction {
    fn name(&self) -> &'static str {
        "configured_selectors"
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Candidate> {
        let content_selectors = page.source.selectors_for("content");
        if content_selectors.is_empty() {
            debug!(source = %page.source.id, "No content selectors configured");
            return Vec::new();
        }

        let mut candidates = extract_with(
            page.document,
            page.source.selectors_for("title"),
            content_selectors,
            CONFIGURED_SKIP,
        );
        let date_selectors = page.source.selectors_for("date");
        for candidate in &mut candidates {
            candidate.date = first_text(page.document, date_selectors, 0, NON_CONTENT_TAGS);
        }
        candidates
    }
}

/// Same procedure as [`ConfiguredSelectorExtraction`] with a fixed selector list.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericArticleExtraction;

impl ExtractionMethod for GenericArticleExtraction {
    fn name(&self) -> &'static str {
        "generic_article"
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Candidate> {
        extract_with(
            page.document,
            GENERIC_TITLE_SELECTORS,
            GENERIC_CONTENT_SELECTORS,
            GENERIC_SKIP,
        )
    }
}

fn extract_with<T: AsRef<str>, C: AsRef<str>>(
    document: &Html,
    title_selectors: &[T],
    content_selectors: &[C],
    skip: &[&str],
) -> Vec<Candidate> {
    let Some(content) = first_text(document, content_selectors, MIN_CONTENT_CHARS, skip) else {
        return Vec::new();
    };
    let title = first_text(document, title_selectors, MIN_TITLE_CHARS, NON_CONTENT_TAGS)
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());
    vec![Candidate::new(title, content)]
}
