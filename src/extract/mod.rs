//! Article extraction strategies.
//!
//! Each strategy turns one parsed page into zero or more [`Candidate`]s and
//! knows nothing about the others. The [`pipeline`](crate::pipeline) decides
//! which strategies run, in which order, and which candidates survive.
//!
//! # Strategies
//!
//! | Strategy | Module | Yields | Used for |
//! |----------|--------|--------|----------|
//! | [`ConfiguredSelectorExtraction`] | [`selectors`] | ≤1 | Source-specific selectors |
//! | [`GenericArticleExtraction`] | [`selectors`] | ≤1 | `article`, `main`, CMS class names |
//! | [`ParagraphFallbackExtraction`] | [`paragraph`] | ≤1 | Pages with bare `<p>` text |
//! | [`ContainerSweepExtraction`] | [`container`] | ≤10 | Listing pages with article cards |
//! | [`TextBlockSegmentation`] | [`segmentation`] | ≤30 | Sites with no usable structure |
//!
//! Strategies never fail. An unparsable selector or a page without the
//! expected structure simply produces an empty vector.

use crate::models::{Candidate, ScoringPolicy, SourceDescriptor};
use crate::normalize::{char_len, collapse_whitespace, normalize};
use scraper::{ElementRef, Html, Selector};

pub mod container;
pub mod paragraph;
pub mod segmentation;
pub mod selectors;

pub use container::ContainerSweepExtraction;
pub use paragraph::ParagraphFallbackExtraction;
pub use segmentation::TextBlockSegmentation;
pub use selectors::{ConfiguredSelectorExtraction, GenericArticleExtraction};

/// Title used when a content block was found but no heading was.
pub const TITLE_PLACEHOLDER: &str = "Agriculture News";

/// Subtrees whose text never belongs to an article.
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// One fetched page as seen by the extraction strategies.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub document: &'a Html,
    pub address: &'a str,
    pub source: &'a SourceDescriptor,
}

impl<'a> Page<'a> {
    pub fn new(document: &'a Html, address: &'a str, source: &'a SourceDescriptor) -> Self {
        Self {
            document,
            address,
            source,
        }
    }

    pub fn policy(&self) -> &'a ScoringPolicy {
        &self.source.policy
    }
}

/// A self-contained way of turning a page into candidates.
pub trait ExtractionMethod {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Extract candidates. Must not panic on odd markup; misses return an
    /// empty vector.
    fn extract(&self, page: &Page<'_>) -> Vec<Candidate>;
}

/// Text of `element` with the subtrees named in `skip` left out.
///
/// Text nodes are joined with spaces so adjacent inline elements do not run
/// together.
pub fn element_text(element: ElementRef<'_>, skip: &[&str]) -> String {
    let mut out = String::new();
    push_text(element, skip, &mut out);
    collapse_whitespace(&out)
}

fn push_text(element: ElementRef<'_>, skip: &[&str], out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !skip.contains(&child_element.value().name()) {
                push_text(child_element, skip, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

/// Try each selector in order and return the normalized text of the first
/// element whose text is longer than `min_chars`.
///
/// Selectors that fail to parse are skipped.
pub fn first_text<S: AsRef<str>>(
    document: &Html,
    selectors: &[S],
    min_chars: usize,
    skip: &[&str],
) -> Option<String> {
    selectors
        .iter()
        .filter_map(|raw| Selector::parse(raw.as_ref().trim()).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .map(|element| normalize(&element_text(element, skip)))
                .find(|text| char_len(text) > min_chars)
        })
}

/// Elements that start a new block when flattening a page to text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Flatten an element to text with a blank line at every block boundary.
///
/// Inline whitespace (including source newlines) is collapsed, so blank
/// lines in the result mark block structure only.
pub fn block_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_blocks(element, &mut out);
    out.trim().to_string()
}

fn push_blocks(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if NON_CONTENT_TAGS.contains(&name) || name == "head" {
                continue;
            }
            let is_block = BLOCK_TAGS.contains(&name);
            if is_block {
                out.push_str("\n\n");
            }
            push_blocks(child_element, out);
            if is_block {
                out.push_str("\n\n");
            }
        } else if let Some(text) = child.value().as_text() {
            let text = collapse_whitespace(text);
            if !text.is_empty() {
                if !out.is_empty() && !out.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
                out.push_str(&text);
                out.push(' ');
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_text_skips_subtrees() {
        let html = Html::parse_fragment(
            "<div><p>Paddy</p><script>var x = 1;</script><nav>Menu</nav><span>harvest</span></div>",
        );
        let selector = Selector::parse("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(element_text(div, &["script", "nav"]), "Paddy harvest");
    }

    #[test]
    fn test_first_text_respects_order_and_length() {
        let html = Html::parse_document(
            "<h2>Short</h2><h1>Pepper exports climb sharply</h1><h2>Another longer heading</h2>",
        );
        let found = first_text(&html, &["h2", "h1"], 5, &[]);
        assert_eq!(found.as_deref(), Some("Another longer heading"));

        let found = first_text(&html, &["h1", "h2"], 5, &[]);
        assert_eq!(found.as_deref(), Some("Pepper exports climb sharply"));
    }

    #[test]
    fn test_first_text_skips_invalid_selectors() {
        let html = Html::parse_document("<h1>Rubber prices steady</h1>");
        let found = first_text(&html, &["[[broken", "h1"], 5, &[]);
        assert_eq!(found.as_deref(), Some("Rubber prices steady"));
    }

    #[test]
    fn test_block_text_separates_blocks() {
        let html = Html::parse_document(
            "<body><p>First   block\n here.</p><div>Second <b>block</b>.</div><script>x()</script></body>",
        );
        let text = block_text(html.root_element());
        let blocks: Vec<&str> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .collect();
        assert_eq!(blocks, vec!["First block here.", "Second block ."]);
    }
}
