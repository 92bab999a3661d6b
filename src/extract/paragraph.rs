//! Last-resort extraction for single-article pages that only have bare
//! paragraphs.

use super::{ExtractionMethod, NON_CONTENT_TAGS, Page, element_text, first_text};
use crate::models::Candidate;
use crate::normalize::{char_len, normalize};
use once_cell::sync::Lazy;
use scraper::Selector;

const MAX_PARAGRAPHS: usize = 10;
const HEADING_SELECTORS: &[&str] = &["h1", "h2", "h3"];

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Joins the page's paragraphs under the first heading.
///
/// Paragraphs must be longer than the policy's `min_paragraph_len`. When the
/// page has no usable heading the first paragraph becomes the title. At
/// least two paragraphs are required.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParagraphFallbackExtraction;

impl ExtractionMethod for ParagraphFallbackExtraction {
    fn name(&self) -> &'static str {
        "paragraph_fallback"
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Candidate> {
        let min_len = page.policy().min_paragraph_len;
        let paragraphs: Vec<String> = page
            .document
            .select(&PARAGRAPH)
            .map(|p| normalize(&element_text(p, NON_CONTENT_TAGS)))
            .filter(|text| char_len(text) > min_len)
            .collect();

        if paragraphs.len() < 2 {
            return Vec::new();
        }

        let heading = first_text(page.document, HEADING_SELECTORS, 5, NON_CONTENT_TAGS);
        let (title, body) = match heading {
            Some(title) => (title, &paragraphs[..]),
            None => (paragraphs[0].clone(), &paragraphs[1..]),
        };

        let content = body
            .iter()
            .take(MAX_PARAGRAPHS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        vec![Candidate::new(title, content)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::source;
    use crate::models::ScoringPolicy;
    use scraper::Html;

    #[test]
    fn test_uses_heading_and_joins_paragraphs() {
        let descriptor = source(&[], &[]);
        let document = Html::parse_document(
            "<h2>Cardamom auction prices rebound</h2>\
             <p>Prices at the Puttady spice park auction rose for the third week.</p>\
             <p>ok</p>\
             <p>Traders expect demand to hold through the festival season.</p>",
        );
        let page = Page::new(&document, "https://x.org/a", &descriptor);
        let candidates = ParagraphFallbackExtraction.extract(&page);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Cardamom auction prices rebound");
        assert_eq!(
            candidates[0].content,
            "Prices at the Puttady spice park auction rose for the third week. \
             Traders expect demand to hold through the festival season."
        );
    }

    #[test]
    fn test_first_paragraph_becomes_title_without_heading() {
        let descriptor = source(&[], &[]);
        let document = Html::parse_document(
            "<p>Banana growers in Wayanad count flood losses</p>\
             <p>Heavy rain last week damaged plantations across three panchayats.</p>",
        );
        let page = Page::new(&document, "https://x.org/a", &descriptor);
        let candidates = ParagraphFallbackExtraction.extract(&page);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Banana growers in Wayanad count flood losses");
        assert!(candidates[0].content.starts_with("Heavy rain"));
    }

    #[test]
    fn test_paragraph_threshold_depends_on_policy() {
        // 24 characters each: above the lenient threshold, below the strict one.
        let html = "<h1>Monsoon update</h1><p>Rain expected in Idukki.</p><p>Dams are near capacity..</p>";
        let document = Html::parse_document(html);

        let strict = source(&[], &[]);
        let page = Page::new(&document, "https://x.org/a", &strict);
        assert!(ParagraphFallbackExtraction.extract(&page).is_empty());

        let mut lenient = source(&[], &[]);
        lenient.policy = ScoringPolicy::lenient();
        let page = Page::new(&document, "https://x.org/a", &lenient);
        assert_eq!(ParagraphFallbackExtraction.extract(&page).len(), 1);
    }

    #[test]
    fn test_caps_paragraph_count() {
        let descriptor = source(&[], &[]);
        let body: String = (0..15)
            .map(|i| format!("<p>Paragraph number {i:02} about rubber tapping season.</p>"))
            .collect();
        let document = Html::parse_document(&format!("<h1>Rubber tapping resumes</h1>{body}"));
        let page = Page::new(&document, "https://x.org/a", &descriptor);
        let candidates = ParagraphFallbackExtraction.extract(&page);
        assert!(candidates[0].content.contains("number 09"));
        assert!(!candidates[0].content.contains("number 10"));
    }
}
