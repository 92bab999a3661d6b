//! Free-text segmentation for sites whose markup carries no usable article
//! structure.
//!
//! The page is flattened to block text and cut into candidates five
//! different ways. Every pass trades precision for recall, so this strategy
//! is only enabled for sources marked `extraction: segmented` and its output
//! always goes through the relevance scorer.
//!
//! Passes, in order:
//!
//! 1. **Blocks**: split on blank lines; first sentence is the title.
//! 2. **Sentence windows**: a title sentence followed by the next three.
//! 3. **Element lengths**: any element with 80-800 characters of text.
//! 4. **Keyword anchors**: a sentence naming a topic or institution plus up
//!    to four following sentences.
//! 5. **Sliding window**: every sentence whose text names an actor or topic,
//!    followed by the next four.

use super::{ExtractionMethod, Page, block_text};
use crate::models::Candidate;
use crate::normalize::{char_len, collapse_whitespace, split_sentences};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashSet;

/// Most candidates taken from one pass.
const MAX_PER_PASS: usize = 10;
/// Most candidates the whole strategy returns.
const MAX_TOTAL: usize = 30;

const MIN_TITLE_CHARS: usize = 15;
const MAX_TITLE_CHARS: usize = 200;
const MIN_BLOCK_CHARS: usize = 80;
const MIN_CONTENT_CHARS: usize = 50;
const MIN_WINDOW_CONTENT_CHARS: usize = 80;
const MIN_ELEMENT_CHARS: usize = 80;
const MAX_ELEMENT_CHARS: usize = 800;
const SENTENCE_WINDOW: usize = 3;
const SLIDING_WINDOW: usize = 4;
const MIN_SLIDING_TITLE_CHARS: usize = 20;
const MIN_SLIDING_CONTENT_CHARS: usize = 100;

/// Words that mark a sentence as being about farming or a public body.
const ACTOR_TOPIC_WORDS: &[&str] = &[
    "farmer", "agricultur", "crop", "paddy", "rice", "coconut", "rubber", "pepper",
    "cardamom", "spice", "harvest", "monsoon", "market", "price", "minister", "ministry",
    "government", "department", "scheme", "subsidy", "procurement", "kerala", "krishi",
    "കൃഷി", "കർഷക",
];

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

static KEYWORD_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([^.!?।]*\b(?:farmers?|agricultur\w*|crops?|paddy|harvest\w*|ministry|minister|government|department|scheme|subsid\w*|procurement|krishi|kerala)\b[^.!?।]*[.!?।])((?:\s+[^.!?।]+[.!?।]){1,4})",
    )
    .unwrap()
});

static TEXT_ELEMENTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, div, li, section, article, td, blockquote").unwrap());

/// Cuts a wall of page text into candidates with five independent passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextBlockSegmentation;

impl ExtractionMethod for TextBlockSegmentation {
    fn name(&self) -> &'static str {
        "text_segmentation"
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Candidate> {
        let text = block_text(page.document.root_element());
        let blocks: Vec<String> = BLANK_LINES
            .split(&text)
            .map(collapse_whitespace)
            .filter(|block| !block.is_empty())
            .collect();
        let sentences: Vec<String> = blocks.iter().flat_map(|b| split_sentences(b)).collect();
        let flat = blocks.join(" ");

        let mut out = Segments::default();
        out.extend(paragraph_blocks(&blocks));
        out.extend(sentence_windows(&sentences));
        out.extend(element_lengths(page));
        out.extend(keyword_anchored(&flat));
        out.extend(sliding_windows(&sentences));
        out.candidates
    }
}

/// Accumulates candidates across passes, dropping repeated titles.
#[derive(Default)]
struct Segments {
    seen: HashSet<String>,
    candidates: Vec<Candidate>,
}

impl Segments {
    fn extend(&mut self, pass: Vec<Candidate>) {
        for candidate in pass.into_iter().take(MAX_PER_PASS) {
            if self.candidates.len() >= MAX_TOTAL {
                return;
            }
            if self.seen.insert(candidate.title.to_lowercase()) {
                self.candidates.push(candidate);
            }
        }
    }
}

fn title_fits(title: &str) -> bool {
    (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&char_len(title))
}

fn mentions_actor_or_topic(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ACTOR_TOPIC_WORDS.iter().any(|word| lowered.contains(word))
}

/// Split `text` into first sentence and the rest.
fn split_first_sentence(text: &str) -> Option<(String, String)> {
    let sentences = split_sentences(text);
    let (first, rest) = sentences.split_first()?;
    Some((first.clone(), rest.join(" ")))
}

fn paragraph_blocks(blocks: &[String]) -> Vec<Candidate> {
    blocks
        .iter()
        .filter(|block| char_len(block) >= MIN_BLOCK_CHARS)
        .filter_map(|block| split_first_sentence(block))
        .filter(|(title, content)| title_fits(title) && char_len(content) >= MIN_CONTENT_CHARS)
        .map(|(title, content)| Candidate::new(title, content))
        .collect()
}

fn sentence_windows(sentences: &[String]) -> Vec<Candidate> {
    sentences
        .chunks(SENTENCE_WINDOW + 1)
        .filter(|chunk| chunk.len() > 1)
        .map(|chunk| Candidate::new(chunk[0].clone(), chunk[1..].join(" ")))
        .filter(|c| title_fits(&c.title) && char_len(&c.content) >= MIN_WINDOW_CONTENT_CHARS)
        .collect()
}

fn element_lengths(page: &Page<'_>) -> Vec<Candidate> {
    page.document
        .select(&TEXT_ELEMENTS)
        .filter_map(element_candidate)
        .take(MAX_PER_PASS * 3)
        .collect()
}

fn element_candidate(element: ElementRef<'_>) -> Option<Candidate> {
    let text = block_text(element);
    let len = char_len(&collapse_whitespace(&text));
    if !(MIN_ELEMENT_CHARS..=MAX_ELEMENT_CHARS).contains(&len) {
        return None;
    }

    // A line break inside the element separates headline from body.
    let (title, content) = match BLANK_LINES.split(&text).find(|part| !part.trim().is_empty()) {
        Some(first) if text.trim_start().len() > first.trim().len() => {
            let first = first.trim().to_string();
            let rest = text.trim_start()[first.len()..].to_string();
            (collapse_whitespace(&first), collapse_whitespace(&rest))
        }
        _ => split_first_sentence(&text)?,
    };

    (title_fits(&title) && char_len(&content) >= MIN_CONTENT_CHARS)
        .then(|| Candidate::new(title, content))
}

fn keyword_anchored(flat: &str) -> Vec<Candidate> {
    KEYWORD_ANCHOR
        .captures_iter(flat)
        .filter_map(|caps| {
            let title = collapse_whitespace(caps.get(1)?.as_str());
            let content = collapse_whitespace(caps.get(2)?.as_str());
            (title_fits(&title) && char_len(&content) >= MIN_CONTENT_CHARS)
                .then(|| Candidate::new(title, content))
        })
        .collect()
}

fn sliding_windows(sentences: &[String]) -> Vec<Candidate> {
    sentences
        .windows(SLIDING_WINDOW + 1)
        .filter(|window| {
            let title = &window[0];
            mentions_actor_or_topic(title)
                && (MIN_SLIDING_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&char_len(title))
        })
        .map(|window| Candidate::new(window[0].clone(), window[1..].join(" ")))
        .filter(|c| char_len(&c.content) >= MIN_SLIDING_CONTENT_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::source;
    use crate::models::ExtractionMode;
    use scraper::Html;

    const WALL: &str = "The state agriculture department announced a new paddy procurement drive in Palakkad. \
        Officials said farmers would be paid within ten days of delivery. \
        Procurement centres will open in all major panchayats from Monday. \
        The move follows complaints about delayed payments last season. \
        Farmer groups welcomed the decision but asked for higher support prices.";

    fn page_text(html: &str) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        let mut descriptor = source(&[], &[]);
        descriptor.extraction = ExtractionMode::Segmented;
        let page = Page::new(&document, "https://x.org/", &descriptor);
        TextBlockSegmentation.extract(&page)
    }

    #[test]
    fn test_paragraph_block_first_sentence_is_title() {
        let candidates = paragraph_blocks(&[WALL.to_string()]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].title,
            "The state agriculture department announced a new paddy procurement drive in Palakkad."
        );
        assert!(candidates[0].content.starts_with("Officials said farmers"));
    }

    #[test]
    fn test_sentence_windows_group_following_sentences() {
        let sentences = split_sentences(WALL);
        let candidates = sentence_windows(&sentences);
        // Five sentences: one full window, and a one-sentence tail with no content.
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].title.starts_with("The state agriculture department"));
        assert!(candidates[0].content.ends_with("delayed payments last season."));
    }

    #[test]
    fn test_keyword_anchor_captures_following_sentences() {
        let candidates = keyword_anchored(WALL);
        assert!(!candidates.is_empty());
        assert!(candidates[0].title.contains("agriculture department"));
        assert!(candidates[0].content.contains("paid within ten days"));
    }

    #[test]
    fn test_sliding_window_requires_topic_title() {
        let text = "Weather was pleasant today in the hills. It rained a little. Then it stopped. \
                    Clouds returned. Nobody minded.";
        assert!(sliding_windows(&split_sentences(text)).is_empty());

        let candidates = sliding_windows(&split_sentences(WALL));
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].title.contains("agriculture department"));
    }

    #[test]
    fn test_element_split_on_line_break() {
        let selector = Selector::parse("div").unwrap();
        let short = Html::parse_document(
            "<div><h3>Procurement drive announced</h3><p>Officials said farmers would be paid within ten days of delivery at every centre.</p></div>",
        );
        let div = short.select(&selector).next().unwrap();
        let candidate = element_candidate(div).unwrap();
        assert_eq!(candidate.title, "Procurement drive announced");
        assert!(candidate.content.starts_with("Officials said"));
    }

    #[test]
    fn test_element_outside_length_window_is_ignored() {
        let selector = Selector::parse("p").unwrap();
        let document = Html::parse_document("<p>Paddy prices rise. Farmers cheer.</p>");
        let p = document.select(&selector).next().unwrap();
        assert!(element_candidate(p).is_none());
    }

    #[test]
    fn test_extract_deduplicates_across_passes() {
        let candidates = page_text(&format!("<body><p>{WALL}</p></body>"));
        assert!(!candidates.is_empty());
        let mut titles: Vec<String> = candidates.iter().map(|c| c.title.to_lowercase()).collect();
        let before = titles.len();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), before);
        assert!(candidates.len() <= MAX_TOTAL);
    }

    #[test]
    fn test_extract_on_empty_page() {
        assert!(page_text("<html><body></body></html>").is_empty());
    }
}
