//! Listing-page extraction: one candidate per article card.

use super::{ExtractionMethod, NON_CONTENT_TAGS, Page, TITLE_PLACEHOLDER, element_text};
use crate::models::Candidate;
use crate::normalize::{char_len, normalize, split_sentences};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

const MAX_CONTAINERS: usize = 10;
const MAX_DERIVED_TITLE_CHARS: usize = 150;
const MAX_DERIVED_TITLE_WORDS: usize = 12;
/// Containers with less text than this are navigation chrome, not cards.
const MIN_CONTAINER_CHARS: usize = 100;

static CONTAINER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "article, .article, .news-item, .story, .post, .card, .entry, .news-card, .story-card, .listing-item",
    )
    .unwrap()
});
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3, h4").unwrap());

/// Sweeps every article-card container on a listing page.
///
/// When cards nest (a `.card` wrapping an `<article>`) only the innermost
/// match is used, so each story is counted once. A card without a heading
/// is titled by its first sentence.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerSweepExtraction;

impl ExtractionMethod for ContainerSweepExtraction {
    fn name(&self) -> &'static str {
        "container_sweep"
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Candidate> {
        cards(page)
            .into_iter()
            .take(MAX_CONTAINERS)
            .map(|(element, text)| Candidate::new(card_title(element, &text), text))
            .collect()
    }
}

/// Number of article cards on the page. Two or more mark a listing page.
pub fn card_count(page: &Page<'_>) -> usize {
    cards(page).len()
}

/// Innermost card containers with enough text, in document order.
fn cards<'a>(page: &Page<'a>) -> Vec<(ElementRef<'a>, String)> {
    let containers: Vec<(ElementRef<'a>, String)> = page
        .document
        .select(&CONTAINER)
        .map(|element| (element, normalize(&element_text(element, NON_CONTENT_TAGS))))
        .filter(|(_, text)| char_len(text) > MIN_CONTAINER_CHARS)
        .collect();

    containers
        .iter()
        .filter(|(element, _)| !wraps_another(*element, &containers))
        .cloned()
        .collect()
}

fn wraps_another(element: ElementRef<'_>, containers: &[(ElementRef<'_>, String)]) -> bool {
    containers.iter().any(|(other, _)| {
        other.id() != element.id() && other.ancestors().any(|ancestor| ancestor.id() == element.id())
    })
}

/// First heading of the card, else its first sentence, else the first
/// [`MAX_DERIVED_TITLE_WORDS`] words.
fn card_title(element: ElementRef<'_>, text: &str) -> String {
    if let Some(heading) = element
        .select(&HEADING)
        .map(|heading| normalize(&element_text(heading, NON_CONTENT_TAGS)))
        .find(|text| !text.is_empty())
    {
        return heading;
    }

    match split_sentences(text).into_iter().next() {
        Some(sentence) if char_len(&sentence) <= MAX_DERIVED_TITLE_CHARS => sentence,
        Some(_) => text
            .split_whitespace()
            .take(MAX_DERIVED_TITLE_WORDS)
            .collect::<Vec<_>>()
            .join(" "),
        None => TITLE_PLACEHOLDER.to_string(),
    }
}
