//! Text cleanup for extracted article text.
//!
//! Everything an extraction method produces goes through [`normalize`] before
//! it is scored: whitespace is collapsed and the boilerplate that news sites
//! wrap around stories (paywall prompts, breadcrumbs, share buttons,
//! copyright lines, wire-service tags) is stripped.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Boilerplate phrases removed from extracted text. All case-insensitive.
static BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Filter bar of listing pages
        r"(?i)share filter by date last hour today this week this month this hour type video photo article podcast duration short medium long agriculture news",
        // Paywall and subscription prompts
        r"(?i)\bsubscribe (?:now|today)\b",
        r"(?i)\bsubscribe to (?:continue|read)(?: reading)?\b",
        r"(?i)\bthis (?:article|story|content) is (?:for|available to|exclusive to) (?:subscribers|premium members|premium subscribers)(?: only)?\b",
        r"(?i)\balready a subscriber\??(?: (?:log|sign) in)?\b",
        r"(?i)\b(?:log|sign) in to (?:continue|read)(?: reading)?\b",
        r"(?i)\bpremium (?:content|story|article)\b",
        // Breadcrumbs: "Home > News > Agriculture"
        r"(?i)\bhome(?:\s*[>»›]\s*[\p{L}\p{N}&'\-]+)+",
        // Calls to action
        r"(?i)\bfollow us on(?: (?:facebook|twitter|x|instagram|whatsapp|telegram|youtube|google news))?\b",
        r"(?i)\bshare (?:this|on) (?:article|story|post|facebook|twitter|whatsapp|linkedin)\b",
        r"(?i)\bsubscribe to our (?:newsletter|channel|youtube channel)\b",
        r"(?i)\bjoin our (?:whatsapp|telegram) (?:group|channel)\b",
        r"(?i)\bclick here to (?:subscribe|read more|join)\b",
        // Generic UI noise
        r"(?i)\b(?:related articles|sponsored content|advertisement|also read:)",
        // Copyright lines
        r"(?i)(?:©|\(c\)|copyright)\s*(?:\d{4}(?:\s*[-–]\s*\d{4})?)?[^.]{0,80}?all rights reserved\.?",
        r"(?i)\ball rights reserved\.?",
        // Wire-service attribution
        r"\((?:PTI|IANS|ANI|UNI|Reuters|AP|AFP)\)",
        r"(?i)\(?\bwith inputs from (?:pti|ians|ani|uni|reuters|agencies)\)?",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Clean raw extracted text.
///
/// Collapses whitespace, trims, and removes boilerplate phrases. Removal and
/// collapsing repeat until nothing changes, so
/// `normalize(&normalize(x)) == normalize(x)` holds for every input.
pub fn normalize(raw: &str) -> String {
    let mut current = collapse_whitespace(raw);
    loop {
        let next = collapse_whitespace(&strip_boilerplate(&current));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn strip_boilerplate(text: &str) -> String {
    BOILERPLATE
        .iter()
        .fold(text.to_string(), |acc, re| re.replace_all(&acc, " ").into_owned())
}

/// Split text into sentences.
///
/// A sentence ends at `.`, `!`, `?` or `।` followed by whitespace (or the end
/// of the text). Sentences are whitespace-collapsed; empty ones are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let terminal = matches!(c, '.' | '!' | '?' | '।');
        let at_boundary = chars.peek().is_none_or(|next| next.is_whitespace());
        if terminal && at_boundary {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = collapse_whitespace(raw);
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

/// Number of characters (not bytes) in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
