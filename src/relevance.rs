//! Relevance scoring: is an extracted `(title, content)` pair agriculture news?
//!
//! Single keyword hits are weak evidence because many accept keywords are
//! everyday words. The scorer therefore rewards combinations: a location
//! term, several distinct topic keywords, and named domain phrases. Any
//! reject keyword vetoes the candidate regardless of score.
//!
//! # Scoring
//!
//! | Signal | Points |
//! |--------|--------|
//! | Any location term | +2 |
//! | Distinct accept keywords ≥3 / ≥2 / ≥1 | +3 / +2 / +1 |
//! | Any strong-indicator phrase | +2 |
//!
//! Strict policies accept at `score >= accept_threshold`. Lenient policies
//! accept everything that passes the length checks; the score is kept for
//! reporting only.

use crate::models::{KeywordConfig, ScoringPolicy};
use crate::normalize::char_len;
use tracing::debug;

/// Most keywords recorded per article.
pub const MAX_KEYWORD_HITS: usize = 10;

pub const REASON_REJECT_KEYWORD: &str = "rejected keyword present";

/// Outcome of scoring one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    /// `None` when the candidate was rejected before scoring.
    pub score: Option<i32>,
    pub reason: String,
}

impl Verdict {
    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            score: None,
            reason: reason.into(),
        }
    }
}

/// Decide whether a candidate qualifies as agriculture news.
///
/// `address` is only used to label the decision event.
pub fn accept(
    title: &str,
    content: &str,
    keywords: &KeywordConfig,
    policy: &ScoringPolicy,
    address: &str,
) -> Verdict {
    let verdict = evaluate(title, content, keywords, policy);
    if verdict.accepted {
        debug!(%address, score = ?verdict.score, reason = %verdict.reason, title = %title, "Candidate accepted");
    } else {
        debug!(%address, score = ?verdict.score, reason = %verdict.reason, title = %title, "Candidate rejected");
    }
    verdict
}

fn evaluate(title: &str, content: &str, keywords: &KeywordConfig, policy: &ScoringPolicy) -> Verdict {
    let combined = format!("{} {}", title, content).to_lowercase();

    if let Some(term) = keywords
        .reject
        .iter()
        .find(|term| starts_word(&combined, term))
    {
        debug!(term = %term, "Reject keyword matched");
        return Verdict::rejected(REASON_REJECT_KEYWORD);
    }

    let content_len = char_len(content);
    if content_len < policy.min_content_len {
        return Verdict::rejected(format!(
            "content too short ({} < {})",
            content_len, policy.min_content_len
        ));
    }
    let title_len = char_len(title);
    if title_len < policy.min_title_len {
        return Verdict::rejected(format!(
            "title too short ({} < {})",
            title_len, policy.min_title_len
        ));
    }

    let score = score_text(&combined, keywords);
    if policy.is_lenient() {
        return Verdict {
            accepted: true,
            score: Some(score),
            reason: "lenient policy".to_string(),
        };
    }

    if score >= policy.accept_threshold {
        Verdict {
            accepted: true,
            score: Some(score),
            reason: format!("score {} >= {}", score, policy.accept_threshold),
        }
    } else {
        Verdict {
            accepted: false,
            score: Some(score),
            reason: format!("score {} < {}", score, policy.accept_threshold),
        }
    }
}

/// Score already lower-cased text against the keyword tables.
pub fn score_text(lowered: &str, keywords: &KeywordConfig) -> i32 {
    let mut score = 0;

    if first_present(lowered, &keywords.locations).is_some() {
        score += 2;
    }

    score += match count_present(lowered, &keywords.accept) {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    };

    if first_present(lowered, &keywords.strong_indicators).is_some() {
        score += 2;
    }

    score
}

/// Accept keywords that occur in `text`, in configuration order, at most
/// [`MAX_KEYWORD_HITS`].
pub fn keyword_hits(text: &str, keywords: &KeywordConfig) -> Vec<String> {
    let lowered = text.to_lowercase();
    keywords
        .accept
        .iter()
        .filter(|keyword| contains_term(&lowered, keyword))
        .take(MAX_KEYWORD_HITS)
        .cloned()
        .collect()
}

fn contains_term(lowered: &str, term: &str) -> bool {
    let term = term.trim();
    !term.is_empty() && lowered.contains(&term.to_lowercase())
}

/// `term` occurs at the start of a word, so `sports` does not veto
/// `transports` while inflected forms (`cricketers`) still match.
fn starts_word(lowered: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    lowered.match_indices(term.as_str()).any(|(at, _)| {
        lowered[..at]
            .chars()
            .next_back()
            .is_none_or(|prev| !prev.is_alphanumeric())
    })
}

fn first_present<'a>(lowered: &str, terms: &'a [String]) -> Option<&'a str> {
    terms
        .iter()
        .find(|term| contains_term(lowered, term))
        .map(String::as_str)
}

fn count_present(lowered: &str, terms: &[String]) -> usize {
    let mut seen: Vec<String> = Vec::new();
    for term in terms {
        let key = term.trim().to_lowercase();
        if contains_term(lowered, &key) && !seen.contains(&key) {
            seen.push(key);
        }
    }
    seen.len()
}
