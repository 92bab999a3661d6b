//! Data models shared by the extraction pipeline, the crawler and the outputs.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceDescriptor`]: One website to crawl, with its selector hints
//! - [`KeywordConfig`]: Accept/reject keyword tables used by the relevance scorer
//! - [`ScoringPolicy`]: Strict or lenient thresholds for a source
//! - [`Candidate`]: Unvalidated `(title, content)` pair produced by an extraction method
//! - [`Article`]: A validated, persisted unit of scraped content
//! - [`SourceReport`] / [`CrawlStats`]: What one crawl run produced

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration record describing one website to crawl.
///
/// Loaded once from the source table and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceDescriptor {
    /// Short identifier used for file names and `--source` filters.
    pub id: String,
    /// Human readable name written into reports.
    pub name: String,
    /// Site root; relative links are resolved against it.
    pub base_url: String,
    /// Pages the crawl starts from, in order.
    pub seed_urls: Vec<String>,
    /// Field name (`title`, `content`, `date`) to ordered selector list.
    #[serde(default)]
    pub selectors: BTreeMap<String, Vec<String>>,
    pub category: String,
    pub language: String,
    #[serde(default)]
    pub extraction: ExtractionMode,
    #[serde(default)]
    pub policy: ScoringPolicy,
}

impl SourceDescriptor {
    /// Selectors configured for `field`, empty when the field is not configured.
    pub fn selectors_for(&self, field: &str) -> &[String] {
        self.selectors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Which extraction strategies a source runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Selector cascade plus container sweep.
    #[default]
    Standard,
    /// Everything in `Standard` plus free-text segmentation, for sites that
    /// only offer a wall of text.
    Segmented,
}

/// Topic keyword tables. Every list may be empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeywordConfig {
    /// Topic relevance terms; also the vocabulary for `keyword_hits`.
    #[serde(default)]
    pub accept: Vec<String>,
    /// Any hit rejects the candidate outright.
    #[serde(default)]
    pub reject: Vec<String>,
    /// Region names worth a location bonus.
    #[serde(default)]
    pub locations: Vec<String>,
    /// Multi-word domain phrases worth a bonus.
    #[serde(default)]
    pub strong_indicators: Vec<String>,
}

/// Named parameterization of the scorer thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    #[default]
    Strict,
    Lenient,
}

/// Thresholds the relevance scorer and the paragraph fallback run with.
///
/// Deserializes from a preset `mode` plus optional per-field overrides:
///
/// ```yaml
/// policy:
///   mode: lenient
///   min_content_len: 40
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "PolicySpec", into = "PolicySpec")]
pub struct ScoringPolicy {
    pub mode: ScoringMode,
    /// Content shorter than this (in characters) is rejected.
    pub min_content_len: usize,
    /// Title shorter than this (in characters) is rejected.
    pub min_title_len: usize,
    /// Minimum score to accept in strict mode.
    pub accept_threshold: i32,
    /// Paragraphs must be longer than this to feed the paragraph fallback.
    pub min_paragraph_len: usize,
}

impl ScoringPolicy {
    pub const fn strict() -> Self {
        Self {
            mode: ScoringMode::Strict,
            min_content_len: 100,
            min_title_len: 10,
            accept_threshold: 4,
            min_paragraph_len: 30,
        }
    }

    pub const fn lenient() -> Self {
        Self {
            mode: ScoringMode::Lenient,
            min_content_len: 20,
            min_title_len: 8,
            accept_threshold: 4,
            min_paragraph_len: 20,
        }
    }

    pub fn for_mode(mode: ScoringMode) -> Self {
        match mode {
            ScoringMode::Strict => Self::strict(),
            ScoringMode::Lenient => Self::lenient(),
        }
    }

    pub fn is_lenient(&self) -> bool {
        self.mode == ScoringMode::Lenient
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Serialized shape of [`ScoringPolicy`].
#[derive(Debug, Default, Deserialize, Serialize)]
struct PolicySpec {
    #[serde(default)]
    mode: ScoringMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_content_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_title_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accept_threshold: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_paragraph_len: Option<usize>,
}

impl From<PolicySpec> for ScoringPolicy {
    fn from(spec: PolicySpec) -> Self {
        let preset = ScoringPolicy::for_mode(spec.mode);
        ScoringPolicy {
            mode: spec.mode,
            min_content_len: spec.min_content_len.unwrap_or(preset.min_content_len),
            min_title_len: spec.min_title_len.unwrap_or(preset.min_title_len),
            accept_threshold: spec.accept_threshold.unwrap_or(preset.accept_threshold),
            min_paragraph_len: spec.min_paragraph_len.unwrap_or(preset.min_paragraph_len),
        }
    }
}

impl From<ScoringPolicy> for PolicySpec {
    fn from(policy: ScoringPolicy) -> Self {
        PolicySpec {
            mode: policy.mode,
            min_content_len: Some(policy.min_content_len),
            min_title_len: Some(policy.min_title_len),
            accept_threshold: Some(policy.accept_threshold),
            min_paragraph_len: Some(policy.min_paragraph_len),
        }
    }
}

/// An unvalidated `(title, content)` pair produced by one extraction method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub content: String,
    /// Raw text of the first matching `date` selector, when configured.
    pub date: Option<String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            date: None,
        }
    }
}

/// A validated article, ready to be handed to the sink.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Article {
    /// The page the article was extracted from.
    pub url: String,
    /// Display name of the source.
    pub source: String,
    pub category: String,
    pub language: String,
    pub scraped_at: DateTime<Local>,
    pub title: String,
    pub content: String,
    /// Accept keywords found in the title and content, in configuration order.
    pub keywords: Vec<String>,
    /// Date text found on the page, if the source configures a date selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    /// Relevance score at acceptance time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

/// Counters for one source crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Pages fetched successfully.
    pub pages_fetched: usize,
    /// Fetches that failed (transport, status, short body).
    pub fetch_failures: usize,
    /// Addresses skipped because they were already fetched in this run.
    pub already_visited: usize,
    /// Fetched pages that produced no accepted article.
    pub empty_pages: usize,
    /// Articles dropped because another page of the run had the same title.
    pub duplicate_articles: usize,
}

/// Everything one crawl run produced for a source.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source_id: String,
    pub source_name: String,
    pub articles: Vec<Article>,
    pub stats: CrawlStats,
}
