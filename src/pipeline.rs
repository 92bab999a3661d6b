//! Turns one parsed page into accepted [`Article`]s.
//!
//! # Order of strategies
//!
//! 1. **Single-article cascade**: configured selectors, generic article
//!    selectors, paragraph fallback. The cascade stops at the first strategy
//!    that produced an accepted article. Skipped on listing pages (two or
//!    more article cards), where it would merge the cards into one story.
//! 2. **Multi-article sweep**: container sweep always, free-text segmentation
//!    for sources marked `segmented`. These always run and accumulate.
//!
//! After every strategy the new candidates are normalized, deduplicated
//! against the titles already accepted on this page (case-folded) and scored.

use crate::extract::container::card_count;
use crate::extract::{
    ConfiguredSelectorExtraction, ContainerSweepExtraction, ExtractionMethod,
    GenericArticleExtraction, Page, ParagraphFallbackExtraction, TextBlockSegmentation,
};
use crate::models::{Article, Candidate, ExtractionMode, KeywordConfig};
use crate::normalize::normalize;
use crate::relevance::{self, keyword_hits};
use chrono::Local;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::debug;

/// Pages with at least this many article cards are listing pages.
const MIN_LISTING_CARDS: usize = 2;

/// Ordered extraction strategies for one extraction mode.
pub struct ExtractionPipeline {
    cascade: Vec<Box<dyn ExtractionMethod>>,
    sweep: Vec<Box<dyn ExtractionMethod>>,
}

impl ExtractionPipeline {
    pub fn for_mode(mode: ExtractionMode) -> Self {
        let cascade: Vec<Box<dyn ExtractionMethod>> = vec![
            Box::new(ConfiguredSelectorExtraction),
            Box::new(GenericArticleExtraction),
            Box::new(ParagraphFallbackExtraction),
        ];
        let mut sweep: Vec<Box<dyn ExtractionMethod>> = vec![Box::new(ContainerSweepExtraction)];
        if mode == ExtractionMode::Segmented {
            sweep.push(Box::new(TextBlockSegmentation));
        }
        Self { cascade, sweep }
    }

    /// Strategy names in the order they run.
    pub fn method_names(&self) -> Vec<&'static str> {
        self.cascade
            .iter()
            .chain(self.sweep.iter())
            .map(|method| method.name())
            .collect()
    }

    /// Extract, deduplicate and score every candidate on `page`.
    ///
    /// A page may legitimately produce no articles.
    pub fn run(&self, page: &Page<'_>, keywords: &KeywordConfig) -> Vec<Article> {
        let mut run = PipelineRun {
            page,
            keywords,
            seen_titles: HashSet::new(),
            articles: Vec::new(),
        };

        let cards = card_count(page);
        if cards >= MIN_LISTING_CARDS {
            debug!(address = %page.address, cards, "Listing page; single-article cascade skipped");
        } else {
            for method in &self.cascade {
                if run.apply(method.as_ref()) > 0 {
                    break;
                }
            }
        }
        for method in &self.sweep {
            run.apply(method.as_ref());
        }

        debug!(
            address = %page.address,
            accepted = run.articles.len(),
            "Extraction pipeline finished"
        );
        run.articles
    }
}

struct PipelineRun<'p, 'a> {
    page: &'p Page<'a>,
    keywords: &'p KeywordConfig,
    seen_titles: HashSet<String>,
    articles: Vec<Article>,
}

impl PipelineRun<'_, '_> {
    /// Run one strategy and keep what passes. Returns the number accepted.
    fn apply(&mut self, method: &dyn ExtractionMethod) -> usize {
        let candidates = method.extract(self.page);
        if candidates.is_empty() {
            debug!(method = method.name(), address = %self.page.address, "Extraction miss");
            return 0;
        }

        let before = self.articles.len();
        let fresh = candidates
            .into_iter()
            .map(normalize_candidate)
            .filter(|c| !c.title.is_empty() && !c.content.is_empty())
            .unique_by(|c| c.title.to_lowercase());

        for candidate in fresh {
            let key = candidate.title.to_lowercase();
            if self.seen_titles.contains(&key) {
                debug!(method = method.name(), title = %candidate.title, "Duplicate title skipped");
                continue;
            }

            let verdict = relevance::accept(
                &candidate.title,
                &candidate.content,
                self.keywords,
                self.page.policy(),
                self.page.address,
            );
            if !verdict.accepted {
                continue;
            }

            self.seen_titles.insert(key);
            let article = self.to_article(candidate, verdict.score);
            self.articles.push(article);
        }

        let accepted = self.articles.len() - before;
        debug!(method = method.name(), accepted, "Extraction method applied");
        accepted
    }

    fn to_article(&self, candidate: Candidate, score: Option<i32>) -> Article {
        let source = self.page.source;
        let keywords = keyword_hits(
            &format!("{} {}", candidate.title, candidate.content),
            self.keywords,
        );
        Article {
            url: self.page.address.to_string(),
            source: source.name.clone(),
            category: source.category.clone(),
            language: source.language.clone(),
            scraped_at: Local::now(),
            title: candidate.title,
            content: candidate.content,
            keywords,
            published: candidate.date,
            score,
        }
    }
}

fn normalize_candidate(candidate: Candidate) -> Candidate {
    Candidate {
        title: normalize(&candidate.title),
        content: normalize(&candidate.content),
        date: candidate
            .date
            .map(|d| normalize(&d))
            .filter(|d| !d.is_empty()),
    }
}
