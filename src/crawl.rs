//! Per-source crawl: seed pages, listing expansion, then article pages.
//!
//! # Phases
//!
//! For every seed address of a source:
//!
//! 1. **Seed**: fetch the seed, extract, discover listing and item links.
//! 2. **Listing expansion**: fetch up to `max_listing_pages` listing links,
//!    extract from each, and remember the item links of the most recent page
//!    that had any.
//! 3. **Item fetch**: fetch up to `max_item_pages` of those item links and
//!    extract from each.
//!
//! Every address is fetched at most once per run. A failed fetch is logged,
//! counted and skipped; nothing aborts the crawl.
//!
//! Parsed documents never live across an `.await`: each page is parsed,
//! extracted and mined for links in one synchronous step ([`visit_page`]).

use crate::extract::Page;
use crate::fetch::Fetch;
use crate::links::{find_item_links, find_listing_links, resolve};
use crate::models::{Article, CrawlStats, KeywordConfig, SourceDescriptor, SourceReport};
use crate::pipeline::ExtractionPipeline;
use rand::{Rng, rng};
use scraper::Html;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// How far a crawl may wander from each seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_listing_pages: usize,
    pub max_item_pages: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_listing_pages: 5,
            max_item_pages: 10,
        }
    }
}

/// Randomized pause taken before every fetch except the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub min: Duration,
    pub max: Duration,
}

impl RateLimit {
    /// 1.5 to 2.5 seconds between requests.
    pub const fn polite() -> Self {
        Self {
            min: Duration::from_millis(1500),
            max: Duration::from_millis(2500),
        }
    }

    pub const fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn is_none(&self) -> bool {
        self.max.is_zero()
    }

    /// One pause length drawn from `min..=max`.
    pub fn sample(&self) -> Duration {
        let (lo, hi) = (self.min.as_millis() as u64, self.max.as_millis() as u64);
        let millis = if hi > lo { rng().random_range(lo..=hi) } else { lo };
        Duration::from_millis(millis)
    }

    pub async fn pause(&self) {
        if self.is_none() {
            return;
        }
        sleep(self.sample()).await;
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::polite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Seed,
    ListingExpansion,
    ItemFetch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Seed => "seed",
            Phase::ListingExpansion => "listing",
            Phase::ItemFetch => "item",
        })
    }
}

/// What one fetched page contributed.
struct PageOutcome {
    articles: Vec<Article>,
    listing_links: Vec<String>,
    item_links: Vec<String>,
}

/// Crawls one source at a time with a shared fetcher and keyword table.
pub struct Crawler<'a, F: Fetch> {
    fetcher: &'a F,
    keywords: &'a KeywordConfig,
    limits: CrawlLimits,
    rate_limit: RateLimit,
}

impl<'a, F: Fetch> Crawler<'a, F> {
    pub fn new(fetcher: &'a F, keywords: &'a KeywordConfig) -> Self {
        Self {
            fetcher,
            keywords,
            limits: CrawlLimits::default(),
            rate_limit: RateLimit::default(),
        }
    }

    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Crawl every seed of `source` and collect the accepted articles.
    #[instrument(level = "info", skip_all, fields(source = %source.id))]
    pub async fn crawl(&self, source: &SourceDescriptor) -> SourceReport {
        let mut run = CrawlRun {
            crawler: self,
            source,
            pipeline: ExtractionPipeline::for_mode(source.extraction),
            visited: HashSet::new(),
            titles: HashSet::new(),
            articles: Vec::new(),
            stats: CrawlStats::default(),
        };

        info!(name = %source.name, seeds = source.seed_urls.len(), "Crawling source");
        debug!(methods = ?run.pipeline.method_names(), policy = ?source.policy, "Extraction setup");
        for seed in &source.seed_urls {
            // Seeds may be relative to the base address.
            match resolve(&source.base_url, seed) {
                Some(address) => run.crawl_seed(&address).await,
                None => warn!(%seed, "Seed is not an http(s) address; skipping"),
            }
        }

        info!(
            articles = run.articles.len(),
            pages = run.stats.pages_fetched,
            failures = run.stats.fetch_failures,
            "Source crawl finished"
        );
        SourceReport {
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            articles: run.articles,
            stats: run.stats,
        }
    }
}

/// Mutable state of one source crawl.
struct CrawlRun<'c, 'a, F: Fetch> {
    crawler: &'c Crawler<'a, F>,
    source: &'c SourceDescriptor,
    pipeline: ExtractionPipeline,
    visited: HashSet<String>,
    titles: HashSet<String>,
    articles: Vec<Article>,
    stats: CrawlStats,
}

impl<F: Fetch> CrawlRun<'_, '_, F> {
    async fn crawl_seed(&mut self, seed: &str) {
        let Some(outcome) = self.visit(seed, Phase::Seed).await else {
            return;
        };
        let listing_links = outcome.listing_links;
        let mut item_links = outcome.item_links;

        for address in listing_links.iter().take(self.crawler.limits.max_listing_pages) {
            if let Some(outcome) = self.visit(address, Phase::ListingExpansion).await
                && !outcome.item_links.is_empty()
            {
                item_links = outcome.item_links;
            }
        }

        for address in item_links.iter().take(self.crawler.limits.max_item_pages) {
            self.visit(address, Phase::ItemFetch).await;
        }
    }

    /// Fetch and process one address, once per run.
    async fn visit(&mut self, address: &str, phase: Phase) -> Option<PageOutcome> {
        if !self.visited.insert(address.to_string()) {
            self.stats.already_visited += 1;
            debug!(%address, %phase, "Already visited");
            return None;
        }

        if self.stats.pages_fetched + self.stats.fetch_failures > 0 {
            self.crawler.rate_limit.pause().await;
        }

        let body = match self.crawler.fetcher.fetch(address).await {
            Ok(body) => body,
            Err(e) => {
                self.stats.fetch_failures += 1;
                warn!(%address, %phase, error = %e, "Fetch failed; skipping");
                return None;
            }
        };
        self.stats.pages_fetched += 1;

        let mut outcome = visit_page(
            &body,
            address,
            self.source,
            &self.pipeline,
            self.crawler.keywords,
        );
        let found = outcome.articles.len();
        self.keep(std::mem::take(&mut outcome.articles));
        if found == 0 {
            self.stats.empty_pages += 1;
        }
        info!(
            %address,
            %phase,
            articles = found,
            listing_links = outcome.listing_links.len(),
            item_links = outcome.item_links.len(),
            "Page processed"
        );

        Some(outcome)
    }

    /// Add articles whose titles this run has not produced yet.
    fn keep(&mut self, articles: Vec<Article>) {
        for article in articles {
            if self.titles.insert(article.title.to_lowercase()) {
                self.articles.push(article);
            } else {
                self.stats.duplicate_articles += 1;
                debug!(title = %article.title, "Article already collected from another page");
            }
        }
    }
}

/// Parse, extract and discover links in one synchronous step.
fn visit_page(
    body: &str,
    address: &str,
    source: &SourceDescriptor,
    pipeline: &ExtractionPipeline,
    keywords: &KeywordConfig,
) -> PageOutcome {
    let document = Html::parse_document(body);
    let page = Page::new(&document, address, source);
    PageOutcome {
        articles: pipeline.run(&page, keywords),
        listing_links: find_listing_links(&document, address),
        item_links: find_item_links(&document, address),
    }
}
