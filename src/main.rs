//! # Agriculture News Scraper
//!
//! Crawls a configurable set of agriculture news sites, pulls article text
//! out of raw HTML with a cascade of extraction heuristics, keeps only the
//! stories a relevance scorer accepts as agriculture news, and writes text
//! and JSON reports for a farmer-advisory app.
//!
//! ## Usage
//!
//! ```sh
//! agri_news_scraper -o ./output
//! agri_news_scraper -s krishi_jagran_news --no-delay
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: load and validate the source/keyword table
//! 2. **Crawl**: per source, seed page → listing pages → article pages
//! 3. **Extraction**: every fetched page runs through the strategy pipeline
//!    and the relevance scorer
//! 4. **Output**: per-source text reports, a consolidated text report and a
//!    JSON digest

use chrono::Local;
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawl;
mod extract;
mod fetch;
mod links;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod relevance;
mod utils;

use cli::Cli;
use config::SourceTable;
use crawl::{CrawlLimits, Crawler, RateLimit};
use fetch::HttpFetcher;
use models::{Article, SourceReport};
use outputs::{OutputLayout, STAMP_FORMAT, SourceCount, json, text};
use utils::{average_content_len, ensure_writable_dir, top_keywords, truncate_for_log};

const TOP_KEYWORDS: usize = 5;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("agri_news_scraper starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output_dir, ?args.config, ?args.sources, "Parsed CLI arguments");

    // ---- Load source table ----
    let table = SourceTable::load(args.config.as_deref())?.select(&args.sources)?;

    if args.list_sources {
        for source in &table.sources {
            println!(
                "{:<34} {:<10} {:<24} {}",
                source.id, source.language, source.category, source.base_url
            );
        }
        return Ok(());
    }

    // Early check: ensure output dirs are writable
    let layout = OutputLayout::new(&args.output_dir);
    for dir in [&layout.daily, &layout.consolidated] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Crawl ----
    let fetcher = HttpFetcher::new()?;
    let rate_limit = if args.no_delay {
        RateLimit::none()
    } else {
        RateLimit::polite()
    };
    let crawler = Crawler::new(&fetcher, &table.keywords)
        .with_limits(CrawlLimits {
            max_listing_pages: args.max_listing_pages,
            max_item_pages: args.max_item_pages,
        })
        .with_rate_limit(rate_limit);

    let stamp = Local::now().format(STAMP_FORMAT).to_string();
    info!(sources = table.sources.len(), %stamp, "Starting crawl");

    let reports: Vec<SourceReport> = stream::iter(table.sources.iter().enumerate())
        .then(|(i, source)| {
            let crawler = &crawler;
            let layout = &layout;
            let stamp = stamp.as_str();
            async move {
                // Same randomized pause between sources as between requests.
                if i > 0 {
                    rate_limit.pause().await;
                }
                let report = crawler.crawl(source).await;
                log_source_report(&report);

                if let Err(e) = text::write_source_report(
                    &layout.daily,
                    &report.source_id,
                    &report.articles,
                    Local::now(),
                    stamp,
                )
                .await
                {
                    error!(source = %report.source_id, error = %e, "Failed to write source report");
                }
                report
            }
        })
        .collect()
        .await;

    // ---- Consolidated output ----
    let breakdown: Vec<SourceCount> = reports
        .iter()
        .map(|report| SourceCount {
            source: report.source_id.clone(),
            articles: report.articles.len(),
        })
        .collect();
    let articles: Vec<Article> = reports
        .into_iter()
        .flat_map(|report| report.articles)
        .collect();
    let generated = Local::now();

    match text::write_consolidated(&layout.consolidated, &articles, &breakdown, generated, &stamp).await {
        Ok(Some(path)) => info!(path = %path.display(), "Consolidated report ready"),
        Ok(None) => info!("No articles; consolidated text report skipped"),
        Err(e) => error!(error = %e, "Failed to write consolidated report"),
    }

    let digest = json::RunDigest::new(&articles, &breakdown, generated);
    if let Err(e) = json::write_digest(&digest, &layout.consolidated, &stamp).await {
        error!(error = %e, "Failed to write JSON digest");
    }

    // ---- Summary ----
    info!(
        total_articles = articles.len(),
        sources = breakdown.len(),
        sources_with_articles = breakdown.iter().filter(|b| b.articles > 0).count(),
        avg_content_len = average_content_len(&articles),
        "Crawl complete"
    );
    for (keyword, count) in top_keywords(&articles, TOP_KEYWORDS) {
        info!(%keyword, articles = count, "Top keyword");
    }

    let elapsed = start_time.elapsed();
    info!(elapsed_secs = elapsed.as_secs_f64(), "agri_news_scraper finished");
    Ok(())
}

/// Per-source progress: counts, average length and a few sample titles.
fn log_source_report(report: &SourceReport) {
    if report.articles.is_empty() {
        info!(source = %report.source_id, stats = ?report.stats, "No articles found");
        return;
    }
    info!(
        source = %report.source_id,
        name = %report.source_name,
        articles = report.articles.len(),
        avg_content_len = average_content_len(&report.articles),
        stats = ?report.stats,
        "Source done"
    );
    for article in report.articles.iter().take(3) {
        debug!(
            source = %report.source_id,
            title = %truncate_for_log(&article.title, 70),
            content_len = article.content.chars().count(),
            keywords = %article.keywords.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
            "Sample article"
        );
    }
}
