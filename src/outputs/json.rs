//! JSON digest of a whole run.
//!
//! Written to `<consolidated_dir>/agriculture_news_<stamp>.json` for the
//! advisory app to ingest:
//!
//! ```json
//! {
//!   "generated_at": "2025-05-06T08:15:02+05:30",
//!   "total_articles": 2,
//!   "sources": { "krishi_jagran_news": 2 },
//!   "articles": [ { "url": "...", "title": "...", ... } ]
//! }
//! ```

use super::SourceCount;
use crate::models::Article;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
pub struct RunDigest<'a> {
    pub generated_at: DateTime<Local>,
    pub total_articles: usize,
    /// Source id to accepted article count.
    pub sources: BTreeMap<&'a str, usize>,
    pub articles: &'a [Article],
}

impl<'a> RunDigest<'a> {
    pub fn new(articles: &'a [Article], breakdown: &'a [SourceCount], generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            total_articles: articles.len(),
            sources: breakdown
                .iter()
                .map(|entry| (entry.source.as_str(), entry.articles))
                .collect(),
            articles,
        }
    }
}

/// Serialize the digest to `<consolidated_dir>/agriculture_news_<stamp>.json`.
///
/// Unlike the text reports the digest is written even for an empty run, so
/// consumers can tell "ran, found nothing" from "did not run".
#[instrument(level = "info", skip_all, fields(total = digest.total_articles))]
pub async fn write_digest(
    digest: &RunDigest<'_>,
    consolidated_dir: &Path,
    stamp: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(digest)?;
    let path = consolidated_dir.join(format!("agriculture_news_{stamp}.json"));

    info!(path = %path.display(), "Writing JSON");
    if let Err(e) = fs::write(&path, json).await {
        error!(path = %path.display(), error = %e, "Failed to write JSON digest");
        return Err(e.into());
    }
    info!(path = %path.display(), "Wrote JSON digest");

    Ok(path)
}
