//! Plain-text reports.
//!
//! # Layout
//!
//! ```text
//! AGRICULTURE NEWS SCRAPER
//! ==================================================
//! Source: krishi_jagran_news
//! Generated: 2025-05-06 08:15:02
//! Total Articles: 2
//! ==================================================
//!
//! ARTICLE 1
//! --------------------
//! TITLE: Paddy procurement opens in Palakkad
//!
//! CONTENT:
//! Paddy procurement centres opened ...
//!
//! KEYWORDS: kerala, paddy, rice
//!
//! ==================================================
//! ```
//!
//! The consolidated report uses 60-character rules, adds a per-source count
//! block to the header and a `SOURCE:` line to every article.

use super::{GENERATED_FORMAT, SourceCount};
use crate::models::Article;
use chrono::{DateTime, Local};
use std::error::Error;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

const SOURCE_RULE: usize = 50;
const CONSOLIDATED_RULE: usize = 60;
const ARTICLE_RULE: usize = 20;

/// Render one source's articles.
pub fn render_source_report(source_id: &str, articles: &[Article], generated: DateTime<Local>) -> String {
    let rule = "=".repeat(SOURCE_RULE);
    let mut out = String::new();
    let _ = writeln!(out, "AGRICULTURE NEWS SCRAPER");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Source: {source_id}");
    let _ = writeln!(out, "Generated: {}", generated.format(GENERATED_FORMAT));
    let _ = writeln!(out, "Total Articles: {}", articles.len());
    let _ = writeln!(out, "{rule}\n");

    for (i, article) in articles.iter().enumerate() {
        write_article(&mut out, i + 1, article, false, &rule);
    }
    out
}

/// Render every article of the run, grouped in crawl order.
pub fn render_consolidated(
    articles: &[Article],
    breakdown: &[SourceCount],
    generated: DateTime<Local>,
) -> String {
    let rule = "=".repeat(CONSOLIDATED_RULE);
    let mut out = String::new();
    let _ = writeln!(out, "AGRICULTURE NEWS - CONSOLIDATED");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Generated: {}", generated.format(GENERATED_FORMAT));
    let _ = writeln!(out, "Total Articles: {}", articles.len());
    if !breakdown.is_empty() {
        let _ = writeln!(out, "Sources:");
        for entry in breakdown {
            let _ = writeln!(out, "  {}: {}", entry.source, entry.articles);
        }
    }
    let _ = writeln!(out, "{rule}\n");

    for (i, article) in articles.iter().enumerate() {
        write_article(&mut out, i + 1, article, true, &rule);
    }
    out
}

fn write_article(out: &mut String, number: usize, article: &Article, with_source: bool, rule: &str) {
    let _ = writeln!(out, "ARTICLE {number}");
    let _ = writeln!(out, "{}", "-".repeat(ARTICLE_RULE));
    if with_source {
        let _ = writeln!(out, "SOURCE: {}", article.source);
    }
    let _ = writeln!(out, "TITLE: {}\n", article.title);
    let _ = writeln!(out, "CONTENT:\n{}\n", article.content);
    let _ = writeln!(out, "KEYWORDS: {}", article.keywords.join(", "));
    let _ = writeln!(out, "\n{rule}\n");
}

/// Write `<daily_dir>/<source_id>_<stamp>.txt`.
///
/// Returns `None` without touching the disk when there is nothing to write.
#[instrument(level = "info", skip(articles, generated), fields(count = articles.len()))]
pub async fn write_source_report(
    daily_dir: &Path,
    source_id: &str,
    articles: &[Article],
    generated: DateTime<Local>,
    stamp: &str,
) -> Result<Option<PathBuf>, Box<dyn Error>> {
    if articles.is_empty() {
        return Ok(None);
    }
    let path = daily_dir.join(format!("{source_id}_{stamp}.txt"));
    let body = render_source_report(source_id, articles, generated);
    write(&path, body).await?;
    Ok(Some(path))
}

/// Write `<consolidated_dir>/agriculture_news_consolidated_<stamp>.txt`.
#[instrument(level = "info", skip_all, fields(count = articles.len()))]
pub async fn write_consolidated(
    consolidated_dir: &Path,
    articles: &[Article],
    breakdown: &[SourceCount],
    generated: DateTime<Local>,
    stamp: &str,
) -> Result<Option<PathBuf>, Box<dyn Error>> {
    if articles.is_empty() {
        return Ok(None);
    }
    let path = consolidated_dir.join(format!("agriculture_news_consolidated_{stamp}.txt"));
    let body = render_consolidated(articles, breakdown, generated);
    write(&path, body).await?;
    Ok(Some(path))
}

async fn write(path: &Path, body: String) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::write(path, body).await {
        error!(path = %path.display(), error = %e, "Failed to write text report");
        return Err(e.into());
    }
    info!(path = %path.display(), "Wrote text report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(source: &str, title: &str) -> Article {
        Article {
            url: format!("https://x.org/{}", title.len()),
            source: source.to_string(),
            category: "agriculture".to_string(),
            language: "english".to_string(),
            scraped_at: Local::now(),
            title: title.to_string(),
            content: "Paddy procurement centres opened across Palakkad.".to_string(),
            keywords: vec!["paddy".to_string(), "kerala".to_string()],
            published: None,
            score: Some(5),
        }
    }

    fn generated() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 6, 8, 15, 2).unwrap()
    }

    #[test]
    fn test_source_report_layout() {
        let articles = vec![article("Krishi Jagran", "Paddy procurement opens")];
        let text = render_source_report("krishi_jagran_news", &articles, generated());

        assert!(text.starts_with("AGRICULTURE NEWS SCRAPER\n"));
        assert!(text.contains(&format!("{}\n", "=".repeat(50))));
        assert!(text.contains("Source: krishi_jagran_news\n"));
        assert!(text.contains("Generated: 2025-05-06 08:15:02\n"));
        assert!(text.contains("Total Articles: 1\n"));
        assert!(text.contains("ARTICLE 1\n--------------------\nTITLE: Paddy procurement opens\n\n"));
        assert!(text.contains("CONTENT:\nPaddy procurement centres"));
        assert!(text.contains("KEYWORDS: paddy, kerala\n"));
        assert!(!text.contains("SOURCE:"));
    }

    #[test]
    fn test_consolidated_layout() {
        let articles = vec![
            article("Krishi Jagran", "Paddy procurement opens"),
            article("AgriWatch", "Rubber prices slip"),
        ];
        let breakdown = vec![
            SourceCount {
                source: "krishi_jagran_news".to_string(),
                articles: 1,
            },
            SourceCount {
                source: "agriwatch_news".to_string(),
                articles: 1,
            },
        ];
        let text = render_consolidated(&articles, &breakdown, generated());

        assert!(text.starts_with("AGRICULTURE NEWS - CONSOLIDATED\n"));
        assert!(text.contains(&"=".repeat(60)));
        assert!(text.contains("Total Articles: 2\n"));
        assert!(text.contains("  agriwatch_news: 1\n"));
        assert!(text.contains("ARTICLE 2\n--------------------\nSOURCE: AgriWatch\nTITLE: Rubber prices slip"));
    }

    #[tokio::test]
    async fn test_write_source_report_skips_empty_runs() {
        let dir = std::env::temp_dir().join(format!("agri_text_empty_{}", std::process::id()));
        let written = write_source_report(&dir, "none", &[], generated(), "20250506_081502")
            .await
            .unwrap();
        assert!(written.is_none());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_write_source_report_file_name() {
        let dir = std::env::temp_dir().join(format!("agri_text_write_{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();

        let articles = vec![article("Krishi Jagran", "Paddy procurement opens")];
        let path = write_source_report(&dir, "krishi", &articles, generated(), "20250506_081502")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.join("krishi_20250506_081502.txt"));
        let body = fs::read_to_string(&path).await.unwrap();
        assert!(body.contains("TITLE: Paddy procurement opens"));

        let _ = fs::remove_dir_all(&dir).await;
    }
}
