//! Utility functions for logging, run summaries and file system checks.
//!
//! This module provides helper functions used by the entry point:
//! - String truncation for log lines
//! - Run summary statistics (average content length, top keywords)
//! - File system validation for output directories

use crate::models::Article;
use itertools::Itertools;
use std::collections::HashMap;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters (never inside a UTF-8
/// sequence) with an ellipsis and a count of the dropped characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => {
            let dropped = s[cut..].chars().count();
            format!("{}…(+{} chars)", &s[..cut], dropped)
        }
    }
}

/// Mean content length in characters, 0 for an empty slice.
pub fn average_content_len(articles: &[Article]) -> usize {
    if articles.is_empty() {
        return 0;
    }
    let total: usize = articles.iter().map(|a| a.content.chars().count()).sum();
    total / articles.len()
}

/// The `n` keywords found in the most articles, most frequent first.
///
/// Ties keep the order in which keywords were first seen.
pub fn top_keywords(articles: &[Article], n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for keyword in articles.iter().flat_map(|a| a.keywords.iter()) {
        let first_seen = counts.len();
        counts.entry(keyword.as_str()).or_insert((0, first_seen)).0 += 1;
    }
    counts
        .into_iter()
        .sorted_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)))
        .take(n)
        .map(|(keyword, (count, _))| (keyword.to_string(), count))
        .collect()
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn article(content: &str, keywords: &[&str]) -> Article {
        Article {
            url: "https://x.org/a".to_string(),
            source: "Test".to_string(),
            category: "agriculture".to_string(),
            language: "english".to_string(),
            scraped_at: Local::now(),
            title: "Title".to_string(),
            content: content.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            published: None,
            score: None,
        }
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 chars)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "കൃഷി വാർത്തകൾ";
        let result = truncate_for_log(s, 3);
        assert!(result.starts_with("കൃഷ"));
        assert!(result.ends_with("chars)"));
    }

    #[test]
    fn test_average_content_len() {
        assert_eq!(average_content_len(&[]), 0);
        let articles = vec![article("abcd", &[]), article("ab", &[])];
        assert_eq!(average_content_len(&articles), 3);
    }

    #[test]
    fn test_top_keywords() {
        let articles = vec![
            article("x", &["rice", "kerala"]),
            article("x", &["kerala", "paddy"]),
            article("x", &["kerala", "rice"]),
            article("x", &["pepper"]),
        ];
        let top = top_keywords(&articles, 2);
        assert_eq!(
            top,
            vec![("kerala".to_string(), 3), ("rice".to_string(), 2)]
        );
        assert_eq!(top_keywords(&articles, 10).len(), 4);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let dir = std::env::temp_dir()
            .join(format!("agri_probe_{}", std::process::id()))
            .join("nested");
        ensure_writable_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join("..__probe_write__").exists());
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }
}
