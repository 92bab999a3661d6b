//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The output directory and config path can also come from environment
//! variables.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the agriculture news scraper.
///
/// # Examples
///
/// ```sh
/// # Crawl every built-in source into ./output
/// agri_news_scraper
///
/// # Two sources only, no politeness delay, custom table
/// agri_news_scraper -s agriwatch_news -s agdaily_news --no-delay -c my_sources.yaml
///
/// # Show the configured sources and exit
/// agri_news_scraper --list-sources
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root directory for daily and consolidated reports
    #[arg(short, long, env = "AGRI_NEWS_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Optional path to a sources.yaml table (defaults to the built-in table)
    #[arg(short, long, env = "AGRI_NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only crawl this source id (repeatable)
    #[arg(short, long = "source", value_name = "ID")]
    pub sources: Vec<String>,

    /// Listing pages followed per seed
    #[arg(long, default_value_t = 5)]
    pub max_listing_pages: usize,

    /// Article pages fetched per seed
    #[arg(long, default_value_t = 10)]
    pub max_item_pages: usize,

    /// Disable the pause between requests and between sources
    #[arg(long)]
    pub no_delay: bool,

    /// Print the configured sources and exit
    #[arg(long)]
    pub list_sources: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["agri_news_scraper"]);

        assert_eq!(cli.output_dir, PathBuf::from("output"));
        assert!(cli.config.is_none());
        assert!(cli.sources.is_empty());
        assert_eq!(cli.max_listing_pages, 5);
        assert_eq!(cli.max_item_pages, 10);
        assert!(!cli.no_delay);
        assert!(!cli.list_sources);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "agri_news_scraper",
            "--output-dir",
            "/tmp/agri",
            "--config",
            "sources.yaml",
            "--source",
            "agriwatch_news",
            "--max-item-pages",
            "3",
            "--no-delay",
        ]);

        assert_eq!(cli.output_dir, PathBuf::from("/tmp/agri"));
        assert_eq!(cli.config, Some(PathBuf::from("sources.yaml")));
        assert_eq!(cli.sources, vec!["agriwatch_news".to_string()]);
        assert_eq!(cli.max_item_pages, 3);
        assert!(cli.no_delay);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "agri_news_scraper",
            "-o",
            "/tmp/out",
            "-s",
            "a",
            "-s",
            "b",
            "-c",
            "table.yaml",
        ]);

        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cli.sources, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(cli.config, Some(PathBuf::from("table.yaml")));
    }
}
