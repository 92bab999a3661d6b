//! Source and keyword table loading.
//!
//! The table is YAML with two top-level keys:
//!
//! ```yaml
//! keywords:
//!   accept: [agriculture, farmer, paddy]
//!   reject: [cricket, cinema]
//!   locations: [kerala, palakkad]
//!   strong_indicators: [minimum support price]
//! sources:
//!   - id: agri_today
//!     name: Agriculture Today
//!     base_url: https://www.agriculturetoday.in/
//!     seed_urls: [https://www.agriculturetoday.in/]
//!     selectors:
//!       title: [h1, .entry-title]
//!       content: [.entry-content, p]
//!     category: agriculture_aggregator
//!     language: english
//!     policy: { mode: lenient }
//! ```
//!
//! A built-in table ships inside the binary (`config/sources.yaml`); `--config`
//! replaces it wholesale. The table is validated once at load time and passed
//! around by reference afterwards.

use crate::models::{KeywordConfig, SourceDescriptor};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

const BUILTIN_TABLE: &str = include_str!("../config/sources.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid source table: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("source #{index} has an empty id")]
    MissingId { index: usize },
    #[error("source {id}: base_url {url:?} is not a valid address")]
    BadBaseUrl { id: String, url: String },
    #[error("source {id} has no seed addresses")]
    NoSeeds { id: String },
    #[error("source id {0} appears more than once")]
    DuplicateId(String),
    #[error("unknown source id(s): {0}")]
    UnknownSources(String),
}

/// Everything a crawl needs to know about what to fetch and what to keep.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceTable {
    #[serde(default)]
    pub keywords: KeywordConfig,
    pub sources: Vec<SourceDescriptor>,
}

impl SourceTable {
    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_TABLE)
    }

    /// Load `path`, or the built-in table when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let table = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml(&raw)?
            }
            None => Self::builtin()?,
        };
        info!(
            sources = table.sources.len(),
            accept_keywords = table.keywords.accept.len(),
            reject_keywords = table.keywords.reject.len(),
            "Loaded source table"
        );
        Ok(table)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let table: SourceTable = serde_yaml::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for (index, source) in self.sources.iter().enumerate() {
            if source.id.trim().is_empty() {
                return Err(ConfigError::MissingId { index });
            }
            if Url::parse(&source.base_url).is_err() {
                return Err(ConfigError::BadBaseUrl {
                    id: source.id.clone(),
                    url: source.base_url.clone(),
                });
            }
            if source.seed_urls.is_empty() {
                return Err(ConfigError::NoSeeds {
                    id: source.id.clone(),
                });
            }
            if !ids.insert(source.id.as_str()) {
                return Err(ConfigError::DuplicateId(source.id.clone()));
            }
        }
        Ok(())
    }

    /// Restrict the table to `ids`, keeping table order. An empty filter keeps
    /// every source.
    pub fn select(mut self, ids: &[String]) -> Result<Self, ConfigError> {
        if ids.is_empty() {
            return Ok(self);
        }
        let known: HashSet<&str> = self.sources.iter().map(|s| s.id.as_str()).collect();
        let unknown: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownSources(unknown.join(", ")));
        }
        self.sources.retain(|source| ids.contains(&source.id));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractionMode, ScoringMode};

    const MINIMAL: &str = r#"
keywords:
  accept: [paddy]
sources:
  - id: a
    name: A
    base_url: https://a.example/
    seed_urls: [https://a.example/]
    category: agriculture
    language: english
  - id: b
    name: B
    base_url: https://b.example/
    seed_urls: [https://b.example/news]
    category: agriculture
    language: malayalam
    policy: { mode: lenient }
"#;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = SourceTable::builtin().unwrap();
        assert_eq!(table.sources.len(), 15);
        assert!(!table.keywords.accept.is_empty());
        assert!(table.keywords.reject.contains(&"cricket".to_string()));

        let manorama = table
            .sources
            .iter()
            .find(|s| s.id == "manorama_agriculture")
            .unwrap();
        assert_eq!(manorama.policy.mode, ScoringMode::Lenient);

        let et = table
            .sources
            .iter()
            .find(|s| s.id == "economic_times_agriculture")
            .unwrap();
        assert_eq!(et.extraction, ExtractionMode::Segmented);
        assert!(!et.selectors_for("content").is_empty());
    }

    #[test]
    fn test_minimal_table() {
        let table = SourceTable::from_yaml(MINIMAL).unwrap();
        assert_eq!(table.sources.len(), 2);
        assert!(table.keywords.reject.is_empty());
        assert!(table.sources[1].policy.is_lenient());
    }

    #[test]
    fn test_select_keeps_table_order() {
        let table = SourceTable::from_yaml(MINIMAL).unwrap();
        let picked = table
            .select(&["b".to_string(), "a".to_string()])
            .unwrap();
        let ids: Vec<&str> = picked.sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_select_unknown_id() {
        let table = SourceTable::from_yaml(MINIMAL).unwrap();
        let err = table.select(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSources(ref ids) if ids == "nope"));
    }

    #[test]
    fn test_validation_errors() {
        let dup = MINIMAL.replace("id: b", "id: a");
        assert!(matches!(
            SourceTable::from_yaml(&dup),
            Err(ConfigError::DuplicateId(id)) if id == "a"
        ));

        let bad_url = MINIMAL.replace("base_url: https://a.example/", "base_url: not-a-url");
        assert!(matches!(
            SourceTable::from_yaml(&bad_url),
            Err(ConfigError::BadBaseUrl { .. })
        ));

        let no_seeds = MINIMAL.replace("seed_urls: [https://a.example/]", "seed_urls: []");
        assert!(matches!(
            SourceTable::from_yaml(&no_seeds),
            Err(ConfigError::NoSeeds { .. })
        ));

        let empty_id = MINIMAL.replace("id: a", "id: \"\"");
        assert!(matches!(
            SourceTable::from_yaml(&empty_id),
            Err(ConfigError::MissingId { index: 0 })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SourceTable::load(Some(Path::new("/nonexistent/sources.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
