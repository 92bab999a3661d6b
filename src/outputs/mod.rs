//! Report writers for a finished crawl.
//!
//! # Submodules
//!
//! - [`text`]: per-source and consolidated plain-text reports
//! - [`json`]: consolidated JSON digest
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── daily/
//! │   ├── krishi_jagran_news_20250506_081502.txt
//! │   └── agriwatch_news_20250506_081502.txt
//! └── consolidated/
//!     ├── agriculture_news_consolidated_20250506_081502.txt
//!     └── agriculture_news_20250506_081502.json
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod json;
pub mod text;

/// File-name timestamp, e.g. `20250506_081502`.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Human timestamp in report headers.
pub const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted article count for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub articles: usize,
}

/// The two directories every run writes into.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub daily: PathBuf,
    pub consolidated: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            daily: root.join("daily"),
            consolidated: root.join("consolidated"),
        }
    }
}
