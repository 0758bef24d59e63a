//! Page-level chunking of ingestion output.
//!
//! Each manual page becomes exactly one chunk: pages in a flight manual mostly
//! cover one topic, so no splitting or overlap is applied.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::PageRecord;

/// Text embedded and stored for pages without extractable text.
pub const BLANK_PAGE_PLACEHOLDER: &str = " ";

#[derive(Debug, Default)]
pub struct DataProcessor;

impl DataProcessor {
    pub fn new() -> Self { Self }

    /// Read `[{page, text}]` as written by the page extractor.
    pub fn load_pages(&self, pages_path: &Path) -> Result<Vec<PageRecord>> {
        let raw = fs::read_to_string(pages_path)
            .map_err(|source| Error::Io { path: pages_path.to_path_buf(), source })?;
        let pages: Vec<PageRecord> = serde_json::from_str(&raw).map_err(|e| Error::InvalidData {
            path: pages_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut seen = HashSet::new();
        for p in &pages {
            if p.page == 0 {
                return Err(Error::InvalidData { path: pages_path.to_path_buf(), reason: "page numbers are 1-based".to_string() });
            }
            if !seen.insert(p.page) {
                return Err(Error::InvalidData { path: pages_path.to_path_buf(), reason: format!("duplicate page {}", p.page) });
            }
        }
        Ok(pages)
    }

    /// One normalized chunk per page, in input order.
    pub fn page_chunks(&self, pages: &[PageRecord]) -> Vec<PageRecord> {
        pages
            .iter()
            .map(|p| PageRecord { page: p.page, text: normalize_text(&p.text) })
            .collect()
    }
}

/// Collapse all whitespace runs to single spaces; blank input becomes the placeholder.
pub fn normalize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() { BLANK_PAGE_PLACEHOLDER.to_string() } else { collapsed }
}
