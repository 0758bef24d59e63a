//! Domain types shared by the index, retrieval and serving crates.

use serde::{Deserialize, Serialize};

/// Position of a chunk in the vector index (insertion order).
pub type ChunkId = i64;

/// Id the index uses to mark an empty result slot.
pub const SENTINEL_ID: ChunkId = -1;

/// One indexed page of the manual.
///
/// - `id`: vector insertion position, assigned at build time and never reused
/// - `page`: 1-based page number in the source document
/// - `text`: whitespace-collapsed page text (a single space for blank pages)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub page: u32,
    pub text: String,
}

/// One page as produced by ingestion, before it is embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub page: u32,
    pub text: String,
}

/// A cell grid extracted from a page. Empty cells may be `null` in the artifact.
pub type TableGrid = Vec<Vec<Option<String>>>;

/// One entry of the table store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    pub page: u32,
    pub table: TableGrid,
}

/// A nearest-neighbour hit. `distance` is squared L2, lower is closer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: ChunkId,
    pub distance: f32,
}

impl Neighbor {
    pub fn sentinel() -> Self {
        Self { id: SENTINEL_ID, distance: f32::INFINITY }
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_ID
    }
}

/// Route chosen for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Table lookup: a single authoritative page is selected.
    Numeric,
    /// Free-text question: several reranked pages.
    General,
}

/// Output of one retrieval pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub kind: QueryKind,
    pub chunks: Vec<Chunk>,
}

impl Retrieval {
    pub fn empty(kind: QueryKind) -> Self {
        Self { kind, chunks: Vec::new() }
    }
}

/// Response body of the query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub pages: Vec<u32>,
}

impl Answer {
    pub fn new(answer: impl Into<String>, pages: Vec<u32>) -> Self {
        Self { answer: answer.into(), pages }
    }
}
