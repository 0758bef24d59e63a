use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Chunk, Neighbor};

/// Remote or local model turning text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingOracle: Send + Sync {
    fn model_name(&self) -> &str;
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Read-only nearest-neighbour search over the built index.
///
/// Implementations return exactly `k` neighbours ordered by ascending distance,
/// padding with [`Neighbor::sentinel`] when fewer vectors are stored.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Natural-language judgment capability: prompt in, text out.
#[async_trait]
pub trait JudgeOracle: Send + Sync {
    async fn evaluate(&self, prompt: &str) -> Result<String>;
}

/// Picks the one candidate holding the table a numeric query needs.
#[async_trait]
pub trait Disambiguator: Send + Sync {
    async fn choose_best_table_chunk(&self, query: &str, candidates: &[Chunk]) -> Option<Chunk>;
}

/// Reorders candidates by relevance and keeps at most `top_k`.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, query: &str, candidates: &[Chunk], top_k: usize) -> Result<Vec<Chunk>>;
}
