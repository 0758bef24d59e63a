//! `search(query)`: classify, embed, vector search, then disambiguate (numeric)
//! or rerank (general).

use std::sync::Arc;
use tracing::{debug, warn};

use manualqa_core::traits::{Disambiguator, Reranker, VectorIndex};
use manualqa_core::{Chunk, QueryClassifier, QueryKind, Retrieval};
use manualqa_embed::EmbeddingGateway;
use manualqa_vector::ChunkStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalOptions {
    /// Results kept for general queries.
    pub top_k: usize,
    /// Neighbours fetched from the index before disambiguation/reranking.
    pub expand_k: usize,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self { top_k: 4, expand_k: 8 }
    }
}

/// Stateless per call; all fields are read-only after construction.
pub struct Retriever<D, R> where D: Disambiguator, R: Reranker {
    classifier: QueryClassifier,
    embedder: EmbeddingGateway,
    index: Arc<dyn VectorIndex>,
    chunks: Arc<ChunkStore>,
    disambiguator: D,
    reranker: R,
    options: RetrievalOptions,
}

impl<D, R> Retriever<D, R> where D: Disambiguator, R: Reranker {
    pub fn new(
        classifier: QueryClassifier,
        embedder: EmbeddingGateway,
        index: Arc<dyn VectorIndex>,
        chunks: Arc<ChunkStore>,
        disambiguator: D,
        reranker: R,
    ) -> Self {
        Self { classifier, embedder, index, chunks, disambiguator, reranker, options: RetrievalOptions::default() }
    }

    pub fn with_options(mut self, options: RetrievalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RetrievalOptions {
        self.options
    }

    pub fn classify(&self, query: &str) -> QueryKind {
        self.classifier.classify(query)
    }

    pub async fn search(&self, query: &str) -> Vec<Chunk> {
        self.retrieve(query).await.chunks
    }

    pub async fn search_with(&self, query: &str, top_k: usize, expand_k: usize) -> Vec<Chunk> {
        self.retrieve_with(query, top_k, expand_k).await.chunks
    }

    pub async fn retrieve(&self, query: &str) -> Retrieval {
        self.retrieve_with(query, self.options.top_k, self.options.expand_k).await
    }

    /// Numeric queries yield at most one chunk; general queries at most `top_k`.
    /// Every failure along the way degrades to a smaller (possibly empty) result.
    pub async fn retrieve_with(&self, query: &str, top_k: usize, expand_k: usize) -> Retrieval {
        let kind = self.classifier.classify(query);
        debug!(?kind, "classified query");

        let Some(query_vec) = self.embedder.embed(query).await else {
            return Retrieval::empty(kind);
        };

        let candidates = self.candidates(&query_vec, expand_k).await;
        if candidates.is_empty() {
            debug!("no candidates");
            return Retrieval::empty(kind);
        }

        let chunks = match kind {
            QueryKind::Numeric => {
                match self.disambiguator.choose_best_table_chunk(query, &candidates).await {
                    Some(chunk) => vec![chunk],
                    None => {
                        debug!(page = candidates[0].page, "no table page chosen; using nearest candidate");
                        vec![candidates[0].clone()]
                    }
                }
            }
            QueryKind::General => match self.reranker.rerank(query, &candidates, top_k).await {
                Ok(mut ranked) => {
                    ranked.truncate(top_k);
                    ranked
                }
                Err(e) => {
                    warn!(error = %e, "reranker failed; keeping similarity order");
                    candidates.into_iter().take(top_k).collect()
                }
            },
        };
        debug!(pages = ?chunks.iter().map(|c| c.page).collect::<Vec<_>>(), "retrieved");
        Retrieval { kind, chunks }
    }

    /// Nearest chunks in similarity order, sentinels and unknown ids dropped.
    async fn candidates(&self, query_vec: &[f32], expand_k: usize) -> Vec<Chunk> {
        let neighbors = match self.index.search(query_vec, expand_k).await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "vector search failed");
                return Vec::new();
            }
        };
        neighbors
            .iter()
            .filter(|n| !n.is_sentinel())
            .filter_map(|n| {
                let chunk = self.chunks.get(n.id);
                if chunk.is_none() {
                    warn!(id = n.id, "index returned an id missing from the chunk store");
                }
                chunk.cloned()
            })
            .collect()
    }
}
