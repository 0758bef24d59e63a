//! Process-wide query service: loads every artifact once, then answers
//! questions concurrently from shared read-only state.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use manualqa_core::config::Settings;
use manualqa_core::traits::{JudgeOracle, VectorIndex};
use manualqa_core::{Answer, QueryClassifier, Retrieval};
use manualqa_embed::{get_default_embedder, EmbeddingGateway};
use manualqa_vector::{ChunkStore, LanceIndex, TableStore};

use crate::disambiguator::LlmDisambiguator;
use crate::generator::AnswerGenerator;
use crate::judge::GeminiJudge;
use crate::orchestrator::{RetrievalOptions, Retriever};
use crate::reranker::LlmReranker;

pub type ManualRetriever = Retriever<LlmDisambiguator, LlmReranker>;

pub struct QueryService {
    retriever: ManualRetriever,
    generator: AnswerGenerator,
}

impl QueryService {
    pub fn new(retriever: ManualRetriever, generator: AnswerGenerator) -> Self {
        Self { retriever, generator }
    }

    /// Load stores, open the index and connect the oracles. Any failure here is
    /// fatal: the service never starts half-initialized.
    pub async fn from_settings(settings: &Settings, base: &Path) -> anyhow::Result<Self> {
        let data = &settings.data;
        let chunks = Arc::new(ChunkStore::load(&data.meta_path(base))?);
        let tables = Arc::new(TableStore::load(&data.tables_path(base))?);
        let index = LanceIndex::open(&data.index_dir(base), &data.index_table).await?;
        info!(chunks = chunks.len(), tables = tables.len(), dim = index.dim(), "artifacts loaded");

        let embedder = EmbeddingGateway::new(get_default_embedder(&settings.embedding, &settings.oracle)?);
        if embedder.dim() != index.dim() {
            anyhow::bail!(
                "embedding dimension {} does not match index dimension {}",
                embedder.dim(),
                index.dim()
            );
        }

        let oracle = &settings.oracle;
        let api_key = oracle.resolve_api_key()?;
        let timeout = Duration::from_secs(oracle.timeout_secs);
        let judge = |model: &str| -> anyhow::Result<Arc<dyn JudgeOracle>> {
            Ok(Arc::new(GeminiJudge::new(&oracle.endpoint, api_key.clone(), model, timeout)?))
        };

        let retrieval = &settings.retrieval;
        let index: Arc<dyn VectorIndex> = Arc::new(index);
        let retriever = Retriever::new(
            QueryClassifier::new(&retrieval.keywords),
            embedder,
            index,
            chunks,
            LlmDisambiguator::new(judge(&oracle.judge_model)?),
            LlmReranker::new(judge(&oracle.rerank_model)?).with_char_budget(retrieval.rerank_char_budget),
        )
        .with_options(RetrievalOptions { top_k: retrieval.top_k, expand_k: retrieval.expand_k });
        let generator = AnswerGenerator::new(judge(&oracle.generation_model)?, tables);

        Ok(Self::new(retriever, generator))
    }

    pub fn retriever(&self) -> &ManualRetriever {
        &self.retriever
    }

    pub async fn retrieve(&self, question: &str) -> Retrieval {
        self.retriever.retrieve(question).await
    }

    pub async fn ask(&self, question: &str) -> Answer {
        let retrieval = self.retriever.retrieve(question).await;
        self.generator.answer(question, &retrieval).await
    }
}
