//! manualqa-embed
//!
//! Embedding oracles and the gateway that turns their failures into a
//! "no vector" result instead of an error.

use std::sync::Arc;
use std::time::Duration;

use manualqa_core::config::{EmbeddingProvider, EmbeddingSettings, OracleSettings};
use manualqa_core::traits::EmbeddingOracle;
use tracing::{info, warn};

pub mod providers;

pub use providers::{GeminiEmbedder, HashEmbedder};

/// Single entry point for query- and build-time embeddings.
#[derive(Clone)]
pub struct EmbeddingGateway {
    oracle: Arc<dyn EmbeddingOracle>,
}

impl EmbeddingGateway {
    pub fn new(oracle: Arc<dyn EmbeddingOracle>) -> Self {
        Self { oracle }
    }

    pub fn dim(&self) -> usize {
        self.oracle.dim()
    }

    pub fn model_name(&self) -> &str {
        self.oracle.model_name()
    }

    /// `None` means no vector is available for `text`; callers treat it as an
    /// empty result, never as a fatal error.
    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        match self.oracle.embed(text).await {
            Ok(v) => {
                if let Some(reason) = self.malformed(&v) {
                    warn!(model = self.oracle.model_name(), %reason, "discarding malformed embedding");
                    return None;
                }
                Some(v)
            }
            Err(e) => {
                warn!(model = self.oracle.model_name(), error = %e, "embedding failed");
                None
            }
        }
    }

    fn malformed(&self, v: &[f32]) -> Option<String> {
        if v.is_empty() {
            return Some("empty vector".to_string());
        }
        if v.len() != self.oracle.dim() {
            return Some(format!("expected {} dimensions, got {}", self.oracle.dim(), v.len()));
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Some("non-finite component".to_string());
        }
        None
    }
}

/// Build the configured oracle. `APP_USE_FAKE_EMBEDDINGS=1` selects the hash embedder.
pub fn get_default_embedder(
    embedding: &EmbeddingSettings,
    oracle: &OracleSettings,
) -> anyhow::Result<Arc<dyn EmbeddingOracle>> {
    match embedding.effective_provider() {
        EmbeddingProvider::Hash => {
            info!(dim = embedding.dim, "using hash embedder");
            Ok(Arc::new(HashEmbedder::new(embedding.dim)))
        }
        EmbeddingProvider::Gemini => {
            info!(model = %embedding.model, "using Gemini embedder");
            let embedder = GeminiEmbedder::new(
                &oracle.endpoint,
                oracle.resolve_api_key()?,
                &embedding.model,
                embedding.dim,
                Duration::from_secs(oracle.timeout_secs),
            )?;
            Ok(Arc::new(embedder))
        }
    }
}
