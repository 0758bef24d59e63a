//! Shared plumbing for the manualqa binaries: logging setup, the HTTP router
//! and the offline index build.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use manualqa_core::config::Settings;
use manualqa_core::data_processor::DataProcessor;
use manualqa_core::{Answer, Chunk, ChunkId};
use manualqa_embed::EmbeddingGateway;
use manualqa_retrieval::QueryService;
use manualqa_vector::{ChunkStore, LanceIndexWriter};

/// `RUST_LOG` wins; otherwise `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

pub fn router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .with_state(service)
}

async fn query(State(service): State<Arc<QueryService>>, Json(req): Json<QueryRequest>) -> Json<Answer> {
    Json(service.ask(&req.question).await)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: usize,
    pub skipped: usize,
}

/// Embed every page of `pages_path` and write the vector index plus the chunk
/// metadata store. Pages whose embedding fails are skipped; ids follow
/// insertion order so they always match vector positions.
pub async fn build_index(
    settings: &Settings,
    base: &Path,
    pages_path: &Path,
    embedder: &EmbeddingGateway,
    show_progress: bool,
) -> anyhow::Result<IndexReport> {
    let processor = DataProcessor::new();
    let pages = processor.page_chunks(&processor.load_pages(pages_path)?);
    info!(pages = pages.len(), model = embedder.model_name(), "embedding pages");

    let pb = if show_progress { ProgressBar::new(pages.len() as u64) } else { ProgressBar::hidden() };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut chunks: Vec<Chunk> = Vec::with_capacity(pages.len());
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(pages.len());
    let mut skipped = 0;
    for page in pages {
        match embedder.embed(&page.text).await {
            Some(v) => {
                chunks.push(Chunk { id: chunks.len() as ChunkId, page: page.page, text: page.text });
                vectors.push(v);
            }
            None => {
                warn!(page = page.page, "embedding failed; page left out of the index");
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if chunks.is_empty() {
        anyhow::bail!("no page could be embedded; index not written");
    }

    let ids: Vec<ChunkId> = chunks.iter().map(|c| c.id).collect();
    let writer = LanceIndexWriter::create(&settings.data.index_dir(base), &settings.data.index_table).await?;
    let indexed = writer.build(&ids, &vectors).await?;
    let store = ChunkStore::from_chunks(chunks).map_err(|reason| anyhow::anyhow!(reason))?;
    store.save(&settings.data.meta_path(base))?;
    info!(indexed, skipped, "index written");

    Ok(IndexReport { indexed, skipped })
}
