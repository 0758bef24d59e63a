use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use manualqa_core::traits::EmbeddingOracle;
use manualqa_core::{Error, Result};
use manualqa_embed::{EmbeddingGateway, HashEmbedder};

struct ScriptedOracle {
    dim: usize,
    reply: fn(usize) -> Result<Vec<f32>>,
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingOracle for ScriptedOracle {
    fn model_name(&self) -> &str { "scripted" }
    fn dim(&self) -> usize { self.dim }
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)(self.dim)
    }
}

fn gateway(reply: fn(usize) -> Result<Vec<f32>>) -> (EmbeddingGateway, Arc<ScriptedOracle>) {
    let oracle = Arc::new(ScriptedOracle { dim: 4, reply, calls: AtomicUsize::new(0) });
    (EmbeddingGateway::new(oracle.clone()), oracle)
}

#[tokio::test]
async fn oracle_error_becomes_failure() {
    let (gw, oracle) = gateway(|_| Err(Error::Oracle("timeout".into())));
    assert!(gw.embed("anything").await.is_none());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1, "no retry");
}

#[tokio::test]
async fn wrong_dimension_becomes_failure() {
    let (gw, _) = gateway(|_| Ok(vec![0.1, 0.2]));
    assert!(gw.embed("anything").await.is_none());
}

#[tokio::test]
async fn non_finite_component_becomes_failure() {
    let (gw, _) = gateway(|d| { let mut v = vec![0.0; d]; v[1] = f32::NAN; Ok(v) });
    assert!(gw.embed("anything").await.is_none());
}

#[tokio::test]
async fn valid_vector_passes_through() {
    let (gw, _) = gateway(|d| Ok(vec![0.5; d]));
    assert_eq!(gw.embed("anything").await, Some(vec![0.5; 4]));
}

#[tokio::test]
async fn hash_embedder_through_gateway() {
    let gw = EmbeddingGateway::new(Arc::new(HashEmbedder::new(1024)));
    let v = gw.embed("hello world").await.expect("vector");
    assert_eq!(v.len(), 1024);
    assert_eq!(gw.model_name(), "hash");
}
