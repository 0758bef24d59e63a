//! HTTP surface: served on an ephemeral port with the hash embedder and an
//! unreachable oracle, so every answer takes its fallback path.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use manualqa_cli::router;
use manualqa_core::config::{EmbeddingProvider, Settings};
use manualqa_core::types::TableRecord;
use manualqa_core::Chunk;
use manualqa_embed::HashEmbedder;
use manualqa_retrieval::QueryService;
use manualqa_vector::{ChunkStore, LanceIndexWriter};
use serde_json::Value;
use tempfile::TempDir;

const DIM: usize = 32;

fn settings() -> Settings {
    let mut s = Settings::default();
    s.embedding.provider = EmbeddingProvider::Hash;
    s.embedding.dim = DIM;
    s.oracle.endpoint = "http://127.0.0.1:9".to_string();
    s.oracle.api_key = Some("test-key".to_string());
    s.oracle.timeout_secs = 2;
    s
}

async fn build_artifacts(base: &Path, s: &Settings) {
    let texts = [
        "takeoff limit weight at 2000 ft and oat 30 table",
        "fuel system pumps and crossfeed valve",
        "anti-ice system for wings and engines",
    ];
    let embedder = HashEmbedder::new(DIM);
    let chunks: Vec<Chunk> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Chunk { id: i as i64, page: i as u32 + 1, text: (*t).to_string() })
        .collect();
    let ids: Vec<i64> = chunks.iter().map(|c| c.id).collect();
    let vectors: Vec<Vec<f32>> = chunks.iter().map(|c| embedder.embed_sync(&c.text)).collect();

    let writer = LanceIndexWriter::create(&s.data.index_dir(base), &s.data.index_table).await.unwrap();
    writer.build(&ids, &vectors).await.unwrap();
    ChunkStore::from_chunks(chunks).unwrap().save(&s.data.meta_path(base)).unwrap();

    let tables = vec![TableRecord {
        page: 1,
        table: vec![vec![Some("OAT".to_string()), Some("2000 ft".to_string())], vec![Some("30".to_string()), Some("55,800".to_string())]],
    }];
    std::fs::write(s.data.tables_path(base), serde_json::to_string(&tables).unwrap()).unwrap();
}

/// Serve the router on 127.0.0.1:0; the TempDir must outlive the server.
async fn serve() -> (SocketAddr, TempDir) {
    let tmp = TempDir::new().unwrap();
    let s = settings();
    build_artifacts(tmp.path(), &s).await;
    let service = Arc::new(QueryService::from_settings(&s, tmp.path()).await.unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(service)).await.unwrap();
    });
    (addr, tmp)
}

#[tokio::test]
async fn health_returns_ok() {
    let (addr, _tmp) = serve().await;
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn numeric_question_answers_with_a_single_page() {
    let (addr, _tmp) = serve().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/query"))
        .json(&serde_json::json!({ "question": "takeoff limit weight at 2000 ft and OAT 30" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    let obj = body.as_object().unwrap();
    assert_eq!(obj.len(), 2);
    assert!(obj["answer"].is_string());
    assert_eq!(obj["pages"], serde_json::json!([1]));
}

#[tokio::test]
async fn general_question_lists_sorted_pages() {
    let (addr, _tmp) = serve().await;
    let body: Value = reqwest::Client::new()
        .post(format!("http://{addr}/query"))
        .json(&serde_json::json!({ "question": "describe the anti-ice system" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["answer"], "No answer.");
    assert_eq!(body["pages"], serde_json::json!([1, 2, 3]));
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let (addr, _tmp) = serve().await;
    let client = reqwest::Client::new();

    let not_json = client
        .post(format!("http://{addr}/query"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert!(not_json.status().is_client_error(), "status {}", not_json.status());

    let missing_field = client
        .post(format!("http://{addr}/query"))
        .json(&serde_json::json!({ "query": "wrong key" }))
        .send()
        .await
        .unwrap();
    assert!(missing_field.status().is_client_error(), "status {}", missing_field.status());
}
