use manualqa_core::traits::VectorIndex;
use manualqa_core::Error;
use manualqa_vector::{LanceIndex, LanceIndexWriter};
use tempfile::TempDir;

fn vectors() -> Vec<Vec<f32>> {
    vec![
        vec![0.0, 0.0, 0.0],
        vec![1.0, 0.0, 0.0],
        vec![0.0, 3.0, 0.0],
    ]
}

#[tokio::test]
async fn build_then_search_orders_by_squared_l2() {
    let tmp = TempDir::new().expect("tmp");
    let dir = tmp.path().join("index");
    let writer = LanceIndexWriter::create(&dir, "pages").await.expect("writer");
    let n = writer.build(&[0, 1, 2], &vectors()).await.expect("build");
    assert_eq!(n, 3);

    let index = LanceIndex::open(&dir, "pages").await.expect("open");
    assert_eq!(index.dim(), 3);
    let hits = index.search(&[0.9, 0.0, 0.0], 3).await.expect("search");
    let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![1, 0, 2]);
    assert!((hits[0].distance - 0.01).abs() < 1e-4, "squared L2, got {}", hits[0].distance);
    assert!((hits[1].distance - 0.81).abs() < 1e-4);
}

#[tokio::test]
async fn k_beyond_stored_vectors_is_sentinel_padded() {
    let tmp = TempDir::new().expect("tmp");
    let dir = tmp.path().join("index");
    LanceIndexWriter::create(&dir, "pages").await.expect("writer")
        .build(&[0, 1, 2], &vectors()).await.expect("build");

    let index = LanceIndex::open(&dir, "pages").await.expect("open");
    let hits = index.search(&[0.0, 0.0, 0.0], 8).await.expect("search");
    assert_eq!(hits.len(), 8);
    assert_eq!(hits.iter().filter(|h| !h.is_sentinel()).count(), 3);
    assert!(hits[3..].iter().all(|h| h.is_sentinel()));
}

#[tokio::test]
async fn rebuild_replaces_previous_index() {
    let tmp = TempDir::new().expect("tmp");
    let dir = tmp.path().join("index");
    LanceIndexWriter::create(&dir, "pages").await.expect("writer")
        .build(&[0, 1, 2], &vectors()).await.expect("build");
    LanceIndexWriter::create(&dir, "pages").await.expect("writer")
        .build(&[0], &[vec![5.0, 5.0, 5.0]]).await.expect("rebuild");

    let index = LanceIndex::open(&dir, "pages").await.expect("open");
    let hits = index.search(&[0.0, 0.0, 0.0], 4).await.expect("search");
    assert_eq!(hits.iter().filter(|h| !h.is_sentinel()).count(), 1);
}

#[tokio::test]
async fn build_rejects_inconsistent_input() {
    let tmp = TempDir::new().expect("tmp");
    let writer = LanceIndexWriter::create(&tmp.path().join("index"), "pages").await.expect("writer");
    assert!(writer.build(&[], &[]).await.is_err());
    assert!(writer.build(&[0, 1], &[vec![1.0]]).await.is_err());
    assert!(writer.build(&[0, 1], &[vec![1.0], vec![1.0, 2.0]]).await.is_err());
}

#[tokio::test]
async fn missing_index_is_not_found() {
    let tmp = TempDir::new().expect("tmp");
    let err = LanceIndex::open(&tmp.path().join("absent"), "pages").await.err().expect("error");
    assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn query_dimension_mismatch_is_an_error() {
    let tmp = TempDir::new().expect("tmp");
    let dir = tmp.path().join("index");
    LanceIndexWriter::create(&dir, "pages").await.expect("writer")
        .build(&[0, 1, 2], &vectors()).await.expect("build");
    let index = LanceIndex::open(&dir, "pages").await.expect("open");
    assert!(index.search(&[1.0, 2.0], 2).await.is_err());
}
