use arrow_array::{FixedSizeListArray, Int64Array, RecordBatch, RecordBatchIterator};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use manualqa_core::{ChunkId, Error, Result};

use crate::schema::build_arrow_schema;
use crate::table::{index_err, open_db, table_exists};

const BATCH_SIZE: usize = 1000;

/// Offline builder for the page vector index.
pub struct LanceIndexWriter {
	db: Connection,
	table_name: String,
}

impl LanceIndexWriter {
	/// Opens `dir` for writing. Any previous index at `dir` is removed first,
	/// so ids are never carried over from an older build.
	pub async fn create(dir: &Path, table_name: &str) -> Result<Self> {
		if dir.exists() {
			std::fs::remove_dir_all(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
		}
		std::fs::create_dir_all(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
		let db = open_db(dir).await?;
		Ok(Self { db, table_name: table_name.to_string() })
	}

	/// Store `vectors[i]` under `ids[i]`. Vectors are stored as given.
	pub async fn build(&self, ids: &[ChunkId], vectors: &[Vec<f32>]) -> Result<usize> {
		if vectors.is_empty() {
			return Err(Error::Index("cannot build an index from zero vectors".to_string()));
		}
		if ids.len() != vectors.len() {
			return Err(Error::Index(format!("{} ids for {} vectors", ids.len(), vectors.len())));
		}
		let dim = vectors[0].len();
		if dim == 0 {
			return Err(Error::Index("vectors must not be empty".to_string()));
		}
		if let Some(pos) = vectors.iter().position(|v| v.len() != dim) {
			return Err(Error::Index(format!("vector {} has {} dimensions, expected {}", pos, vectors[pos].len(), dim)));
		}
		let dim = i32::try_from(dim).map_err(index_err)?;

		for (batch_no, (id_batch, vec_batch)) in ids.chunks(BATCH_SIZE).zip(vectors.chunks(BATCH_SIZE)).enumerate() {
			let batch = to_record_batch(id_batch, vec_batch, dim)?;
			let schema = batch.schema();
			let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
			if table_exists(&self.db, &self.table_name).await? {
				self.db.open_table(&self.table_name).execute().await.map_err(index_err)?
					.add(reader).execute().await.map_err(index_err)?;
			} else {
				self.db.create_table(&self.table_name, reader).execute().await.map_err(index_err)?;
			}
			debug!(batch = batch_no, rows = id_batch.len(), "inserted vector batch");
		}
		info!(table = %self.table_name, vectors = vectors.len(), dim, "vector index built");
		Ok(vectors.len())
	}
}

fn to_record_batch(ids: &[ChunkId], vectors: &[Vec<f32>], dim: i32) -> Result<RecordBatch> {
	let schema = build_arrow_schema(dim);
	let rows = vectors.iter().map(|v| Some(v.iter().copied().map(Some).collect::<Vec<_>>()));
	RecordBatch::try_new(schema, vec![
		Arc::new(Int64Array::from(ids.to_vec())),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(rows, dim)),
	])
	.map_err(index_err)
}
