use arrow_array::{Float32Array, Int64Array, RecordBatch};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::path::Path;
use tracing::{debug, info};

use manualqa_core::traits::VectorIndex;
use manualqa_core::{Error, Neighbor, Result};

use crate::schema::{vector_dim, DISTANCE_COLUMN, ID_COLUMN};
use crate::table::{index_err, open_db, table_exists};

/// Read-only handle on a built index. Cloning shares the underlying table.
#[derive(Clone)]
pub struct LanceIndex {
	table: Table,
	dim: usize,
}

impl LanceIndex {
	/// Open a previously built index; a missing directory or table is an error.
	pub async fn open(dir: &Path, table_name: &str) -> Result<Self> {
		if !dir.exists() {
			return Err(Error::NotFound(format!("vector index directory {}", dir.display())));
		}
		let db = open_db(dir).await?;
		if !table_exists(&db, table_name).await? {
			return Err(Error::NotFound(format!("table '{}' in {}", table_name, dir.display())));
		}
		let table = db.open_table(table_name).execute().await.map_err(index_err)?;
		let schema = table.schema().await.map_err(index_err)?;
		let dim = vector_dim(&schema).ok_or_else(|| Error::Index(format!("table '{table_name}' has no fixed-size vector column")))?;
		info!(table = table_name, dim, "opened vector index");
		Ok(Self { table, dim })
	}

	pub fn dim(&self) -> usize { self.dim }
}

#[async_trait]
impl VectorIndex for LanceIndex {
	/// Exhaustive squared-L2 search; always `k` entries, sentinel-padded.
	async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
		if k == 0 { return Ok(Vec::new()); }
		if query.len() != self.dim {
			return Err(Error::Index(format!("query has {} dimensions, index has {}", query.len(), self.dim)));
		}
		let mut stream = self.table
			.vector_search(query.to_vec()).map_err(index_err)?
			.distance_type(DistanceType::L2)
			.limit(k)
			.execute().await.map_err(index_err)?;
		let mut hits = Vec::with_capacity(k);
		while let Some(batch) = stream.try_next().await.map_err(index_err)? {
			read_neighbors(&batch, &mut hits)?;
		}
		Ok(pad_neighbors(hits, k))
	}
}

fn read_neighbors(batch: &RecordBatch, out: &mut Vec<Neighbor>) -> Result<()> {
	let ids = batch.column_by_name(ID_COLUMN)
		.and_then(|c| c.as_any().downcast_ref::<Int64Array>())
		.ok_or_else(|| Error::Index("search result has no id column".to_string()))?;
	let distances = batch.column_by_name(DISTANCE_COLUMN)
		.and_then(|c| c.as_any().downcast_ref::<Float32Array>())
		.ok_or_else(|| Error::Index("search result has no distance column".to_string()))?;
	for i in 0..batch.num_rows() {
		out.push(Neighbor { id: ids.value(i), distance: distances.value(i) });
	}
	debug!(rows = batch.num_rows(), "read search batch");
	Ok(())
}

/// Sort ascending by distance, keep `k`, fill missing slots with sentinels.
pub fn pad_neighbors(mut hits: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
	hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
	hits.truncate(k);
	hits.resize(k, Neighbor::sentinel());
	hits
}
