//! LanceDB connection helpers.

use lancedb::{connect, Connection};
use std::path::Path;

use manualqa_core::{Error, Result};

pub(crate) fn index_err(e: impl std::fmt::Display) -> Error {
    Error::Index(e.to_string())
}

pub async fn open_db(dir: &Path) -> Result<Connection> {
    connect(dir.to_string_lossy().as_ref()).execute().await.map_err(index_err)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await.map_err(index_err)?;
    Ok(names.iter().any(|n| n == name))
}
