//! Chunk metadata store: `[{id, page, text}]`, one record per indexed vector.

use std::fs;
use std::path::Path;

use manualqa_core::{Chunk, ChunkId, Error, Result};

#[derive(Debug, Clone)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
}

impl ChunkStore {
    /// Ids must equal their position (vector insertion order).
    pub fn from_chunks(chunks: Vec<Chunk>) -> std::result::Result<Self, String> {
        if let Some((pos, c)) = chunks.iter().enumerate().find(|(pos, c)| c.id != *pos as ChunkId) {
            return Err(format!("record {} has id {}, expected {}", pos, c.id, pos));
        }
        if let Some(c) = chunks.iter().find(|c| c.page == 0) {
            return Err(format!("chunk {} has page 0; pages are 1-based", c.id));
        }
        Ok(Self { chunks })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let chunks: Vec<Chunk> = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidData { path: path.to_path_buf(), reason: e.to_string() })?;
        Self::from_chunks(chunks).map_err(|reason| Error::InvalidData { path: path.to_path_buf(), reason })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io { path: parent.to_path_buf(), source })?;
        }
        let json = serde_json::to_string_pretty(&self.chunks).map_err(|e| Error::Operation(e.to_string()))?;
        fs::write(path, json).map_err(|source| Error::Io { path: path.to_path_buf(), source })
    }

    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        usize::try_from(id).ok().and_then(|i| self.chunks.get(i))
    }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn chunks(&self) -> &[Chunk] { &self.chunks }
}
