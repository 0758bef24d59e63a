use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Oracle call failed: {0}")]
    Oracle(String),

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid data in {}: {reason}", path.display())]
    InvalidData { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
