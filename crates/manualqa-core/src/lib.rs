#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod classifier;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use classifier::QueryClassifier;
pub use error::{Error, Result};
pub use types::{Answer, Chunk, ChunkId, Neighbor, QueryKind, Retrieval, SENTINEL_ID};
