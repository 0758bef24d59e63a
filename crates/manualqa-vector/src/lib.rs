//! manualqa-vector
//!
//! LanceDB-backed page vector index plus the read-only chunk and table stores
//! the retrieval path resolves index hits against.

pub mod schema;
pub mod search;
pub mod store;
pub mod table;
pub mod table_store;
pub mod writer;

pub use search::LanceIndex;
pub use store::ChunkStore;
pub use table_store::TableStore;
pub use writer::LanceIndexWriter;
