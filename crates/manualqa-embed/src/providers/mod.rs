//! Embedding oracles.
//!
//! `gemini` calls the hosted embedding API; `hash` is a deterministic
//! token-hashing embedder for tests and offline development.

pub mod gemini;
pub mod hash;

pub use gemini::GeminiEmbedder;
pub use hash::HashEmbedder;
