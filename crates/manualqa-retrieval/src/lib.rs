//! manualqa-retrieval
//!
//! Query routing and retrieval over the page index, plus grounded answer
//! generation. All judgment calls go through [`JudgeOracle`], so tests swap in
//! deterministic stubs.
//!
//! [`JudgeOracle`]: manualqa_core::traits::JudgeOracle

pub mod disambiguator;
pub mod generator;
pub mod judge;
pub mod orchestrator;
pub mod reranker;
pub mod service;

pub use disambiguator::LlmDisambiguator;
pub use generator::AnswerGenerator;
pub use judge::GeminiJudge;
pub use orchestrator::{RetrievalOptions, Retriever};
pub use reranker::LlmReranker;
pub use service::QueryService;

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use manualqa_core::traits::JudgeOracle;
    use manualqa_core::{Chunk, ChunkId, Error, Result};

    /// Replays scripted replies in order; the last one repeats.
    pub struct StubJudge {
        replies: Vec<std::result::Result<String, ()>>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubJudge {
        pub fn sequence(replies: Vec<std::result::Result<String, ()>>) -> Arc<Self> {
            Arc::new(Self { replies, prompts: Mutex::new(Vec::new()) })
        }

        pub fn replying(reply: &str) -> Arc<Self> {
            Self::sequence(vec![Ok(reply.to_string())])
        }

        pub fn failing() -> Arc<Self> {
            Self::sequence(vec![Err(())])
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl JudgeOracle for StubJudge {
        async fn evaluate(&self, prompt: &str) -> Result<String> {
            let n = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                prompts.len()
            };
            let reply = self.replies.get(n - 1).or(self.replies.last()).cloned().unwrap_or(Err(()));
            reply.map_err(|()| Error::Oracle("stub outage".to_string()))
        }
    }

    pub fn chunks(specs: &[(ChunkId, u32)]) -> Vec<Chunk> {
        specs.iter().map(|&(id, page)| Chunk { id, page, text: format!("text of page {page}") }).collect()
    }

    pub fn pages(chunks: &[Chunk]) -> Vec<u32> {
        chunks.iter().map(|c| c.page).collect()
    }
}
