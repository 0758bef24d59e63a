//! Table-page selection for numeric queries.
//!
//! Structurally similar performance tables embed almost identically, so the
//! nearest vector is often the wrong page. The judge reads every candidate in
//! full and names the single chunk that holds the right table.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use manualqa_core::traits::{Disambiguator, JudgeOracle};
use manualqa_core::Chunk;

/// Index the judge answers with when no candidate fits.
const NO_MATCH: i64 = -1;

pub struct LlmDisambiguator {
    judge: Arc<dyn JudgeOracle>,
}

impl LlmDisambiguator {
    pub fn new(judge: Arc<dyn JudgeOracle>) -> Self {
        Self { judge }
    }
}

#[async_trait]
impl Disambiguator for LlmDisambiguator {
    async fn choose_best_table_chunk(&self, query: &str, candidates: &[Chunk]) -> Option<Chunk> {
        if candidates.is_empty() {
            return None;
        }
        let prompt = build_prompt(query, candidates);
        let raw = match self.judge.evaluate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "table disambiguation failed");
                return None;
            }
        };
        let choice = parse_choice(&raw, candidates.len());
        debug!(response = raw.trim(), ?choice, "table disambiguation");
        choice.map(|i| candidates[i].clone())
    }
}

/// Valid candidate position, or `None` for -1, garbage, or out of range.
pub fn parse_choice(raw: &str, len: usize) -> Option<usize> {
    let idx: i64 = raw.trim().parse().ok()?;
    if idx == NO_MATCH {
        return None;
    }
    usize::try_from(idx).ok().filter(|i| *i < len)
}

fn build_prompt(query: &str, candidates: &[Chunk]) -> String {
    let listing = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("### Chunk {i}\n(Page {})\n{}", c.page, c.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");
    format!(
        "You support aircraft performance calculations from a flight manual.\n\
         The question below can only be answered from one specific performance table.\n\n\
         Read the retrieved chunks and decide which ONE of them contains the table \
         (or data) needed to answer it.\n\n\
         Question:\n{query}\n\n\
         Retrieved chunks:\n{listing}\n\n\
         Reply with a single integer and nothing else:\n\
         - the chunk index (0, 1, 2, ...)\n\
         - or {NO_MATCH} if no chunk contains the needed data."
    )
}
