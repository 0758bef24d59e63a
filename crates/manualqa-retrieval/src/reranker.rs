//! Relevance reranking for general queries.

use async_trait::async_trait;
use serde::Deserialize;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, warn};

use manualqa_core::traits::{JudgeOracle, Reranker};
use manualqa_core::{Chunk, Result};

pub const DEFAULT_CHAR_BUDGET: usize = 1800;

const SCORE_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

#[derive(Debug, Clone, Copy, Deserialize)]
struct Score {
    index: i64,
    score: i64,
}

/// Scores candidates 1-5 with the judge and orders them by score.
pub struct LlmReranker {
    judge: Arc<dyn JudgeOracle>,
    char_budget: usize,
}

impl LlmReranker {
    pub fn new(judge: Arc<dyn JudgeOracle>) -> Self {
        Self { judge, char_budget: DEFAULT_CHAR_BUDGET }
    }

    pub fn with_char_budget(mut self, char_budget: usize) -> Self {
        self.char_budget = char_budget;
        self
    }

    fn build_prompt(&self, query: &str, candidates: &[Chunk]) -> String {
        let listing = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[CHUNK {i} | Page {}]\n{}", c.page, truncate_chars(&c.text, self.char_budget)))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "You rerank retrieval results for an aircraft technical manual.\n\n\
             User query:\n{query}\n\n\
             Score every candidate chunk from 1 (irrelevant) to 5 (directly answers the query).\n\
             Return ONLY JSON: [{{\"index\": int, \"score\": int}}, ...]\n\n\
             Candidates:\n{listing}\n"
        )
    }
}

#[async_trait]
impl Reranker for LlmReranker {
    /// Never fails: judge errors and malformed replies keep similarity order.
    async fn rerank(&self, query: &str, candidates: &[Chunk], top_k: usize) -> Result<Vec<Chunk>> {
        let fallback = || candidates.iter().take(top_k).cloned().collect::<Vec<_>>();
        if candidates.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let raw = match self.judge.evaluate(&self.build_prompt(query, candidates)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "rerank judge failed; keeping similarity order");
                return Ok(fallback());
            }
        };
        match parse_scores(&raw, candidates.len()) {
            Some(scores) => {
                debug!(scored = scores.len(), candidates = candidates.len(), "reranked");
                Ok(order_by_scores(candidates, &scores, top_k))
            }
            None => {
                warn!(response = %truncate_chars(raw.trim(), 200), "malformed rerank response; keeping similarity order");
                Ok(fallback())
            }
        }
    }
}

/// `None` unless the reply is a JSON score list whose indices all refer to a
/// candidate and whose scores stay on the 1-5 scale.
fn parse_scores(raw: &str, len: usize) -> Option<Vec<Score>> {
    let scores: Vec<Score> = serde_json::from_str(strip_code_fence(raw)).ok()?;
    let valid = scores
        .iter()
        .all(|s| usize::try_from(s.index).is_ok_and(|i| i < len) && SCORE_RANGE.contains(&s.score));
    valid.then_some(scores)
}

/// Descending score, stable on similarity order. Unscored candidates go last;
/// a repeated index keeps its first score.
fn order_by_scores(candidates: &[Chunk], scores: &[Score], top_k: usize) -> Vec<Chunk> {
    let mut by_position: Vec<Option<i64>> = vec![None; candidates.len()];
    for s in scores {
        if let Ok(i) = usize::try_from(s.index) {
            by_position[i].get_or_insert(s.score);
        }
    }
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| Reverse(by_position[i]));
    order.into_iter().take(top_k).map(|i| candidates[i].clone()).collect()
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").or_else(|| body.strip_prefix("JSON")).unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chunks, pages, StubJudge};

    #[tokio::test]
    async fn higher_score_moves_first() {
        let judge = StubJudge::replying(r#"[{"index":0,"score":2},{"index":1,"score":5}]"#);
        let r = LlmReranker::new(judge);
        let out = r.rerank("q", &chunks(&[(0, 1), (1, 2)]), 2).await.unwrap();
        assert_eq!(pages(&out), vec![2, 1]);
    }

    #[tokio::test]
    async fn ties_keep_similarity_order() {
        let judge = StubJudge::replying(
            r#"[{"index":0,"score":3},{"index":1,"score":4},{"index":2,"score":3},{"index":3,"score":4}]"#,
        );
        let out = LlmReranker::new(judge)
            .rerank("q", &chunks(&[(0, 10), (1, 11), (2, 12), (3, 13)]), 4)
            .await
            .unwrap();
        assert_eq!(pages(&out), vec![11, 13, 10, 12]);
    }

    #[tokio::test]
    async fn non_json_falls_back_to_input_order() {
        let judge = StubJudge::replying("Chunk 2 looks best.");
        let cands = chunks(&[(0, 1), (1, 2), (2, 3)]);
        let out = LlmReranker::new(judge).rerank("q", &cands, 2).await.unwrap();
        assert_eq!(out, cands[..2].to_vec());
    }

    #[tokio::test]
    async fn out_of_range_index_falls_back() {
        let judge = StubJudge::replying(r#"[{"index":5,"score":5}]"#);
        let cands = chunks(&[(0, 1), (1, 2)]);
        let out = LlmReranker::new(judge).rerank("q", &cands, 2).await.unwrap();
        assert_eq!(out, cands);
    }

    #[tokio::test]
    async fn off_scale_score_falls_back() {
        let cands = chunks(&[(0, 1), (1, 2), (2, 3)]);
        for reply in [
            r#"[{"index":2,"score":99},{"index":0,"score":1}]"#,
            r#"[{"index":1,"score":-3}]"#,
            r#"[{"index":2,"score":0}]"#,
        ] {
            let out = LlmReranker::new(StubJudge::replying(reply)).rerank("q", &cands, 2).await.unwrap();
            assert_eq!(out, cands[..2].to_vec(), "reply {reply}");
        }
    }

    #[test]
    fn scale_bounds_are_inclusive() {
        assert!(parse_scores(r#"[{"index":0,"score":1},{"index":1,"score":5}]"#, 2).is_some());
        assert!(parse_scores(r#"[{"index":0,"score":6}]"#, 2).is_none());
    }

    #[tokio::test]
    async fn judge_error_falls_back() {
        let cands = chunks(&[(0, 1), (1, 2), (2, 3)]);
        let out = LlmReranker::new(StubJudge::failing()).rerank("q", &cands, 1).await.unwrap();
        assert_eq!(out, cands[..1].to_vec());
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let judge = StubJudge::replying("```json\n[{\"index\":1,\"score\":4},{\"index\":0,\"score\":1}]\n```");
        let out = LlmReranker::new(judge).rerank("q", &chunks(&[(0, 1), (1, 2)]), 2).await.unwrap();
        assert_eq!(pages(&out), vec![2, 1]);
    }

    #[tokio::test]
    async fn unscored_candidates_rank_last() {
        let judge = StubJudge::replying(r#"[{"index":2,"score":1}]"#);
        let out = LlmReranker::new(judge)
            .rerank("q", &chunks(&[(0, 1), (1, 2), (2, 3)]), 3)
            .await
            .unwrap();
        assert_eq!(pages(&out), vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn prompt_truncates_text_but_not_identity() {
        let judge = StubJudge::replying("[]");
        let mut cands = chunks(&[(0, 77)]);
        cands[0].text = "é".repeat(50);
        let out = LlmReranker::new(judge.clone())
            .with_char_budget(10)
            .rerank("q", &cands, 1)
            .await
            .unwrap();
        let prompt = judge.last_prompt().expect("prompt");
        assert!(prompt.contains(&format!("[CHUNK 0 | Page 77]\n{}\n", "é".repeat(10))));
        assert_eq!(out[0].text.chars().count(), 50, "returned chunk keeps full text");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("añb", 2), "añ");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }
}
