//! Grounded answer generation from retrieved pages.
//!
//! Numeric answers are read straight out of the selected page's tables and
//! only then rephrased, so the phrasing step can never change the value.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use manualqa_core::traits::JudgeOracle;
use manualqa_core::types::TableGrid;
use manualqa_core::{Answer, Chunk, QueryKind, Retrieval};
use manualqa_vector::TableStore;

pub const NOTHING_RETRIEVED: &str = "I could not find related information in the manual.";
pub const NO_TABLES_ON_PAGE: &str = "NOT FOUND (no tables on this page)";
pub const VALUE_NOT_FOUND: &str = "NOT FOUND";
pub const NO_ANSWER: &str = "No answer.";

pub struct AnswerGenerator {
    judge: Arc<dyn JudgeOracle>,
    tables: Arc<TableStore>,
}

impl AnswerGenerator {
    pub fn new(judge: Arc<dyn JudgeOracle>, tables: Arc<TableStore>) -> Self {
        Self { judge, tables }
    }

    pub async fn answer(&self, query: &str, retrieval: &Retrieval) -> Answer {
        let Some(first) = retrieval.chunks.first() else {
            return Answer::new(NOTHING_RETRIEVED, Vec::new());
        };
        match retrieval.kind {
            QueryKind::Numeric => self.numeric_answer(query, first).await,
            QueryKind::General => self.general_answer(query, &retrieval.chunks).await,
        }
    }

    async fn numeric_answer(&self, query: &str, chunk: &Chunk) -> Answer {
        let page = chunk.page;
        let tables = self.tables.tables_for_page(page);
        if tables.is_empty() {
            return Answer::new(NO_TABLES_ON_PAGE, vec![page]);
        }

        let raw = match self.judge.evaluate(&extraction_prompt(query, chunk, &tables)).await {
            Ok(raw) => raw.trim().to_string(),
            Err(e) => {
                warn!(page, error = %e, "table value extraction failed");
                return Answer::new(VALUE_NOT_FOUND, vec![page]);
            }
        };
        debug!(page, extracted = %raw, "table value extracted");

        let Some(value) = parse_number(&raw) else {
            return Answer::new(raw, vec![page]);
        };

        let sentence = match self.judge.evaluate(&phrasing_prompt(query, value, page)).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => value.to_string(),
            Err(e) => {
                warn!(page, error = %e, "answer phrasing failed; returning the bare value");
                value.to_string()
            }
        };
        Answer::new(sentence, vec![page])
    }

    async fn general_answer(&self, query: &str, chunks: &[Chunk]) -> Answer {
        let pages: Vec<u32> = chunks.iter().map(|c| c.page).collect::<BTreeSet<_>>().into_iter().collect();
        let answer = match self.judge.evaluate(&general_prompt(query, chunks)).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => NO_ANSWER.to_string(),
            Err(e) => {
                warn!(error = %e, "answer generation failed");
                NO_ANSWER.to_string()
            }
        };
        Answer::new(answer, pages)
    }
}

/// Extracted cell text as a number, ignoring thousands separators.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn render_tables(tables: &[&TableGrid]) -> String {
    tables
        .iter()
        .enumerate()
        .map(|(i, t)| format!("### Table {i}\n{}\n", serde_json::to_string(t).unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn extraction_prompt(query: &str, chunk: &Chunk, tables: &[&TableGrid]) -> String {
    format!(
        "You read values out of aircraft performance tables.\n\n\
         You are given the user question, every table extracted from the selected page \
         (JSON list of rows), and the raw page text.\n\n\
         Instructions:\n\
         1. Find the table, row and column that answer the question.\n\
         2. A cell may hold several values separated by newlines; pick the right one.\n\
         3. Use only the tables below.\n\
         4. Reply with the value only (e.g. \"55.8 (1000 KG)\"), no explanation.\n\
         5. Do not compute, interpolate or estimate. If the value is not present reply \"{VALUE_NOT_FOUND}\".\n\n\
         Question:\n{query}\n\n\
         Page number: {page}\n\n\
         Page text:\n{text}\n\n\
         Tables:\n{tables}\n\n\
         Reply with the value only.",
        page = chunk.page,
        text = chunk.text,
        tables = render_tables(tables),
    )
}

fn phrasing_prompt(query: &str, value: f64, page: u32) -> String {
    format!(
        "Rewrite this table lookup result as one short, professional sentence for a pilot.\n\n\
         Question:\n{query}\n\n\
         Value: {value}\n\n\
         Manual page: {page}\n\n\
         Rules:\n\
         - Combine the context of the question with the value.\n\
         - Format numbers readably, e.g. \"55,800 kg\" or \"52.2 (1000 kg)\".\n\
         - Never change, round or guess the value.\n\
         - Output only the sentence."
    )
}

fn general_prompt(query: &str, chunks: &[Chunk]) -> String {
    let context = chunks
        .iter()
        .map(|c| format!("[Page {}]\n{}", c.page, c.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");
    format!(
        "You are an aviation technical assistant. Answer strictly from the flight manual excerpts below.\n\
         If the excerpts do not contain the answer, say: \"I could not find this information in the provided manual.\"\n\n\
         Question:\n{query}\n\n\
         Manual excerpts:\n{context}\n\n\
         Answer concisely and cite the pages you used."
    )
}
