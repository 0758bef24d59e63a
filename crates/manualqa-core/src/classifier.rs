//! Numeric vs. general query routing.
//!
//! Table questions in a performance manual almost always quote several values
//! (weights, temperatures, altitudes) together with performance vocabulary.
//! Both signals are required before a query is routed to table lookup.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::QueryKind;

static NUMERIC_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("numeric token pattern"));

/// Performance/table vocabulary matched as lower-case substrings.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "takeoff",
    "calculate",
    "compute",
    "landing",
    "approach",
    "oat",
    "pressure altitude",
    "climb",
    "limit",
    "field length",
    "corrected",
    "runway",
    "kg",
    "kgs",
    "lb",
    "lbs",
    "ft",
    "feet",
    "°c",
    "degrees",
    "temperature",
    "slope",
    "v1",
    "v2",
    "vr",
    "field limit",
    "climb limit",
    "limit weight",
    "performance",
];

const MIN_NUMERIC_TOKENS: usize = 2;

#[derive(Debug, Clone)]
pub struct QueryClassifier {
    keywords: Vec<String>,
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl QueryClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn classify(&self, query: &str) -> QueryKind {
        let q = query.trim().to_lowercase();
        let numbers = count_numeric_tokens(&q);
        let has_keyword = self.keywords.iter().any(|k| q.contains(k.as_str()));
        if numbers >= MIN_NUMERIC_TOKENS && has_keyword {
            QueryKind::Numeric
        } else {
            QueryKind::General
        }
    }
}

/// Number of maximal digit runs (grouping commas allowed after the first digit).
pub fn count_numeric_tokens(text: &str) -> usize {
    NUMERIC_TOKEN_RE.find_iter(text).count()
}
