//! Hosted text-generation oracle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use manualqa_core::traits::JudgeOracle;
use manualqa_core::{Error, Result};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        Some(content.parts.into_iter().map(|p| p.text).collect())
    }
}

/// Gemini `generateContent` client. One request per `evaluate`, no retries.
pub struct GeminiJudge {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiJudge {
    pub fn new(endpoint: &str, api_key: String, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Oracle(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: model.trim_start_matches("models/").to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl JudgeOracle for GeminiJudge {
    async fn evaluate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let request = GenerateRequest { contents: [Content { parts: [Part { text: prompt }] }] };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Oracle(format!("{} request failed: {e}", self.model)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Oracle(format!("{} API error {status}: {body}", self.model)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("{} response: {e}", self.model)))?;
        parsed
            .into_text()
            .ok_or_else(|| Error::MalformedResponse(format!("{} returned no candidates", self.model)))
    }
}
