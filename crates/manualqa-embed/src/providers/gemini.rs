use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use manualqa_core::traits::EmbeddingOracle;
use manualqa_core::{Error, Result};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
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
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini `embedContent` client.
pub struct GeminiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dims: usize,
}

impl GeminiEmbedder {
    /// # Arguments
    /// * `endpoint` - API base, e.g. `https://generativelanguage.googleapis.com/v1beta`
    /// * `model` - Model name without the `models/` prefix (e.g. `text-embedding-004`)
    /// * `dims` - Expected embedding dimensionality
    pub fn new(endpoint: &str, api_key: String, model: &str, dims: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Oracle(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: model.trim_start_matches("models/").to_string(),
            dims,
        })
    }
}

#[async_trait]
impl EmbeddingOracle for GeminiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dim(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/models/{}:embedContent", self.endpoint, self.model);
        let request = EmbedRequest {
            model: format!("models/{}", self.model),
            content: Content { parts: [Part { text }] },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Oracle(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Oracle(format!("embedding API error {status}: {body}")));
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("embedding response: {e}")))?;
        Ok(result.embedding.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_prefix_and_trailing_slash_are_normalized() {
        let e = GeminiEmbedder::new(
            "http://localhost:9/v1beta/",
            "key".to_string(),
            "models/text-embedding-004",
            768,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(e.model_name(), "text-embedding-004");
        assert_eq!(e.endpoint, "http://localhost:9/v1beta");
        assert_eq!(e.dim(), 768);
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(EmbedRequest {
            model: "models/m".to_string(),
            content: Content { parts: [Part { text: "hi" }] },
        })
        .unwrap();
        assert_eq!(body["content"]["parts"][0]["text"], "hi");
        assert_eq!(body["model"], "models/m");
    }
}
