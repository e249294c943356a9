//! Client for an OpenAI-compatible embeddings endpoint. One request
//! per call, no retry loop: index rebuilds surface the failure and
//! keep the previous index instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};

use crate::application::ports::{EmbeddingProvider, EmbeddingProviderError};

#[derive(Debug, Clone)]
pub struct EmbeddingsClientConfig {
    pub service_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: TextInput<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum TextInput<'a> {
    Single(&'a str),
    Multiple(&'a [String]),
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingsClient {
    client: Client,
    config: EmbeddingsClientConfig,
}

impl EmbeddingsClient {
    pub fn new(config: EmbeddingsClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    async fn request(&self, input: TextInput<'_>) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        let body = EmbeddingsRequest {
            model: &self.config.model,
            input,
        };

        let mut req = self
            .client
            .post(&self.config.service_url)
            .header("Content-Type", "application/json")
            .json(&body);

        if !self.config.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(EmbeddingProviderError::ApiError(format!(
                "{}: {}",
                status, message
            )));
        }

        let data: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| EmbeddingProviderError::ApiError(e.to_string()))?;

        if data.data.is_empty() {
            return Err(EmbeddingProviderError::EmptyResponse);
        }

        Ok(data.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingsClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        let mut vectors = self.request(TextInput::Single(text)).await?;
        Ok(vectors.remove(0))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        self.request(TextInput::Multiple(texts)).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
