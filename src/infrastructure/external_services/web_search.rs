//! Thin client for the external web-search service. The service's
//! result payload is passed through to the frontend untouched.

use reqwest::Client;
use serde::Serialize;

#[derive(Debug)]
pub enum WebSearchError {
    NetworkError(String),
    ApiError(String),
}

impl std::fmt::Display for WebSearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebSearchError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            WebSearchError::ApiError(msg) => write!(f, "API error: {}", msg),
        }
    }
}

impl std::error::Error for WebSearchError {}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Clone)]
pub struct WebSearchClient {
    client: Client,
    service_url: String,
}

impl WebSearchClient {
    pub fn new(service_url: String) -> Self {
        Self {
            client: Client::new(),
            service_url,
        }
    }

    pub async fn search(&self, query: &str) -> Result<serde_json::Value, WebSearchError> {
        let resp = self
            .client
            .post(&self.service_url)
            .json(&SearchRequest { query })
            .send()
            .await
            .map_err(|e| WebSearchError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(WebSearchError::ApiError(format!("{}: {}", status, message)));
        }

        resp.json()
            .await
            .map_err(|e| WebSearchError::ApiError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_the_query() {
        let json = serde_json::to_value(SearchRequest { query: "天气" }).unwrap();
        assert_eq!(json, serde_json::json!({"query": "天气"}));
    }
}
