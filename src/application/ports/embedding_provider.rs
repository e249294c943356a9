use async_trait::async_trait;

#[derive(Debug)]
pub enum EmbeddingProviderError {
    NetworkError(String),
    ApiError(String),
    EmptyResponse,
}

impl std::fmt::Display for EmbeddingProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            EmbeddingProviderError::ApiError(msg) => write!(f, "API error: {}", msg),
            EmbeddingProviderError::EmptyResponse => write!(f, "No embeddings returned"),
        }
    }
}

impl std::error::Error for EmbeddingProviderError {}

/// Remote embedding generation. The index and every query against it
/// must go through the same provider instance so all vectors share one
/// embedding space.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError>;

    async fn embed_batch(&self, texts: &[String])
    -> Result<Vec<Vec<f32>>, EmbeddingProviderError>;

    fn model_name(&self) -> &str;
}
