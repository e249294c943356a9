pub mod openai_compat;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ChatMessage, GenerationParams};
use openai_compat::{OpenAiCompatConfig, TokenStream};

/// Backend selector as it appears on the wire (`?model=zhipu`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Zhipu,
    Deepseek,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "zhipu" => Some(Self::Zhipu),
            "deepseek" => Some(Self::Deepseek),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zhipu => "zhipu",
            Self::Deepseek => "deepseek",
        }
    }
}

/// A configured model backend. One variant per supported provider; each
/// carries its own client configuration. Adding a provider means adding
/// a variant, not extending a string-comparison chain.
#[derive(Debug, Clone)]
pub enum Provider {
    Zhipu(OpenAiCompatConfig),
    Deepseek(OpenAiCompatConfig),
}

impl Provider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Zhipu(_) => ProviderKind::Zhipu,
            Provider::Deepseek(_) => ProviderKind::Deepseek,
        }
    }

    /// Single non-streamed completion. Used by the vision endpoint.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        match self {
            Provider::Zhipu(config) | Provider::Deepseek(config) => {
                openai_compat::chat(config, messages, params).await
            }
        }
    }

    /// Streaming completion; yields one item per upstream token.
    pub async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<TokenStream, LlmError> {
        match self {
            Provider::Zhipu(config) | Provider::Deepseek(config) => {
                openai_compat::chat_stream(config, messages, params).await
            }
        }
    }
}

/// The set of providers the process was configured with. A provider
/// without an API key stays `None` and fails at use, not at startup.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    pub zhipu: Option<OpenAiCompatConfig>,
    pub deepseek: Option<OpenAiCompatConfig>,
    pub zhipu_vision: Option<OpenAiCompatConfig>,
}

impl ProviderRegistry {
    pub fn select(&self, kind: ProviderKind) -> Result<Provider, LlmError> {
        match kind {
            ProviderKind::Zhipu => self
                .zhipu
                .clone()
                .map(Provider::Zhipu)
                .ok_or(LlmError::NotConfigured("zhipu")),
            ProviderKind::Deepseek => self
                .deepseek
                .clone()
                .map(Provider::Deepseek)
                .ok_or(LlmError::NotConfigured("deepseek")),
        }
    }

    pub fn vision(&self) -> Result<Provider, LlmError> {
        self.zhipu_vision
            .clone()
            .map(Provider::Zhipu)
            .ok_or(LlmError::NotConfigured("zhipu"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("{0} API key not configured")]
    NotConfigured(&'static str),
    #[error("Empty completion response")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parses_known_providers_only() {
        assert_eq!(ProviderKind::parse("zhipu"), Some(ProviderKind::Zhipu));
        assert_eq!(ProviderKind::parse("deepseek"), Some(ProviderKind::Deepseek));
        assert_eq!(ProviderKind::parse("gpt-4"), None);
        assert_eq!(ProviderKind::parse(""), None);
    }

    #[test]
    fn registry_rejects_unconfigured_provider() {
        let registry = ProviderRegistry::default();
        let err = registry.select(ProviderKind::Zhipu).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured("zhipu")));
    }

    #[test]
    fn registry_selects_configured_provider() {
        let registry = ProviderRegistry {
            deepseek: Some(OpenAiCompatConfig {
                api_key: "sk-test".into(),
                base_url: "https://api.deepseek.com".into(),
                model: "deepseek-chat".into(),
                default_max_tokens: Some(1024),
            }),
            ..Default::default()
        };
        let provider = registry.select(ProviderKind::Deepseek).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Deepseek);
    }
}
