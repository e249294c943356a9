//! Process configuration, read once at startup. Every value has a
//! default so the service boots with nothing but provider API keys.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::services::RelayOptions;
use crate::infrastructure::external_services::{EmbeddingsClientConfig, MailerConfig};
use crate::llm::ProviderRegistry;
use crate::llm::openai_compat::OpenAiCompatConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub docs_dir: PathBuf,
    pub database_url: String,
    pub providers: ProviderRegistry,
    pub embeddings: EmbeddingsClientConfig,
    pub search_url: String,
    pub mailer: MailerConfig,
    pub relay: RelayOptions,
}

impl Config {
    pub fn from_env() -> Self {
        let zhipu_key = env::var("ZHIPUAI_API_KEY").ok().filter(|k| !k.is_empty());
        let deepseek_key = env::var("DEEPSEEK_API_KEY").ok().filter(|k| !k.is_empty());

        let zhipu_base = env_or("ZHIPU_BASE_URL", "https://open.bigmodel.cn/api/paas/v4");
        let deepseek_base = env_or("DEEPSEEK_BASE_URL", "https://api.deepseek.com");

        let providers = ProviderRegistry {
            zhipu: zhipu_key.clone().map(|api_key| OpenAiCompatConfig {
                api_key,
                base_url: zhipu_base.clone(),
                model: env_or("ZHIPU_CHAT_MODEL", "glm-4"),
                default_max_tokens: None,
            }),
            deepseek: deepseek_key.map(|api_key| OpenAiCompatConfig {
                api_key,
                base_url: deepseek_base,
                model: env_or("DEEPSEEK_CHAT_MODEL", "deepseek-chat"),
                default_max_tokens: Some(1024),
            }),
            zhipu_vision: zhipu_key.map(|api_key| OpenAiCompatConfig {
                api_key,
                base_url: zhipu_base.clone(),
                model: env_or("ZHIPU_VISION_MODEL", "glm-4v-flash"),
                default_max_tokens: Some(1024),
            }),
        };

        let embeddings = EmbeddingsClientConfig {
            service_url: env_or(
                "EMBEDDINGS_SERVICE_URL",
                &format!("{}/embeddings", zhipu_base),
            ),
            api_key: env::var("EMBEDDINGS_API_KEY")
                .ok()
                .or_else(|| env::var("ZHIPUAI_API_KEY").ok())
                .unwrap_or_default(),
            model: env_or("EMBEDDINGS_MODEL", "embedding-2"),
            timeout_secs: 30,
        };

        let mailer = MailerConfig {
            smtp_host: env_or("SMTP_SERVER", "smtp.qq.com"),
            smtp_port: parsed_env("SMTP_PORT", 587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
        };

        let relay = RelayOptions {
            pacing_delay: Duration::from_millis(parsed_env("STREAM_PACING_MS", 50)),
            ..RelayOptions::default()
        };

        Self {
            port: parsed_env("PORT", 5000),
            docs_dir: PathBuf::from(env_or("DOCS_DIR", "docs")),
            database_url: env_or("DATABASE_URL", "users.db"),
            providers,
            embeddings,
            search_url: env_or("SEARCH_SERVICE_URL", "http://localhost:8080/search"),
            mailer,
            relay,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
