mod application;
mod config;
mod domain;
mod infrastructure;
mod llm;
mod presentation;
mod text;

use std::sync::Arc;

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use application::ports::EmbeddingProvider;
use application::services::{IndexHandle, IndexService};
use config::Config;
use infrastructure::database::{self, CredentialRepository};
use infrastructure::external_services::{EmbeddingsClient, Mailer, WebSearchClient};
use presentation::http::handlers::{
    ChatHandler, EmailHandler, LoginHandler, SearchHandler, UploadHandler, VisionHandler,
};
use presentation::http::server::HttpServer;
use text::chunking::OverlapSplitter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = database::create_connection_pool(&config.database_url)?;
    database::ensure_schema(&pool)?;
    let credentials = Arc::new(CredentialRepository::new(pool));
    credentials.seed_defaults()?;

    let embeddings: Arc<dyn EmbeddingProvider> =
        Arc::new(EmbeddingsClient::new(config.embeddings.clone())?);

    let index_handle = Arc::new(IndexHandle::default());
    let index_service = Arc::new(IndexService::new(
        config.docs_dir.clone(),
        OverlapSplitter::default(),
        embeddings.clone(),
        index_handle.clone(),
    ));

    // The service still answers without an index; chat just skips
    // retrieval until a rebuild succeeds.
    if let Err(e) = index_service.rebuild().await {
        tracing::warn!("initial index build failed: {}", e);
    }

    let chat_handler = Arc::new(ChatHandler::new(
        config.providers.clone(),
        embeddings,
        index_handle,
        config.relay,
    ));
    let vision_handler = Arc::new(VisionHandler::new(config.providers.clone()));
    let upload_handler = Arc::new(UploadHandler::new(config.docs_dir.clone(), index_service));
    let search_handler = Arc::new(SearchHandler::new(WebSearchClient::new(
        config.search_url.clone(),
    )));
    let email_handler = Arc::new(EmailHandler::new(Mailer::new(config.mailer.clone())));
    let login_handler = Arc::new(LoginHandler::new(credentials));

    HttpServer::new(
        chat_handler,
        vision_handler,
        upload_handler,
        search_handler,
        email_handler,
        login_handler,
        Some(config.port),
    )
    .run()
    .await
}
