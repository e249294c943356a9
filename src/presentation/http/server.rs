use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::http::{
    handlers::{
        ChatHandler, EmailHandler, LoginHandler, SearchHandler, UploadHandler, VisionHandler,
    },
    routes::{
        chat_routes, email_routes, health_routes, login_routes, search_routes, upload_routes,
        vision_routes,
    },
};

pub struct HttpServer {
    chat_handler: Arc<ChatHandler>,
    vision_handler: Arc<VisionHandler>,
    upload_handler: Arc<UploadHandler>,
    search_handler: Arc<SearchHandler>,
    email_handler: Arc<EmailHandler>,
    login_handler: Arc<LoginHandler>,
    port: u16,
}

impl HttpServer {
    pub fn new(
        chat_handler: Arc<ChatHandler>,
        vision_handler: Arc<VisionHandler>,
        upload_handler: Arc<UploadHandler>,
        search_handler: Arc<SearchHandler>,
        email_handler: Arc<EmailHandler>,
        login_handler: Arc<LoginHandler>,
        port: Option<u16>,
    ) -> Self {
        Self {
            chat_handler,
            vision_handler,
            upload_handler,
            search_handler,
            email_handler,
            login_handler,
            port: port.unwrap_or(5000),
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .merge(health_routes())
            .merge(chat_routes(self.chat_handler))
            .merge(vision_routes(self.vision_handler))
            .merge(upload_routes(self.upload_handler))
            .merge(search_routes(self.search_handler))
            .merge(email_routes(self.email_handler))
            .merge(login_routes(self.login_handler))
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(25 * 1024 * 1024)) // 25MB cap
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    )
                    .on_failure(
                        |error: ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                "Request failed: {:?} (took {} ms)",
                                error,
                                latency.as_millis()
                            );
                        },
                    ),
            );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
