use axum::{Router, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::EmailHandler;

pub fn email_routes(email_handler: Arc<EmailHandler>) -> Router {
    Router::new()
        .route("/api/send-email", post(EmailHandler::send_email))
        .with_state(email_handler)
}
