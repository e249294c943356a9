use axum::{Router, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::LoginHandler;

pub fn login_routes(login_handler: Arc<LoginHandler>) -> Router {
    Router::new()
        .route("/api/login", post(LoginHandler::login))
        .with_state(login_handler)
}
