use axum::{Router, routing::post};
use std::sync::Arc;

use crate::presentation::http::handlers::VisionHandler;

pub fn vision_routes(vision_handler: Arc<VisionHandler>) -> Router {
    Router::new()
        .route("/chat_with_image", post(VisionHandler::chat_with_image))
        .with_state(vision_handler)
}
