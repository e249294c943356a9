use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::external_services::WebSearchClient;
use crate::presentation::http::dto::SearchRequestDto;
use crate::presentation::http::errors::AppError;

pub struct SearchHandler {
    client: WebSearchClient,
}

impl SearchHandler {
    pub fn new(client: WebSearchClient) -> Self {
        Self { client }
    }

    pub async fn search(
        State(handler): State<Arc<SearchHandler>>,
        Json(body): Json<SearchRequestDto>,
    ) -> Result<impl IntoResponse, AppError> {
        let query = body
            .query
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::BadRequest("No query provided".to_string()))?;

        let results = handler
            .client
            .search(&query)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Json(json!({ "results": results })))
    }
}
