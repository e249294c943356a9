use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::database::CredentialRepository;
use crate::presentation::http::dto::LoginRequestDto;
use crate::presentation::http::errors::AppError;

pub struct LoginHandler {
    credentials: Arc<CredentialRepository>,
}

impl LoginHandler {
    pub fn new(credentials: Arc<CredentialRepository>) -> Self {
        Self { credentials }
    }

    pub async fn login(
        State(handler): State<Arc<LoginHandler>>,
        Json(body): Json<LoginRequestDto>,
    ) -> Result<impl IntoResponse, AppError> {
        let (username, password) = match (body.username, body.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => {
                return Err(AppError::BadRequest(
                    "Missing username or password".to_string(),
                ));
            }
        };

        if handler.credentials.verify(&username, &password)? {
            Ok(Json(json!({ "message": "Login successful" })))
        } else {
            Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ))
        }
    }
}
