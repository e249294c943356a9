use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::external_services::Mailer;
use crate::presentation::http::dto::EmailRequestDto;
use crate::presentation::http::errors::AppError;

pub struct EmailHandler {
    mailer: Mailer,
}

impl EmailHandler {
    pub fn new(mailer: Mailer) -> Self {
        Self { mailer }
    }

    pub async fn send_email(
        State(handler): State<Arc<EmailHandler>>,
        Json(body): Json<EmailRequestDto>,
    ) -> Result<impl IntoResponse, AppError> {
        handler
            .mailer
            .send(&body.from_addr, &body.to_addr, &body.subject, &body.content)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Json(json!({
            "status": "success",
            "message": "邮件发送成功"
        })))
    }
}
