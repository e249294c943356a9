use serde::Deserialize;

use crate::domain::entities::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub question: Option<String>,
    pub model: Option<String>,
}

/// JSON body accepted by `POST /index`.
#[derive(Debug, Deserialize)]
pub struct QuestionBodyDto {
    pub question: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestDto {
    pub messages: Option<Vec<ChatMessage>>,
    pub model: Option<String>,
}
