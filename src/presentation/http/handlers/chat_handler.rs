use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::sse::Event;
use axum::response::{IntoResponse, Response, Sse};
use futures::stream::{Stream, StreamExt};
use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::application::ports::EmbeddingProvider;
use crate::application::services::{
    EventStream, IndexHandle, RelayOptions, prompt, relay, relay_failure, retrieval,
};
use crate::domain::entities::GenerationParams;
use crate::llm::{ProviderKind, ProviderRegistry};
use crate::presentation::http::dto::{
    ChatRequestDto, IndexQuery, QuestionBodyDto, to_index_event, to_plain_event,
};
use crate::presentation::http::errors::AppError;

pub struct ChatHandler {
    registry: ProviderRegistry,
    embeddings: Arc<dyn EmbeddingProvider>,
    index: Arc<IndexHandle>,
    relay_options: RelayOptions,
}

impl ChatHandler {
    pub fn new(
        registry: ProviderRegistry,
        embeddings: Arc<dyn EmbeddingProvider>,
        index: Arc<IndexHandle>,
        relay_options: RelayOptions,
    ) -> Self {
        Self {
            registry,
            embeddings,
            index,
            relay_options,
        }
    }

    /// `GET`/`POST /index` — streaming chat with retrieval augmentation
    /// when an index is present. Validation failures are plain HTTP
    /// errors; anything after that is reported inside the stream.
    pub async fn completions(
        State(handler): State<Arc<ChatHandler>>,
        Query(params): Query<IndexQuery>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let question = extract_question(&params, &headers, &body)
            .ok_or_else(|| AppError::BadRequest("Question is required".to_string()))?;
        let kind = parse_model(params.model.as_deref())?;

        let events = handler.augmented_stream(kind, question).await;
        let stream =
            events.filter_map(|event| async move { to_index_event(&event).map(Ok) });

        Ok(create_sse_response(stream))
    }

    /// `POST /api/chat` — caller supplies the full message history; no
    /// retrieval, no embellishment, raw-token framing.
    pub async fn chat(
        State(handler): State<Arc<ChatHandler>>,
        Json(body): Json<ChatRequestDto>,
    ) -> Result<Response, AppError> {
        let messages = body
            .messages
            .ok_or_else(|| AppError::BadRequest("Messages are required".to_string()))?;
        let kind = parse_model(body.model.as_deref())?;

        let provider = handler
            .registry
            .select(kind)
            .map_err(|e| AppError::upstream(&e))?;

        let options = RelayOptions {
            emoji_probability: 0.0,
            ..handler.relay_options
        };
        let events = relay(
            async move {
                provider
                    .chat_stream(&messages, GenerationParams::default())
                    .await
            },
            options,
        );
        let stream =
            events.filter_map(|event| async move { to_plain_event(&event).map(Ok) });

        Ok(create_sse_response(stream))
    }

    async fn augmented_stream(&self, kind: ProviderKind, question: String) -> EventStream {
        let provider = match self.registry.select(kind) {
            Ok(provider) => provider,
            Err(e) => return relay_failure(e.to_string()),
        };

        // An absent index is the non-augmented mode, not an error.
        let messages = match self.index.current().await {
            Some(index) => {
                let query_vector = match self.embeddings.embed(&question).await {
                    Ok(vector) => vector,
                    Err(e) => return relay_failure(e.to_string()),
                };
                let chunks = retrieval::search(&index, &query_vector, retrieval::DEFAULT_TOP_K);
                prompt::compose(&question, Some(&chunks))
            }
            None => prompt::compose(&question, None),
        };

        relay(
            async move {
                provider
                    .chat_stream(&messages, GenerationParams::default())
                    .await
            },
            self.relay_options,
        )
    }
}

fn parse_model(raw: Option<&str>) -> Result<ProviderKind, AppError> {
    match raw {
        None => Ok(ProviderKind::Zhipu),
        Some(raw) => ProviderKind::parse(raw)
            .ok_or_else(|| AppError::BadRequest("Invalid model selection".to_string())),
    }
}

/// The question can arrive as a query parameter, a JSON body, or the
/// raw request body, checked in that order.
fn extract_question(params: &IndexQuery, headers: &HeaderMap, body: &Bytes) -> Option<String> {
    if let Some(question) = params.question.as_ref().filter(|q| !q.is_empty()) {
        return Some(question.clone());
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if is_json {
        return serde_json::from_slice::<QuestionBodyDto>(body)
            .ok()
            .and_then(|b| b.question)
            .filter(|q| !q.is_empty());
    }

    let raw = String::from_utf8(body.to_vec()).ok()?;
    (!raw.is_empty()).then_some(raw)
}

// Helper function to create SSE response with keep-alive
pub fn create_sse_response<S>(stream: S) -> Response
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream)
        .keep_alive(
            axum::response::sse::KeepAlive::new()
                .interval(Duration::from_secs(30))
                .text("keep-alive"),
        )
        .into_response()
}
