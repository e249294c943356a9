//! Chat-completion client for OpenAI-compatible APIs (both Zhipu and
//! Deepseek speak this dialect). Streaming responses arrive as SSE
//! `data:` lines carrying incremental deltas.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::LlmError;
use crate::domain::entities::{ChatMessage, GenerationParams};

const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One upstream token: `Ok(Some(text))` is a content delta, `Ok(None)`
/// is a skippable frame (heartbeat, malformed delta), `Err` is fatal
/// for the stream.
pub type TokenItem = Result<Option<String>, LlmError>;
pub type TokenStream = Pin<Box<dyn Stream<Item = TokenItem> + Send>>;

#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub default_max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

fn build_request(
    client: &Client,
    config: &OpenAiCompatConfig,
    messages: &[ChatMessage],
    params: GenerationParams,
    stream: bool,
) -> reqwest::RequestBuilder {
    let body = ChatCompletionRequest {
        model: &config.model,
        messages,
        stream,
        temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        max_tokens: params.max_tokens.or(config.default_max_tokens),
    };

    let mut req = client
        .post(format!("{}/chat/completions", config.base_url))
        .header("Content-Type", "application/json")
        .json(&body);

    if !config.api_key.is_empty() {
        req = req.header("Authorization", format!("Bearer {}", config.api_key));
    }

    req
}

/// Non-streamed completion; returns the assistant message content.
pub async fn chat(
    config: &OpenAiCompatConfig,
    messages: &[ChatMessage],
    params: GenerationParams,
) -> Result<String, LlmError> {
    let client = Client::new();
    let resp = build_request(&client, config, messages, params, false)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        return Err(LlmError::Api { status, message });
    }

    let data: ChatCompletionResponse = resp.json().await?;
    data.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(LlmError::EmptyResponse)
}

/// Streamed completion. The returned stream ends after the provider's
/// `[DONE]` sentinel, a `finish_reason`, or connection close; a mid-
/// stream transport error is yielded once as `Err` and ends the stream.
pub async fn chat_stream(
    config: &OpenAiCompatConfig,
    messages: &[ChatMessage],
    params: GenerationParams,
) -> Result<TokenStream, LlmError> {
    let client = Client::new();
    let resp = build_request(&client, config, messages, params, true)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        return Err(LlmError::Api { status, message });
    }

    let state = SseLineBuffer::default();
    let stream = futures::stream::unfold(
        (resp.bytes_stream(), state),
        |(mut body, mut state)| async move {
            loop {
                if let Some(item) = state.pending.pop_front() {
                    return Some((item, (body, state)));
                }
                if state.finished {
                    return None;
                }

                match body.next().await {
                    Some(Ok(chunk)) => {
                        state.buffer.push_str(&String::from_utf8_lossy(&chunk));
                        state.drain_lines();
                    }
                    Some(Err(e)) => {
                        state.pending.push_back(Err(e.into()));
                        state.finished = true;
                    }
                    None => state.finished = true,
                }
            }
        },
    );

    Ok(Box::pin(stream))
}

#[derive(Default)]
struct SseLineBuffer {
    buffer: String,
    pending: VecDeque<TokenItem>,
    finished: bool,
}

impl SseLineBuffer {
    /// Consumes complete `data:` lines from the buffer, queueing one
    /// token item per line.
    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);

            let Some(data) = line.strip_prefix("data: ") else {
                continue;
            };

            if data == "[DONE]" {
                self.finished = true;
                return;
            }

            match serde_json::from_str::<StreamResponse>(data) {
                Ok(parsed) => {
                    let Some(choice) = parsed.choices.into_iter().next() else {
                        self.pending.push_back(Ok(None));
                        continue;
                    };
                    if let Some(content) = choice.delta.content {
                        if !content.is_empty() {
                            self.pending.push_back(Ok(Some(content)));
                        }
                    }
                    if choice.finish_reason.is_some() {
                        self.finished = true;
                        return;
                    }
                }
                // Malformed delta: skippable, never fatal for the stream.
                Err(e) => {
                    tracing::debug!("skipping malformed stream line: {}", e);
                    self.pending.push_back(Ok(None));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ChatMessage;

    fn drain(input: &str) -> (Vec<TokenItem>, bool) {
        let mut state = SseLineBuffer {
            buffer: input.to_string(),
            ..Default::default()
        };
        state.drain_lines();
        (state.pending.into_iter().collect(), state.finished)
    }

    #[test]
    fn parses_content_deltas_in_order() {
        let input = "data: {\"choices\":[{\"delta\":{\"content\":\"你好\"},\"finish_reason\":null}]}\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"。\"},\"finish_reason\":null}]}\n";
        let (items, finished) = drain(input);
        assert!(!finished);
        let tokens: Vec<_> = items
            .into_iter()
            .map(|i| i.unwrap().unwrap())
            .collect();
        assert_eq!(tokens, vec!["你好", "。"]);
    }

    #[test]
    fn done_sentinel_ends_the_stream() {
        let (items, finished) = drain("data: [DONE]\ndata: {\"choices\":[]}\n");
        assert!(finished);
        assert!(items.is_empty());
    }

    #[test]
    fn finish_reason_ends_the_stream() {
        let input =
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n";
        let (_, finished) = drain(input);
        assert!(finished);
    }

    #[test]
    fn malformed_line_is_a_skippable_item() {
        let (items, finished) = drain("data: {not json}\n");
        assert!(!finished);
        assert!(matches!(items.as_slice(), [Ok(None)]));
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let (items, finished) = drain(": keep-alive\n\nevent: ping\n");
        assert!(items.is_empty());
        assert!(!finished);
    }

    #[test]
    fn partial_line_stays_buffered() {
        let mut state = SseLineBuffer {
            buffer: "data: {\"choices\"".to_string(),
            ..Default::default()
        };
        state.drain_lines();
        assert!(state.pending.is_empty());
        assert_eq!(state.buffer, "data: {\"choices\"");
    }

    #[test]
    fn request_body_omits_absent_max_tokens() {
        let config = OpenAiCompatConfig {
            api_key: String::new(),
            base_url: "http://localhost".into(),
            model: "glm-4".into(),
            default_max_tokens: None,
        };
        let messages = vec![ChatMessage::user("hi")];
        let body = ChatCompletionRequest {
            model: &config.model,
            messages: &messages,
            stream: true,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["stream"], true);
        assert_eq!(json["model"], "glm-4");
    }
}
