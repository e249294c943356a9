//! Wire framing for the two streaming endpoints. `/index` events carry
//! JSON with a `done` flag; `/api/chat` events carry raw token text
//! with a `[DONE]` sentinel.

use axum::response::sse::Event;
use serde::Serialize;

use crate::domain::entities::StreamEvent;

#[derive(Serialize)]
struct StreamFrame<'a> {
    content: &'a str,
    done: bool,
}

#[derive(Serialize)]
struct ErrorFrame<'a> {
    error: &'a str,
}

/// Encoding the terminal frame is best-effort: a frame that fails to
/// serialize is logged and dropped rather than aborting the response.
pub fn to_index_event(event: &StreamEvent) -> Option<Event> {
    match event {
        StreamEvent::Delta(content) => frame_json(&StreamFrame {
            content,
            done: false,
        }),
        StreamEvent::Error(error) => frame_json(&ErrorFrame { error }),
        StreamEvent::Done => frame_json(&StreamFrame {
            content: "",
            done: true,
        }),
    }
}

pub fn to_plain_event(event: &StreamEvent) -> Option<Event> {
    match event {
        StreamEvent::Delta(content) if content.is_empty() => None,
        StreamEvent::Delta(content) => Some(Event::default().data(content)),
        StreamEvent::Error(error) => {
            tracing::warn!("completion stream error: {}", error);
            None
        }
        StreamEvent::Done => Some(Event::default().data("[DONE]")),
    }
}

fn frame_json<T: Serialize>(frame: &T) -> Option<Event> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(Event::default().data(json)),
        Err(e) => {
            tracing::error!("failed to encode stream frame: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_frame_shape() {
        let json = serde_json::to_value(StreamFrame {
            content: "你好",
            done: false,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"content": "你好", "done": false}));
    }

    #[test]
    fn terminal_frame_shape() {
        let json = serde_json::to_value(StreamFrame {
            content: "",
            done: true,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"content": "", "done": true}));
    }

    #[test]
    fn error_frame_shape() {
        let json = serde_json::to_value(ErrorFrame { error: "boom" }).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));
    }

    #[test]
    fn index_framing_emits_every_event() {
        assert!(to_index_event(&StreamEvent::Delta(String::new())).is_some());
        assert!(to_index_event(&StreamEvent::Error("e".into())).is_some());
        assert!(to_index_event(&StreamEvent::Done).is_some());
    }

    #[test]
    fn plain_framing_skips_empty_deltas_and_errors() {
        assert!(to_plain_event(&StreamEvent::Delta(String::new())).is_none());
        assert!(to_plain_event(&StreamEvent::Error("e".into())).is_none());
        assert!(to_plain_event(&StreamEvent::Delta("token".into())).is_some());
        assert!(to_plain_event(&StreamEvent::Done).is_some());
    }
}
