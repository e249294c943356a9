//! Drives a streamed completion from first byte to final event. The
//! relay always opens with an empty delta (so clients can render the
//! connection before the upstream responds) and always closes with
//! exactly one `Done`, even when the upstream fails mid-stream.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt, stream};
use rand::Rng;

use crate::domain::entities::StreamEvent;
use crate::llm::LlmError;
use crate::llm::openai_compat::TokenStream;

pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

const EMOJIS: [&str; 40] = [
    "😊", "🤔", "🎉", "✨", "💡", "🌟", "🚀", "💪", "👍", "🎯",
    "🌈", "🎨", "🎭", "🎪", "🎢", "🎡", "🎠", "🎮", "🎲", "🎯",
    "🎱", "🎳", "🎾", "🏀", "⚽", "🏈", "🏉", "🎿", "🏂", "🏊",
    "🏄", "🚴", "🚵", "🏇", "🏆", "🏅", "🎖", "🏵", "🎗", "🎫",
];

const SENTENCE_ENDERS: [char; 3] = ['。', '！', '？'];

#[derive(Debug, Clone, Copy)]
pub struct RelayOptions {
    /// Delay inserted before each content delta.
    pub pacing_delay: Duration,
    /// Chance of appending an emoji to a sentence-ending delta.
    pub emoji_probability: f64,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_millis(50),
            emoji_probability: 0.2,
        }
    }
}

struct Embellisher {
    probability: f64,
}

impl Embellisher {
    fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    /// Appends a random emoji when the token ends a sentence and the
    /// coin flip lands. Trailing whitespace does not hide the ender.
    fn embellish(&self, token: String) -> String {
        if self.probability <= 0.0 {
            return token;
        }
        let ends_sentence = token
            .trim_end()
            .chars()
            .next_back()
            .is_some_and(|c| SENTENCE_ENDERS.contains(&c));
        if !ends_sentence {
            return token;
        }

        let mut rng = rand::thread_rng();
        if rng.gen_bool(self.probability) {
            let emoji = EMOJIS[rng.gen_range(0..EMOJIS.len())];
            format!("{token}{emoji}")
        } else {
            token
        }
    }
}

enum Phase<F> {
    Start(F),
    Connect(F),
    Stream(TokenStream),
    Finish,
    Closed,
}

struct RelayState<F> {
    phase: Phase<F>,
    embellisher: Embellisher,
    pacing: Duration,
}

/// Turns a pending upstream connection into the client-facing event
/// stream. The opening empty delta is emitted before `connect` is
/// awaited, so a slow or failing connection still produces a well
/// formed stream.
pub fn relay<F>(connect: F, options: RelayOptions) -> EventStream
where
    F: Future<Output = Result<TokenStream, LlmError>> + Send + 'static,
{
    let state = RelayState {
        phase: Phase::Start(connect),
        embellisher: Embellisher::new(options.emoji_probability),
        pacing: options.pacing_delay,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            match std::mem::replace(&mut state.phase, Phase::Closed) {
                Phase::Start(connect) => {
                    state.phase = Phase::Connect(connect);
                    return Some((StreamEvent::Delta(String::new()), state));
                }
                Phase::Connect(connect) => match connect.await {
                    Ok(tokens) => state.phase = Phase::Stream(tokens),
                    Err(e) => {
                        state.phase = Phase::Finish;
                        return Some((StreamEvent::Error(e.to_string()), state));
                    }
                },
                Phase::Stream(mut tokens) => match tokens.next().await {
                    Some(Ok(Some(token))) => {
                        let token = state.embellisher.embellish(token);
                        if !state.pacing.is_zero() {
                            tokio::time::sleep(state.pacing).await;
                        }
                        state.phase = Phase::Stream(tokens);
                        return Some((StreamEvent::Delta(token), state));
                    }
                    Some(Ok(None)) => state.phase = Phase::Stream(tokens),
                    Some(Err(e)) => {
                        state.phase = Phase::Finish;
                        return Some((StreamEvent::Error(e.to_string()), state));
                    }
                    None => state.phase = Phase::Finish,
                },
                Phase::Finish => {
                    state.phase = Phase::Closed;
                    return Some((StreamEvent::Done, state));
                }
                Phase::Closed => return None,
            }
        }
    }))
}

/// Event stream for a request that failed before any upstream call
/// could be attempted. Same shape as a relayed failure: start, error,
/// done.
pub fn relay_failure(message: impl Into<String>) -> EventStream {
    Box::pin(stream::iter(vec![
        StreamEvent::Delta(String::new()),
        StreamEvent::Error(message.into()),
        StreamEvent::Done,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::openai_compat::TokenItem;

    fn scripted(items: Vec<TokenItem>) -> TokenStream {
        Box::pin(stream::iter(items))
    }

    fn instant(probability: f64) -> RelayOptions {
        RelayOptions {
            pacing_delay: Duration::ZERO,
            emoji_probability: probability,
        }
    }

    async fn collect(events: EventStream) -> Vec<StreamEvent> {
        events.collect().await
    }

    #[tokio::test]
    async fn tokens_flow_between_start_and_done() {
        let source = scripted(vec![Ok(Some("你好".into())), Ok(Some("world".into()))]);
        let events = collect(relay(async { Ok(source) }, instant(0.0))).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta(String::new()),
                StreamEvent::Delta("你好".into()),
                StreamEvent::Delta("world".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn skippable_frames_emit_nothing() {
        let source = scripted(vec![Ok(None), Ok(Some("a".into())), Ok(None)]);
        let events = collect(relay(async { Ok(source) }, instant(0.0))).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta(String::new()),
                StreamEvent::Delta("a".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn midstream_error_ends_with_error_then_done() {
        let source = scripted(vec![
            Ok(Some("partial".into())),
            Err(LlmError::EmptyResponse),
            Ok(Some("never sent".into())),
        ]);
        let events = collect(relay(async { Ok(source) }, instant(0.0))).await;
        assert_eq!(events[0], StreamEvent::Delta(String::new()));
        assert_eq!(events[1], StreamEvent::Delta("partial".into()));
        assert!(matches!(events[2], StreamEvent::Error(_)));
        assert_eq!(events[3], StreamEvent::Done);
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn connect_failure_still_starts_and_finishes() {
        let events = collect(relay(
            async { Err(LlmError::NotConfigured("zhipu")) },
            instant(0.0),
        ))
        .await;
        assert_eq!(events[0], StreamEvent::Delta(String::new()));
        assert!(matches!(&events[1], StreamEvent::Error(m) if m.contains("zhipu")));
        assert_eq!(events[2], StreamEvent::Done);
    }

    #[tokio::test]
    async fn every_stream_has_exactly_one_done() {
        let cases: Vec<Vec<TokenItem>> = vec![
            vec![],
            vec![Ok(Some("x".into()))],
            vec![Err(LlmError::EmptyResponse)],
        ];
        for items in cases {
            let events = collect(relay(async { Ok(scripted(items)) }, instant(0.0))).await;
            let dones = events.iter().filter(|e| **e == StreamEvent::Done).count();
            assert_eq!(dones, 1);
            assert_eq!(events.last(), Some(&StreamEvent::Done));
        }
    }

    #[tokio::test]
    async fn certain_embellishment_decorates_sentence_ends() {
        let source = scripted(vec![Ok(Some("这是一句话。".into()))]);
        let events = collect(relay(async { Ok(source) }, instant(1.0))).await;
        let StreamEvent::Delta(token) = &events[1] else {
            panic!("expected a delta");
        };
        assert!(token.starts_with("这是一句话。"));
        assert!(token.len() > "这是一句话。".len());
        let suffix = &token["这是一句话。".len()..];
        assert!(EMOJIS.contains(&suffix));
    }

    #[tokio::test]
    async fn zero_probability_never_decorates() {
        let source = scripted(vec![Ok(Some("句号。".into())), Ok(Some("问号？".into()))]);
        let events = collect(relay(async { Ok(source) }, instant(0.0))).await;
        assert_eq!(events[1], StreamEvent::Delta("句号。".into()));
        assert_eq!(events[2], StreamEvent::Delta("问号？".into()));
    }

    #[tokio::test]
    async fn mid_sentence_tokens_are_never_decorated() {
        let source = scripted(vec![Ok(Some("未完待续".into())), Ok(Some("comma, ".into()))]);
        let events = collect(relay(async { Ok(source) }, instant(1.0))).await;
        assert_eq!(events[1], StreamEvent::Delta("未完待续".into()));
        assert_eq!(events[2], StreamEvent::Delta("comma, ".into()));
    }

    #[test]
    fn trailing_whitespace_does_not_hide_the_ender() {
        let embellisher = Embellisher::new(1.0);
        let out = embellisher.embellish("好的！\n".into());
        assert!(out.starts_with("好的！\n"));
        assert!(out.len() > "好的！\n".len());
    }

    #[tokio::test]
    async fn failure_stream_has_the_relay_shape() {
        let events = collect(relay_failure("请先提供问题")).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta(String::new()),
                StreamEvent::Error("请先提供问题".into()),
                StreamEvent::Done,
            ]
        );
    }
}
