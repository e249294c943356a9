pub mod chat;
pub mod document;

pub use chat::{
    ChatMessage, ContentPart, GenerationParams, ImageUrl, MessageContent, Role, StreamEvent,
};
pub use document::{DocumentChunk, DocumentIndex};
