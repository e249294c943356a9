pub mod chat_dto;
pub mod stream_dto;
pub mod utility_dto;

pub use chat_dto::*;
pub use stream_dto::*;
pub use utility_dto::*;
