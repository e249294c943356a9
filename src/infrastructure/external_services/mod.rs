pub mod embeddings_client;
pub mod mailer;
pub mod web_search;

pub use embeddings_client::{EmbeddingsClient, EmbeddingsClientConfig};
pub use mailer::{Mailer, MailerConfig, MailerError};
pub use web_search::{WebSearchClient, WebSearchError};
