pub mod index_service;
pub mod prompt;
pub mod relay;
pub mod retrieval;

pub use index_service::{IndexHandle, IndexService, IndexServiceError};
pub use relay::{EventStream, RelayOptions, relay, relay_failure};
