pub mod chat_handler;
pub mod email_handler;
pub mod login_handler;
pub mod search_handler;
pub mod upload_handler;
pub mod vision_handler;

pub use chat_handler::{ChatHandler, create_sse_response};
pub use email_handler::EmailHandler;
pub use login_handler::LoginHandler;
pub use search_handler::SearchHandler;
pub use upload_handler::UploadHandler;
pub use vision_handler::VisionHandler;
