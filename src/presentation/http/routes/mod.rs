pub mod chat_routes;
pub mod email_routes;
pub mod health_routes;
pub mod login_routes;
pub mod search_routes;
pub mod upload_routes;
pub mod vision_routes;

pub use chat_routes::chat_routes;
pub use email_routes::email_routes;
pub use health_routes::health_routes;
pub use login_routes::login_routes;
pub use search_routes::search_routes;
pub use upload_routes::upload_routes;
pub use vision_routes::vision_routes;
