use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchRequestDto {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequestDto {
    pub from_addr: String,
    pub to_addr: String,
    pub subject: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequestDto {
    pub username: Option<String>,
    pub password: Option<String>,
}
