//! Outbound mail over SMTP with STARTTLS.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[derive(Debug)]
pub enum MailerError {
    InvalidAddress(String),
    Message(String),
    Transport(String),
}

impl std::fmt::Display for MailerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailerError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            MailerError::Message(msg) => write!(f, "Message error: {}", msg),
            MailerError::Transport(msg) => write!(f, "SMTP error: {}", msg),
        }
    }
}

impl std::error::Error for MailerError {}

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
}

pub struct Mailer {
    config: MailerConfig,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> Self {
        Self { config }
    }

    pub async fn send(
        &self,
        from_addr: &str,
        to_addr: &str,
        subject: &str,
        content: &str,
    ) -> Result<(), MailerError> {
        let message = build_message(from_addr, to_addr, subject, content)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        Ok(())
    }
}

fn build_message(
    from_addr: &str,
    to_addr: &str,
    subject: &str,
    content: &str,
) -> Result<Message, MailerError> {
    let from: Mailbox = from_addr
        .parse()
        .map_err(|_| MailerError::InvalidAddress(from_addr.to_string()))?;
    let to: Mailbox = to_addr
        .parse()
        .map_err(|_| MailerError::InvalidAddress(to_addr.to_string()))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(content.to_string())
        .map_err(|e| MailerError::Message(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_plain_text_message() {
        let message = build_message(
            "sender@example.com",
            "receiver@example.com",
            "会议提醒",
            "明天上午十点开会。",
        );
        assert!(message.is_ok());
    }

    #[test]
    fn accepts_display_names() {
        let message = build_message(
            "助手 <bot@example.com>",
            "receiver@example.com",
            "hi",
            "body",
        );
        assert!(message.is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        let err = build_message("not-an-address", "receiver@example.com", "s", "b").unwrap_err();
        assert!(matches!(err, MailerError::InvalidAddress(a) if a == "not-an-address"));
    }
}
