//! Outgoing Email
//!
//! The auth flows only compose messages; delivery goes through the
//! [`EmailSender`] port.

use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Email,
    pub subject: String,
    pub html: String,
    /// Code embedded in the link, kept for logging and tests
    pub code: String,
}

impl EmailMessage {
    pub fn registration_confirmation(to: &Email, frontend_url: &str, code: &str) -> Self {
        Self {
            to: to.clone(),
            subject: "Confirm your registration".to_string(),
            html: format!(
                "<h1>Thank you for your registration</h1>\
                 <p>To finish registration please follow the link below:\
                 <a href='{}/confirm-email?code={}'>complete registration</a></p>",
                frontend_url.trim_end_matches('/'),
                code
            ),
            code: code.to_string(),
        }
    }

    pub fn password_recovery(to: &Email, frontend_url: &str, code: &str) -> Self {
        Self {
            to: to.clone(),
            subject: "Password recovery".to_string(),
            html: format!(
                "<h1>Password recovery</h1>\
                 <p>To finish password recovery please follow the link below:\
                 <a href='{}/password-recovery?recoveryCode={}'>recovery password</a></p>",
                frontend_url.trim_end_matches('/'),
                code
            ),
            code: code.to_string(),
        }
    }
}

#[trait_variant::make(EmailSender: Send)]
pub trait LocalEmailSender {
    async fn send(&self, message: EmailMessage) -> AuthResult<()>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LoggingEmailSender;

impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: EmailMessage) -> AuthResult<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            code = %message.code,
            "Email queued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_link() {
        let to = Email::new("bob@example.com").unwrap();
        let message = EmailMessage::registration_confirmation(&to, "https://blog.dev/", "abc-123");
        assert!(message.html.contains("https://blog.dev/confirm-email?code=abc-123"));
        assert_eq!(message.code, "abc-123");
    }

    #[test]
    fn test_recovery_link() {
        let to = Email::new("bob@example.com").unwrap();
        let message = EmailMessage::password_recovery(&to, "https://blog.dev", "r-1");
        assert!(message.html.contains("password-recovery?recoveryCode=r-1"));
    }

    #[tokio::test]
    async fn test_logging_sender_accepts() {
        let to = Email::new("bob@example.com").unwrap();
        let message = EmailMessage::password_recovery(&to, "https://blog.dev", "r-1");
        assert!(EmailSender::send(&LoggingEmailSender, message).await.is_ok());
    }
}
