/// Outbound email interface
///
/// Actual delivery (SMTP, provider API) is an external collaborator; the
/// handlers only depend on the [`Mailer`] trait. The default [`LogMailer`]
/// writes the message to the log, which is what development and tests use.
use async_trait::async_trait;
use tracing::info;

/// Error type for mail delivery
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The transport rejected or failed to deliver the message
    #[error("Failed to send email: {0}")]
    SendError(String),
}

/// A message handed to the mail transport
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// HTML body
    pub html: String,
}

/// Mail transport consumed by the API handlers
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers a single message
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// Mailer that logs messages instead of delivering them
///
/// Used in development and tests, and as a stand-in until a real transport
/// is wired up.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            "Outbound email (log transport)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer;
        let result = mailer
            .send(OutboundEmail {
                to: "user@example.com".to_string(),
                subject: "Confirm your account".to_string(),
                html: "<a href=\"#\">Click here</a>".to_string(),
            })
            .await;

        assert!(result.is_ok());
    }
}
