use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::error::DeckError;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---------------------------------------------------------------------------
// Mailer – one-shot authenticated STARTTLS delivery
// ---------------------------------------------------------------------------

/// Sends a report artifact as a mail attachment. Performs exactly one
/// delivery attempt per call; any retry policy belongs to the caller.
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Mailer { config }
    }

    /// Validate the recipient, assemble the message, and hand it to the SMTP
    /// transport. The recipient is checked before any network I/O, so an
    /// empty or malformed address never opens a connection.
    pub fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        artifact: Vec<u8>,
        filename: &str,
    ) -> Result<(), DeckError> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(DeckError::InvalidRecipient {
                address: recipient.to_string(),
            });
        }
        let to: Mailbox = recipient.parse().map_err(|_| DeckError::InvalidRecipient {
            address: recipient.to_string(),
        })?;

        let from: Mailbox = self
            .config
            .from
            .parse()
            .map_err(|e| DeckError::Transport(format!("bad from-address: {e}")))?;
        let content_type = ContentType::parse(XLSX_MIME)
            .map_err(|e| DeckError::Transport(format!("bad attachment content type: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body.to_string()))
                    .singlepart(Attachment::new(filename.to_string()).body(artifact, content_type)),
            )
            .map_err(|e| DeckError::Transport(format!("building message: {e}")))?;

        let credentials =
            Credentials::new(self.config.username.clone(), self.config.password.clone());
        let transport = SmtpTransport::starttls_relay(&self.config.host)
            .map_err(|e| DeckError::Transport(e.to_string()))?
            .port(self.config.port)
            .credentials(credentials)
            .build();

        log::info!("sending report to {recipient} via {}", self.config.host);
        transport
            .send(&message)
            .map_err(|e| DeckError::Transport(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> Mailer {
        Mailer::new(MailConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "reports@example.com".to_string(),
            password: "secret".to_string(),
            from: "reports@example.com".to_string(),
        })
    }

    #[test]
    fn empty_recipient_is_rejected_before_any_network_call() {
        let err = mailer()
            .send("", "subject", "body", Vec::new(), "report.xlsx")
            .unwrap_err();
        assert!(matches!(err, DeckError::InvalidRecipient { .. }));
    }

    #[test]
    fn malformed_recipient_is_rejected() {
        let err = mailer()
            .send("not an address", "subject", "body", Vec::new(), "report.xlsx")
            .unwrap_err();
        assert!(matches!(err, DeckError::InvalidRecipient { .. }));
    }
}
