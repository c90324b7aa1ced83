//! Digest delivery: print it (dry run) or email it over SMTPS.

use crate::config::DigestConfig;
use crate::error::{ConfigError, DispatchError};
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use tracing::{info, instrument};

/// A rendered digest ready to hand to a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct Digest {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Sends mail through an authenticated implicit-TLS relay.
pub struct EmailSender {
    host: String,
    port: u16,
    from: String,
    to: String,
    app_password: String,
}

impl fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSender")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

impl EmailSender {
    pub fn build_message(&self, digest: &Digest) -> Result<Message, DispatchError> {
        let from = parse_mailbox(&self.from)?;
        let to = parse_mailbox(&self.to)?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(digest.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(digest.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(digest.html_body.clone()),
                    ),
            )?;
        Ok(message)
    }

    #[instrument(level = "info", skip_all, fields(to = %self.to, subject = %digest.subject))]
    pub async fn send(&self, digest: &Digest) -> Result<(), DispatchError> {
        let message = self.build_message(digest)?;
        let creds = Credentials::new(self.from.clone(), self.app_password.clone());
        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?
                .port(self.port)
                .credentials(creds)
                .build();

        mailer.send(message).await?;
        info!("Email sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DispatchError> {
    address.parse().map_err(|source| DispatchError::Address {
        address: address.to_string(),
        source,
    })
}

/// How the digest leaves the process.
#[derive(Debug)]
pub enum Dispatcher {
    /// Print to stdout; nothing is sent.
    DryRun,
    Email(EmailSender),
}

impl Dispatcher {
    /// Pick the dispatcher for `config`. Missing credentials outside dry-run are an error.
    pub fn from_config(config: &DigestConfig) -> Result<Self, ConfigError> {
        if config.dry_run {
            return Ok(Dispatcher::DryRun);
        }
        let creds = config.smtp.credentials()?;
        Ok(Dispatcher::Email(EmailSender {
            host: config.smtp.host.clone(),
            port: config.smtp.port,
            from: creds.sender_email.trim().to_string(),
            to: creds.receiver_email.trim().to_string(),
            app_password: creds.app_password.to_string(),
        }))
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, Dispatcher::DryRun)
    }

    pub async fn deliver(&self, digest: &Digest) -> Result<(), DispatchError> {
        match self {
            Dispatcher::DryRun => {
                info!("Dry run; printing digest instead of sending");
                println!("Subject: {}\n\n{}", digest.subject, digest.text_body);
                Ok(())
            }
            Dispatcher::Email(sender) => sender.send(digest).await,
        }
    }
}
