//! Outbound email transports.
//!
//! `HttpMailer` posts to a hosted email API with a bearer credential;
//! `SmtpMailer` relays the same message over SMTP via lettre. Both send
//! exactly one email per call and never retry.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::error::EmailError;

/// A base64-encoded attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub filename: String,
    /// Base64 content.
    pub content: String,
    pub content_type: String,
}

/// A fully rendered email.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

/// Sends one email.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// Sender identity shared by both transports.
#[derive(Debug, Clone)]
pub struct Sender {
    pub name: String,
    pub address: String,
}

impl Sender {
    fn header_value(&self) -> String {
        format!("{} <{}>", self.name, self.address)
    }
}

// ── HTTP API ────────────────────────────────────────────────────────

/// Request body for the hosted email API.
#[derive(Debug, Serialize)]
struct ApiEmailRequest<'a> {
    from: String,
    to: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    cc: &'a [String],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "<[Attachment]>::is_empty")]
    attachments: &'a [Attachment],
}

/// Hosted email API client.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
    sender: Sender,
}

impl HttpMailer {
    pub fn new(
        api_url: impl Into<String>,
        api_key: SecretString,
        sender: Sender,
        timeout: Duration,
    ) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmailError::Request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
            sender,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(EmailError::NotConfigured("EMAIL_API_KEY is empty".into()));
        }
        if email.to.is_empty() {
            return Err(EmailError::InvalidAddress {
                address: String::new(),
                reason: "no recipients".into(),
            });
        }

        let body = ApiEmailRequest {
            from: self.sender.header_value(),
            to: &email.to,
            cc: &email.cc,
            subject: &email.subject,
            html: &email.html,
            attachments: &email.attachments,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = ?email.to, subject = %email.subject, "Email sent via API");
        Ok(())
    }
}

// ── SMTP ────────────────────────────────────────────────────────────

/// SMTP relay transport.
pub struct SmtpMailer {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    sender: Sender,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig, timeout: Duration) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            username: config.smtp_username.clone(),
            password: config.smtp_password.clone(),
            sender: Sender {
                name: config.from_name.clone(),
                address: config.from_address.clone(),
            },
            timeout,
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address.parse().map_err(|e| EmailError::InvalidAddress {
        address: address.to_string(),
        reason: format!("{e}"),
    })
}

/// Build the MIME message for an outgoing email.
pub fn build_mime_message(sender: &Sender, email: &OutgoingEmail) -> Result<Message, EmailError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&sender.header_value())?)
        .subject(email.subject.clone());
    for to in &email.to {
        builder = builder.to(parse_mailbox(to)?);
    }
    for cc in &email.cc {
        builder = builder.cc(parse_mailbox(cc)?);
    }

    let html = SinglePart::html(email.html.clone());
    let message = if email.attachments.is_empty() {
        builder.singlepart(html)
    } else {
        let mut parts = MultiPart::mixed().singlepart(html);
        for attachment in &email.attachments {
            let bytes = STANDARD
                .decode(&attachment.content)
                .map_err(|e| EmailError::Build(format!("attachment {}: {e}", attachment.filename)))?;
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| EmailError::Build(format!("content type: {e}")))?;
            parts = parts.singlepart(
                MimeAttachment::new(attachment.filename.clone()).body(bytes, content_type),
            );
        }
        builder.multipart(parts)
    };

    message.map_err(|e| EmailError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        if self.host.is_empty() {
            return Err(EmailError::NotConfigured("EMAIL_SMTP_HOST is empty".into()));
        }
        let message = build_mime_message(&self.sender, email)?;

        let creds = Credentials::new(
            self.username.clone(),
            self.password.expose_secret().to_string(),
        );
        let transport = SmtpTransport::relay(&self.host)
            .map_err(|e| EmailError::Smtp(format!("SMTP relay error: {e}")))?
            .port(self.port)
            .credentials(creds)
            .timeout(Some(self.timeout))
            .build();

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| EmailError::Smtp(format!("SMTP task panicked: {e}")))?
            .map_err(|e| EmailError::Smtp(e.to_string()))?;

        tracing::info!(to = ?email.to, subject = %email.subject, "Email sent via SMTP");
        Ok(())
    }
}
