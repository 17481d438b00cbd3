//! Lead registration: validate → duplicate check → insert → notify.
//!
//! The store's unique index on `email` is what actually prevents duplicate
//! leads. The lookup before the insert only lets the common case answer
//! early; a uniqueness violation at insert time is reported the same way.
//! Notifications are best-effort: once the row is in, the registration has
//! succeeded no matter what the mail transport does.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use super::model::{Assessment, Registration, Relation};
use crate::email::EmailDispatcher;
use crate::error::{DatabaseError, RegistrationError};
use crate::locale::Language;
use crate::store::RegistrationStore;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Lead-capture form submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub email: Option<String>,
    #[serde(alias = "whatsappNumber")]
    pub whatsapp: Option<String>,
    pub relation: Relation,
    #[serde(default)]
    pub concerns: Vec<String>,
    pub assessment: Option<Assessment>,
    pub report_id: Option<String>,
    #[serde(default)]
    pub language: Language,
}

/// What happened to a valid submission.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Created(Registration),
    /// A record with this email already exists.
    Duplicate,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize and check a submission, producing the record to insert.
pub fn validate(request: RegistrationRequest) -> Result<Registration, RegistrationError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(RegistrationError::Validation("name is required".into()));
    }

    let email = non_blank(request.email).map(|e| e.to_lowercase());
    let whatsapp = non_blank(request.whatsapp);
    if email.is_none() && whatsapp.is_none() {
        return Err(RegistrationError::Validation(
            "an email address or WhatsApp number is required".into(),
        ));
    }
    if let Some(email) = &email
        && !EMAIL_RE.is_match(email)
    {
        return Err(RegistrationError::Validation(format!(
            "invalid email address: {email}"
        )));
    }
    if let Some(p) = request.assessment.as_ref().and_then(|a| a.fall_probability)
        && !(0.0..=100.0).contains(&p)
    {
        return Err(RegistrationError::Validation(format!(
            "fall probability must be between 0 and 100, got {p}"
        )));
    }

    Ok(
        Registration::new(name, email, whatsapp, request.relation, request.concerns)
            .with_assessment(request.assessment)
            .with_report_id(non_blank(request.report_id)),
    )
}

pub struct RegistrationPipeline {
    store: Arc<dyn RegistrationStore>,
    dispatcher: Arc<EmailDispatcher>,
    timeout: Duration,
}

impl RegistrationPipeline {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        dispatcher: Arc<EmailDispatcher>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            timeout,
        }
    }

    /// Bound a store call; a timeout counts as a transient storage failure.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, DatabaseError>>,
    ) -> Result<T, DatabaseError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| DatabaseError::Timeout(self.timeout))?
    }

    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let language = request.language;
        let registration = validate(request)?;

        if let Some(email) = &registration.email
            && self.bounded(self.store.email_exists(email)).await?
        {
            tracing::info!(email = %email, "Registration rejected: email already registered");
            return Ok(RegistrationOutcome::Duplicate);
        }

        match self
            .bounded(self.store.insert_registration(&registration))
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => {
                tracing::info!("Registration lost insert race; treating as duplicate");
                return Ok(RegistrationOutcome::Duplicate);
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(id = %registration.id, relation = registration.relation.as_str(), "Registration created");

        self.notify(&registration, language).await;
        Ok(RegistrationOutcome::Created(registration))
    }

    async fn notify(&self, registration: &Registration, language: Language) {
        if let Some(email) = &registration.email
            && let Err(e) = self
                .dispatcher
                .send_confirmation(email, registration, language)
                .await
        {
            tracing::warn!(id = %registration.id, error = %e, "Confirmation email failed");
        }

        if let Err(e) = self.dispatcher.send_internal_notification(registration).await {
            tracing::warn!(id = %registration.id, error = %e, "Internal notification failed");
        }
    }
}
