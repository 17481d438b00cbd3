//! Email dispatcher: template + recipients → one outbound email.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::mailer::{Attachment, Mailer, OutgoingEmail};
use super::templates::{self, TemplateFields};
use crate::config::EmailConfig;
use crate::error::EmailError;
use crate::leads::model::Registration;
use crate::locale::Language;

/// Fixed distribution lists used by the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct Recipients {
    pub notify_to: Vec<String>,
    pub notify_cc: Vec<String>,
    pub report_to: Vec<String>,
    pub report_cc: Vec<String>,
}

impl From<&EmailConfig> for Recipients {
    fn from(config: &EmailConfig) -> Self {
        Self {
            notify_to: config.notify_recipients.clone(),
            notify_cc: config.notify_cc.clone(),
            report_to: config.report_recipients.clone(),
            report_cc: config.report_cc.clone(),
        }
    }
}

/// Renders templates and hands them to a `Mailer`.
pub struct EmailDispatcher {
    mailer: Arc<dyn Mailer>,
    recipients: Recipients,
}

impl EmailDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, recipients: Recipients) -> Self {
        Self { mailer, recipients }
    }

    /// Render `fields` in `language` and send exactly one email.
    pub async fn dispatch(
        &self,
        fields: &TemplateFields,
        language: Language,
        to: Vec<String>,
        cc: Vec<String>,
        attachments: Vec<Attachment>,
    ) -> Result<(), EmailError> {
        let rendered = templates::render(fields, language);
        let email = OutgoingEmail {
            to,
            cc,
            subject: rendered.subject,
            html: rendered.html,
            attachments,
        };
        tracing::debug!(
            template = ?fields.template(),
            transport = self.mailer.name(),
            "Dispatching email"
        );
        self.mailer.send(&email).await
    }

    /// Confirmation to the person who submitted the form.
    pub async fn send_confirmation(
        &self,
        to: &str,
        registration: &Registration,
        language: Language,
    ) -> Result<(), EmailError> {
        let fields = TemplateFields::Confirmation {
            name: registration.name.clone(),
            concerns: registration.concerns.clone(),
        };
        self.dispatch(&fields, language, vec![to.to_string()], vec![], vec![])
            .await
    }

    /// New-lead notification to the internal distribution list.
    pub async fn send_internal_notification(
        &self,
        registration: &Registration,
    ) -> Result<(), EmailError> {
        if self.recipients.notify_to.is_empty() {
            return Err(EmailError::NotConfigured("EMAIL_NOTIFY_TO is empty".into()));
        }
        let fields = TemplateFields::InternalNotification {
            registration: registration.clone(),
        };
        self.dispatch(
            &fields,
            Language::En,
            self.recipients.notify_to.clone(),
            self.recipients.notify_cc.clone(),
            vec![],
        )
        .await
    }

    /// Daily report with the CSV export attached.
    pub async fn send_daily_report(
        &self,
        record_count: usize,
        generated_at: DateTime<Utc>,
        attachment: Attachment,
    ) -> Result<(), EmailError> {
        if self.recipients.report_to.is_empty() {
            return Err(EmailError::NotConfigured("REPORT_RECIPIENTS is empty".into()));
        }
        let fields = TemplateFields::DailyReport {
            record_count,
            generated_at,
        };
        self.dispatch(
            &fields,
            Language::En,
            self.recipients.report_to.clone(),
            self.recipients.report_cc.clone(),
            vec![attachment],
        )
        .await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording mailer shared by unit tests.

    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(email.clone());
            if self.fail {
                Err(EmailError::Request("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    pub fn recipients() -> Recipients {
        Recipients {
            notify_to: vec!["leads@example.com".into()],
            notify_cc: vec!["manager@example.com".into()],
            report_to: vec!["reports@example.com".into()],
            report_cc: vec![],
        }
    }
}
