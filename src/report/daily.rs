//! Daily registration report: export every record as CSV and mail it.
//!
//! Runs from two triggers: the `/api/reports/daily` endpoint and an
//! in-process cron ticker.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::csv::{to_attachment, to_csv};
use crate::email::EmailDispatcher;
use crate::error::{DatabaseError, ReportError};
use crate::store::RegistrationStore;

/// Result of one report run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub success: bool,
    pub record_count: usize,
    pub generated_at: DateTime<Utc>,
    /// Creation time of the oldest exported record.
    pub period_start: Option<DateTime<Utc>>,
    /// Creation time of the newest exported record.
    pub period_end: Option<DateTime<Utc>>,
}

pub struct DailyReporter {
    store: Arc<dyn RegistrationStore>,
    dispatcher: Arc<EmailDispatcher>,
    timeout: Duration,
}

impl DailyReporter {
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

    /// Load all records, format them, and send one report email.
    pub async fn run(&self) -> Result<ReportSummary, ReportError> {
        let records = tokio::time::timeout(self.timeout, self.store.list_registrations())
            .await
            .map_err(|_| DatabaseError::Timeout(self.timeout))??;

        let generated_at = Utc::now();
        let csv = to_csv(&records);
        let attachment = to_attachment(&csv, generated_at);

        self.dispatcher
            .send_daily_report(records.len(), generated_at, attachment)
            .await?;

        // Records arrive newest first
        let summary = ReportSummary {
            success: true,
            record_count: records.len(),
            generated_at,
            period_start: records.last().map(|r| r.created_at),
            period_end: records.first().map(|r| r.created_at),
        };
        tracing::info!(
            record_count = summary.record_count,
            "Daily registration report sent"
        );
        Ok(summary)
    }
}

/// Parse a six-field cron expression.
pub fn parse_schedule(expr: &str) -> Result<cron::Schedule, ReportError> {
    cron::Schedule::from_str(expr).map_err(|e| ReportError::Schedule {
        schedule: expr.to_string(),
        reason: e.to_string(),
    })
}

/// First fire time strictly after `after`.
pub fn next_fire_after(schedule: &cron::Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

/// Spawn a task that runs the report at each cron fire time.
///
/// Each slot is derived from the previous slot, not the wall clock, so an
/// early timer wake-up cannot fire the same slot twice.
pub fn spawn_report_scheduler(
    reporter: Arc<DailyReporter>,
    expr: String,
) -> Result<tokio::task::JoinHandle<()>, ReportError> {
    let schedule = parse_schedule(&expr)?;

    Ok(tokio::spawn(async move {
        let mut last_fire = Utc::now();
        loop {
            let Some(next) = next_fire_after(&schedule, last_fire) else {
                tracing::warn!(schedule = %expr, "Report schedule has no upcoming fire time");
                return;
            };
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tracing::debug!(next = %next, "Next daily report scheduled");
            tokio::time::sleep(wait).await;
            last_fire = next;

            if let Err(e) = reporter.run().await {
                tracing::error!("Scheduled daily report failed: {e}");
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::dispatcher::testing::{RecordingMailer, recipients};
    use crate::email::{EmailDispatcher, Recipients};
    use crate::leads::model::{Registration, Relation};
    use crate::store::LibSqlBackend;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    async fn setup(
        mailer: Arc<RecordingMailer>,
        recipients: Recipients,
    ) -> (Arc<LibSqlBackend>, DailyReporter) {
        let store = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let dispatcher = Arc::new(EmailDispatcher::new(mailer, recipients));
        let reporter = DailyReporter::new(store.clone(), dispatcher, Duration::from_secs(5));
        (store, reporter)
    }

    #[tokio::test]
    async fn report_attaches_csv_of_all_records() {
        let mailer = Arc::new(RecordingMailer::default());
        let (store, reporter) = setup(mailer.clone(), recipients()).await;
        for email in ["a@example.com", "b@example.com"] {
            let reg = Registration::new("A", Some(email.into()), None, Relation::Parent, vec![]);
            store.insert_registration(&reg).await.unwrap();
        }

        let summary = reporter.run().await.unwrap();
        assert!(summary.success);
        assert_eq!(summary.record_count, 2);
        assert!(summary.period_start <= summary.period_end);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["reports@example.com"]);
        let csv = String::from_utf8(STANDARD.decode(&sent[0].attachments[0].content).unwrap())
            .unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[tokio::test]
    async fn empty_store_sends_sentinel() {
        let mailer = Arc::new(RecordingMailer::default());
        let (_store, reporter) = setup(mailer.clone(), recipients()).await;

        let summary = reporter.run().await.unwrap();
        assert_eq!(summary.record_count, 0);
        assert!(summary.period_start.is_none());

        let sent = mailer.sent();
        let csv = STANDARD.decode(&sent[0].attachments[0].content).unwrap();
        assert_eq!(csv, b"No registrations found");
    }

    #[tokio::test]
    async fn send_failure_is_surfaced() {
        let mailer = Arc::new(RecordingMailer::failing());
        let (_store, reporter) = setup(mailer, recipients()).await;
        assert!(matches!(reporter.run().await, Err(ReportError::Send(_))));
    }

    #[test]
    fn cron_expression_validation() {
        let schedule = parse_schedule("0 0 1 * * *").unwrap();
        assert!(next_fire_after(&schedule, Utc::now()).is_some());
        assert!(matches!(
            parse_schedule("every morning"),
            Err(ReportError::Schedule { .. })
        ));
    }

    #[test]
    fn next_slot_follows_the_previous_slot() {
        use chrono::TimeZone;

        let schedule = parse_schedule("0 0 1 * * *").unwrap();
        let slot = Utc.with_ymd_and_hms(2026, 3, 1, 1, 0, 0).unwrap();

        // From the slot itself the next fire is a full day later
        assert_eq!(
            next_fire_after(&schedule, slot),
            Some(Utc.with_ymd_and_hms(2026, 3, 2, 1, 0, 0).unwrap())
        );
        // A clock a few ms short of the slot would pick the same slot again
        let early = slot - chrono::Duration::milliseconds(5);
        assert_eq!(next_fire_after(&schedule, early), Some(slot));
    }
}
