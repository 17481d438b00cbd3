//! Registration export and the scheduled daily report.

pub mod csv;
pub mod daily;

pub use daily::{DailyReporter, ReportSummary, spawn_report_scheduler};
