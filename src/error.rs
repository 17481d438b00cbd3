//! Error types for the lead-capture service.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
}

impl DatabaseError {
    /// Map a raw libSQL error, surfacing uniqueness violations as `Constraint`.
    pub fn from_libsql(context: &str, err: libsql::Error) -> Self {
        let message = err.to_string();
        if message.contains("UNIQUE constraint failed") {
            DatabaseError::Constraint(format!("{context}: {message}"))
        } else {
            DatabaseError::Query(format!("{context}: {message}"))
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::Constraint(_))
    }
}

/// Outbound email errors.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email transport is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Email API request failed: {0}")]
    Request(String),

    #[error("Email API rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("SMTP send failed: {0}")]
    Smtp(String),
}

/// Chat completion upstream errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat API key is not configured")]
    MissingCredential,

    #[error("Chat request failed: {0}")]
    RequestFailed(String),

    #[error("Chat upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid chat response: {0}")]
    InvalidResponse(String),
}

impl ChatError {
    /// Stable code safe to hand back to callers. Upstream bodies can echo
    /// credential fragments, so the full error stays in the logs.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::MissingCredential => "missing_credential",
            ChatError::RequestFailed(_) => "upstream_unavailable",
            ChatError::Upstream { .. } => "upstream_error",
            ChatError::InvalidResponse(_) => "invalid_upstream_response",
        }
    }
}

/// Registration pipeline failures. Duplicates are not errors; see
/// `RegistrationOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Storage(#[from] DatabaseError),
}

/// Daily report failures.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to load registrations: {0}")]
    Load(#[from] DatabaseError),

    #[error("Failed to send report: {0}")]
    Send(#[from] EmailError),

    #[error("Invalid schedule '{schedule}': {reason}")]
    Schedule { schedule: String, reason: String },
}

impl ReportError {
    /// Stable code for HTTP callers; details stay in the logs.
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::Load(_) => "report_load_failed",
            ReportError::Send(_) => "report_send_failed",
            ReportError::Schedule { .. } => "invalid_schedule",
        }
    }
}
