//! Configuration types, resolved once from the environment at start-up.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Which transport the email dispatcher uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTransport {
    /// Hosted email API over HTTPS with a bearer credential.
    Http,
    /// Plain SMTP relay.
    Smtp,
}

/// Email dispatcher configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub transport: EmailTransport,
    /// Hosted email API endpoint (HTTP transport).
    pub api_url: String,
    /// Bearer credential for the email API. Empty means unconfigured.
    pub api_key: SecretString,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_name: String,
    pub from_address: String,
    /// Internal distribution list for new-lead notifications.
    pub notify_recipients: Vec<String>,
    pub notify_cc: Vec<String>,
    /// Recipients of the daily CSV report.
    pub report_recipients: Vec<String>,
    pub report_cc: Vec<String>,
}

/// Chat proxy configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_url: String,
    /// Server-held key, never returned to callers. Empty means unconfigured.
    pub api_key: SecretString,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Daily report scheduling.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub enabled: bool,
    /// Six-field cron expression evaluated in UTC.
    pub cron: String,
    /// Shared secret for the HTTP report trigger. Empty disables the endpoint.
    pub trigger_token: SecretString,
}

/// Service-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub db_path: String,
    /// Bound applied to every outbound call (store, email, chat).
    pub outbound_timeout: Duration,
    pub log_dir: Option<String>,
    pub email: EmailConfig,
    pub chat: ChatConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// Missing credentials are allowed (calls fail or fall back later);
    /// malformed values are rejected here.
    pub fn from_env() -> Result<Self, ConfigError> {
        let transport = match var_or("EMAIL_TRANSPORT", "http").to_lowercase().as_str() {
            "http" => EmailTransport::Http,
            "smtp" => EmailTransport::Smtp,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "EMAIL_TRANSPORT".into(),
                    message: format!("expected 'http' or 'smtp', got '{other}'"),
                });
            }
        };

        let email = EmailConfig {
            transport,
            api_url: var_or("EMAIL_API_URL", "https://api.resend.com/emails"),
            api_key: SecretString::from(var_or("EMAIL_API_KEY", "")),
            smtp_host: var_or("EMAIL_SMTP_HOST", ""),
            smtp_port: parse_var("EMAIL_SMTP_PORT", 587)?,
            smtp_username: var_or("EMAIL_SMTP_USERNAME", ""),
            smtp_password: SecretString::from(var_or("EMAIL_SMTP_PASSWORD", "")),
            from_name: var_or("EMAIL_FROM_NAME", "Care Team"),
            from_address: var_or("EMAIL_FROM_ADDRESS", "noreply@example.com"),
            notify_recipients: list_var("EMAIL_NOTIFY_TO"),
            notify_cc: list_var("EMAIL_NOTIFY_CC"),
            report_recipients: list_var("REPORT_RECIPIENTS"),
            report_cc: list_var("REPORT_CC"),
        };

        let chat = ChatConfig {
            api_url: var_or("CHAT_API_URL", "https://api.openai.com/v1/chat/completions"),
            api_key: SecretString::from(var_or("CHAT_API_KEY", "")),
            model: var_or("CHAT_MODEL", "gpt-4o-mini"),
            temperature: parse_var("CHAT_TEMPERATURE", 0.7)?,
            max_tokens: parse_var("CHAT_MAX_TOKENS", 1000)?,
        };

        let report = ReportConfig {
            enabled: parse_var("REPORT_ENABLED", true)?,
            cron: var_or("REPORT_CRON", "0 0 1 * * *"),
            trigger_token: SecretString::from(var_or("REPORT_TRIGGER_TOKEN", "")),
        };

        Ok(Self {
            port: parse_var("LEADS_PORT", 8080)?,
            db_path: var_or("LEADS_DB_PATH", "./data/leads.db"),
            outbound_timeout: Duration::from_secs(parse_var("OUTBOUND_TIMEOUT_SECS", 15)?),
            log_dir: std::env::var("LEADS_LOG_DIR").ok().filter(|s| !s.is_empty()),
            email,
            chat,
            report,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

/// Comma-separated list, blanks dropped.
fn list_var(key: &str) -> Vec<String> {
    split_list(&std::env::var(key).unwrap_or_default())
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_blanks() {
        assert_eq!(
            split_list(" ops@example.com, ,sales@example.com,"),
            vec!["ops@example.com".to_string(), "sales@example.com".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}
