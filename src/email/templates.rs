//! HTML email templates.
//!
//! Rendering is plain string substitution. Field values are inserted as-is,
//! so callers must not pass untrusted markup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::leads::model::Registration;
use crate::locale::Language;
use crate::report::csv::format_hk_time;

/// Template selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    Confirmation,
    InternalNotification,
    DailyReport,
}

/// Template-specific fields.
#[derive(Debug, Clone)]
pub enum TemplateFields {
    Confirmation {
        name: String,
        concerns: Vec<String>,
    },
    InternalNotification {
        registration: Registration,
    },
    DailyReport {
        record_count: usize,
        generated_at: DateTime<Utc>,
    },
}

impl TemplateFields {
    pub fn template(&self) -> Template {
        match self {
            TemplateFields::Confirmation { .. } => Template::Confirmation,
            TemplateFields::InternalNotification { .. } => Template::InternalNotification,
            TemplateFields::DailyReport { .. } => Template::DailyReport,
        }
    }
}

/// Subject line and HTML body ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

pub fn render(fields: &TemplateFields, language: Language) -> RenderedEmail {
    match fields {
        TemplateFields::Confirmation { name, concerns } => {
            render_confirmation(name, concerns, language)
        }
        TemplateFields::InternalNotification { registration } => {
            render_internal_notification(registration)
        }
        TemplateFields::DailyReport {
            record_count,
            generated_at,
        } => render_daily_report(*record_count, *generated_at),
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="font-family: Arial, 'Noto Sans TC', sans-serif; color: #333; line-height: 1.6;">
<div style="max-width: 600px; margin: 0 auto; padding: 24px;">
<h2 style="color: #2c7a7b;">{title}</h2>
{body}
</div>
</body>
</html>"#
    )
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{item}</li>"))
        .collect::<Vec<_>>()
        .join("")
}

fn render_confirmation(name: &str, concerns: &[String], language: Language) -> RenderedEmail {
    match language {
        Language::Zh => {
            let concerns_block = if concerns.is_empty() {
                String::new()
            } else {
                format!("<p>您關注的範疇：</p><ul>{}</ul>", list_items(concerns))
            };
            let body = format!(
                "<p>{name} 您好，</p>\
                 <p>多謝您的登記！我們的護理顧問將於兩個工作天內與您聯絡。</p>\
                 {concerns_block}\
                 <p>如有任何疑問，歡迎直接回覆此電郵。</p>\
                 <p>護理團隊 敬上</p>"
            );
            RenderedEmail {
                subject: "多謝您的登記".to_string(),
                html: layout("多謝您的登記", &body),
            }
        }
        Language::En => {
            let concerns_block = if concerns.is_empty() {
                String::new()
            } else {
                format!(
                    "<p>Areas you told us about:</p><ul>{}</ul>",
                    list_items(concerns)
                )
            };
            let body = format!(
                "<p>Dear {name},</p>\
                 <p>Thank you for registering. A care consultant will contact you within two working days.</p>\
                 {concerns_block}\
                 <p>If you have any questions, simply reply to this email.</p>\
                 <p>The Care Team</p>"
            );
            RenderedEmail {
                subject: "Thank you for registering".to_string(),
                html: layout("Thank you for registering", &body),
            }
        }
    }
}

fn render_internal_notification(reg: &Registration) -> RenderedEmail {
    let row = |label: &str, value: &str| {
        format!(
            "<tr><td style=\"padding: 4px 12px 4px 0;\"><strong>{label}</strong></td><td>{value}</td></tr>"
        )
    };

    let mut rows = vec![
        row("Name", &reg.name),
        row("Email", reg.email.as_deref().unwrap_or("-")),
        row("WhatsApp", reg.whatsapp.as_deref().unwrap_or("-")),
        row("Relation", reg.relation.as_str()),
        row("Concerns", &reg.concerns.join("; ")),
        row("Status", reg.status.as_str()),
        row("Created At", &format_hk_time(reg.created_at)),
    ];
    if let Some(a) = &reg.assessment {
        if let Some(level) = a.risk_level {
            rows.push(row("Risk Level", level.as_str()));
        }
        if let Some(p) = a.fall_probability {
            rows.push(row("Fall Probability", &format!("{p}%")));
        }
    }
    if let Some(report_id) = &reg.report_id {
        rows.push(row("Report ID", report_id));
    }

    let body = format!(
        "<p>A new lead has registered.</p><table>{}</table>",
        rows.join("")
    );
    RenderedEmail {
        subject: format!("New registration: {}", reg.name),
        html: layout("New registration", &body),
    }
}

fn render_daily_report(record_count: usize, generated_at: DateTime<Utc>) -> RenderedEmail {
    let stamp = format_hk_time(generated_at);
    let date = stamp.split(' ').next().unwrap_or_default().to_string();
    let body = format!(
        "<p>Attached is the registration export generated at {stamp} (HKT).</p>\
         <p>Total registrations: <strong>{record_count}</strong></p>"
    );
    RenderedEmail {
        subject: format!("Daily registration report {date}"),
        html: layout("Daily registration report", &body),
    }
}
