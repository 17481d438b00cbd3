//! CSV export of registration records.
//!
//! Column order is fixed; downstream spreadsheets depend on it. Every field
//! is wrapped in double quotes but embedded quotes are NOT escaped, so a
//! name containing `"` yields a malformed row. Kept as-is until the
//! consumers of this export agree to RFC 4180 escaping.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::email::Attachment;
use crate::leads::model::{Assessment, Registration};

/// Body returned instead of a header-only CSV when there is nothing to export.
pub const NO_DATA: &str = "No registrations found";

pub const HEADERS: [&str; 18] = [
    "ID",
    "Name",
    "Email",
    "WhatsApp Number",
    "Relation",
    "Status",
    "Created At",
    "Concerns",
    "Risk Level",
    "Fall Probability (%)",
    "Report ID",
    "Age Group",
    "Has Frailty",
    "Fallen Last Year",
    "Taking Psychoactive Meds",
    "Difficulty with ADL",
    "Fearful of Falling",
    "Use Assistive Device",
];

/// Hong Kong is UTC+8 all year.
const HK_OFFSET_SECS: i32 = 8 * 3600;

/// Format a timestamp in Hong Kong time, `YYYY-MM-DD HH:MM:SS`.
pub fn format_hk_time(at: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(HK_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

fn record_fields(reg: &Registration) -> [String; 18] {
    let a = reg.assessment.as_ref();
    let flag = |f: fn(&Assessment) -> bool| a.map(f).map(yes_no).unwrap_or_default();

    [
        reg.id.to_string(),
        reg.name.clone(),
        reg.email.clone().unwrap_or_default(),
        reg.whatsapp.clone().unwrap_or_default(),
        reg.relation.as_str().to_string(),
        reg.status.as_str().to_string(),
        format_hk_time(reg.created_at),
        reg.concerns.join("; "),
        a.and_then(|a| a.risk_level)
            .map(|r| r.as_str().to_string())
            .unwrap_or_default(),
        a.and_then(|a| a.fall_probability)
            .map(|p| p.to_string())
            .unwrap_or_default(),
        reg.report_id.clone().unwrap_or_default(),
        a.and_then(|a| a.age_group)
            .map(|g| g.as_str().to_string())
            .unwrap_or_default(),
        flag(|a| a.has_frailty),
        flag(|a| a.fallen_last_year),
        flag(|a| a.taking_psychoactive_meds),
        flag(|a| a.difficulty_with_adl),
        flag(|a| a.fearful_of_falling),
        flag(|a| a.uses_assistive_device),
    ]
}

fn quote_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{}\"", f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render records as CSV text, or [`NO_DATA`] when the list is empty.
pub fn to_csv(records: &[Registration]) -> String {
    if records.is_empty() {
        return NO_DATA.to_string();
    }
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(quote_row(&HEADERS[..]));
    for reg in records {
        lines.push(quote_row(&record_fields(reg)[..]));
    }
    lines.join("\n")
}

/// Base64-encode the CSV as an email attachment.
pub fn to_attachment(csv: &str, generated_at: DateTime<Utc>) -> Attachment {
    let date = format_hk_time(generated_at)
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_string();
    Attachment {
        filename: format!("registrations_{date}.csv"),
        content: STANDARD.encode(csv.as_bytes()),
        content_type: "text/csv".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::model::{AgeGroup, Relation, RiskLevel};
    use chrono::TimeZone;

    /// Split a row produced by `quote_row`. Only valid for fields without `","`.
    fn split_row(line: &str) -> Vec<String> {
        line.trim_matches('"')
            .split("\",\"")
            .map(String::from)
            .collect()
    }

    fn chan() -> Registration {
        let mut reg = Registration::new(
            "Chan",
            Some("chan@example.com".into()),
            Some("+85291234567".into()),
            Relation::Myself,
            vec!["平衡問題".into(), "記憶力".into()],
        );
        reg.created_at = chrono::Utc.with_ymd_and_hms(2026, 5, 4, 16, 30, 0).unwrap();
        reg
    }

    #[test]
    fn empty_list_yields_sentinel() {
        assert_eq!(to_csv(&[]), "No registrations found");
    }

    #[test]
    fn header_has_eighteen_fixed_columns() {
        let csv = to_csv(&[chan()]);
        let header = split_row(csv.lines().next().unwrap());
        assert_eq!(header.len(), 18);
        assert_eq!(header[0], "ID");
        assert_eq!(header[6], "Created At");
        assert_eq!(header[9], "Fall Probability (%)");
        assert_eq!(header[17], "Use Assistive Device");
    }

    #[test]
    fn one_row_per_record() {
        let records = vec![chan(), chan(), chan()];
        let csv = to_csv(&records);
        let rows: Vec<_> = csv.lines().skip(1).map(split_row).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 18));
    }

    #[test]
    fn row_without_assessment_leaves_fields_blank() {
        let csv = to_csv(&[chan()]);
        let row = split_row(csv.lines().nth(1).unwrap());
        assert_eq!(row[1], "Chan");
        assert_eq!(row[4], "self");
        assert_eq!(row[5], "pending");
        // 16:30 UTC → 00:30 next day HKT
        assert_eq!(row[6], "2026-05-05 00:30:00");
        assert_eq!(row[7], "平衡問題; 記憶力");
        assert!(row[8..].iter().all(|f| f.is_empty()));
    }

    #[test]
    fn row_with_assessment_renders_flags() {
        let reg = chan().with_assessment(Some(Assessment {
            age_group: Some(AgeGroup::From65To74),
            has_frailty: true,
            fallen_last_year: false,
            taking_psychoactive_meds: true,
            difficulty_with_adl: false,
            fearful_of_falling: true,
            uses_assistive_device: false,
            risk_level: Some(RiskLevel::Moderate),
            fall_probability: Some(35.5),
        }));
        let csv = to_csv(&[reg]);
        let row = split_row(csv.lines().nth(1).unwrap());
        assert_eq!(row[8], "moderate");
        assert_eq!(row[9], "35.5");
        assert_eq!(row[11], "65_74");
        assert_eq!(&row[12..], &["Yes", "No", "Yes", "No", "Yes", "No"]);
    }

    #[test]
    fn embedded_quotes_are_not_escaped() {
        let mut reg = chan();
        reg.name = "Chan \"Ah Tai\"".into();
        let csv = to_csv(&[reg]);
        assert!(csv.contains("\"Chan \"Ah Tai\"\""));
    }

    #[test]
    fn attachment_is_base64_csv() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 5, 4, 1, 0, 0).unwrap();
        let attachment = to_attachment("\"ID\"", at);
        assert_eq!(attachment.filename, "registrations_2026-05-04.csv");
        assert_eq!(attachment.content_type, "text/csv");
        assert_eq!(STANDARD.decode(attachment.content).unwrap(), b"\"ID\"");
    }
}
