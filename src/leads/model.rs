//! Registration record and its enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Relation of the submitter to the person being assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    #[serde(rename = "self")]
    Myself,
    Parent,
    Spouse,
    Relative,
    Friend,
    Other,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Myself => "self",
            Relation::Parent => "parent",
            Relation::Spouse => "spouse",
            Relation::Relative => "relative",
            Relation::Friend => "friend",
            Relation::Other => "other",
        }
    }

    /// Parse a relation from its DB string. Unknown values map to `Other`.
    pub fn from_db(s: &str) -> Self {
        match s {
            "self" => Relation::Myself,
            "parent" => Relation::Parent,
            "spouse" => Relation::Spouse,
            "relative" => Relation::Relative,
            "friend" => Relation::Friend,
            _ => Relation::Other,
        }
    }
}

/// Lead lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Pending,
    Contacted,
    Converted,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Converted => "converted",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "contacted" => LeadStatus::Contacted,
            "converted" => LeadStatus::Converted,
            _ => LeadStatus::Pending,
        }
    }

    /// Status only moves forward: pending → contacted → converted.
    pub fn can_transition_to(&self, next: LeadStatus) -> bool {
        next > *self
    }
}

/// Age band collected by the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "under_65")]
    Under65,
    #[serde(rename = "65_74")]
    From65To74,
    #[serde(rename = "75_84")]
    From75To84,
    #[serde(rename = "85_plus")]
    Over85,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Under65 => "under_65",
            AgeGroup::From65To74 => "65_74",
            AgeGroup::From75To84 => "75_84",
            AgeGroup::Over85 => "85_plus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

/// Structured fall-risk assessment attached to a registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub has_frailty: bool,
    #[serde(default)]
    pub fallen_last_year: bool,
    #[serde(default)]
    pub taking_psychoactive_meds: bool,
    #[serde(default)]
    pub difficulty_with_adl: bool,
    #[serde(default)]
    pub fearful_of_falling: bool,
    #[serde(default)]
    pub uses_assistive_device: bool,
    pub risk_level: Option<RiskLevel>,
    /// Percentage in 0..=100.
    pub fall_probability: Option<f64>,
}

/// A persisted lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub relation: Relation,
    pub concerns: Vec<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub assessment: Option<Assessment>,
    pub report_id: Option<String>,
}

impl Registration {
    /// A fresh `pending` record stamped now.
    pub fn new(
        name: impl Into<String>,
        email: Option<String>,
        whatsapp: Option<String>,
        relation: Relation,
        concerns: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email,
            whatsapp,
            relation,
            concerns: dedup_concerns(concerns),
            status: LeadStatus::Pending,
            created_at: Utc::now(),
            assessment: None,
            report_id: None,
        }
    }

    pub fn with_assessment(mut self, assessment: Option<Assessment>) -> Self {
        self.assessment = assessment;
        self
    }

    pub fn with_report_id(mut self, report_id: Option<String>) -> Self {
        self.report_id = report_id;
        self
    }
}

/// Trim tags, drop blanks, and drop repeats keeping the first occurrence.
pub fn dedup_concerns(concerns: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(concerns.len());
    for tag in concerns {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}
