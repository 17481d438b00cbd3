//! Diet plan selection.
//!
//! Selection is a lookup: only the frailty level picks the bundle. Age group
//! and gender are collected by the wizard and accepted here, but none of the
//! three plans varies by them yet.

mod plans;

use serde::{Deserialize, Serialize};

use crate::leads::model::AgeGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frailty {
    Active,
    #[serde(alias = "pre-frail")]
    PreFrail,
    Frail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// A precomputed diet plan.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub goal: &'static str,
    pub duration: &'static str,
    pub breakfast: &'static [&'static str],
    pub lunch: &'static [&'static str],
    pub dinner: &'static [&'static str],
    pub snacks: &'static [&'static str],
    pub supplements: &'static [&'static str],
    pub tips: &'static [&'static str],
    pub expected_outcomes: &'static [&'static str],
}

/// Pick the plan for a person. Total and deterministic.
pub fn select_plan(_age: AgeGroup, _gender: Gender, frailty: Frailty) -> &'static DietPlan {
    match frailty {
        Frailty::Active => &plans::ACTIVE,
        Frailty::PreFrail => &plans::PRE_FRAIL,
        Frailty::Frail => &plans::FRAIL,
    }
}

/// Wizard input.
#[derive(Debug, Clone, Deserialize)]
pub struct DietPlanRequest {
    pub age: AgeGroup,
    pub gender: Gender,
    pub frailty: Frailty,
}
