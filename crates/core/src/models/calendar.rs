use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::proposal::Proposal;

/// How much of the group is free on a day. Variants are declared from least
/// to most free so that `Ord` follows availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvailabilityTier {
    NoneFree,
    FewFree,
    SomeFree,
    MostFree,
    AllFree,
}

impl AvailabilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityTier::NoneFree => "none-free",
            AvailabilityTier::FewFree => "few-free",
            AvailabilityTier::SomeFree => "some-free",
            AvailabilityTier::MostFree => "most-free",
            AvailabilityTier::AllFree => "all-free",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableRespondent {
    pub slot_id: Uuid,
    pub name: String,
    /// Busy intervals rendered as `HH:MM-HH:MM`.
    pub busy_times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableRespondent {
    pub slot_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub count: usize,
    pub total: usize,
    pub tier: AvailabilityTier,
    pub available_slots: Vec<AvailableRespondent>,
    pub unavailable_slots: Vec<UnavailableRespondent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub proposal_id: Uuid,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub proposal: Proposal,
    pub days: Vec<CalendarDay>,
    pub best_days: Vec<NaiveDate>,
}
