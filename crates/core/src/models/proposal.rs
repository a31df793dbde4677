use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Active,
    Cancelled,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Active => "active",
            ProposalStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProposalStatus::Active),
            "cancelled" => Ok(ProposalStatus::Cancelled),
            other => Err(format!("unknown proposal status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date_range_start: NaiveDate,
    pub date_range_end: NaiveDate,
    pub creator_id: Uuid,
    pub num_slots: i32,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    pub fn is_active(&self) -> bool {
        self.status == ProposalStatus::Active
    }

    pub fn is_created_by(&self, identity: &Identity) -> bool {
        self.creator_id == identity.user_id
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.date_range_start <= date && date <= self.date_range_end
    }
}

/// A validated proposal ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProposal {
    pub title: String,
    pub description: Option<String>,
    pub date_range_start: NaiveDate,
    pub date_range_end: NaiveDate,
    pub creator_id: Uuid,
    pub num_slots: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_range_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_range_end: Option<NaiveDate>,
    pub num_slots: i32,
}

/// One mutable attribute in a [`ProposalPatch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Keep,
    Set(T),
}

impl<T> Field<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Field::Set(_))
    }

    pub fn resolve(self, current: T) -> T {
        match self {
            Field::Keep => current,
            Field::Set(value) => value,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Field::Set(value),
            None => Field::Keep,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalPatch {
    pub title: Field<String>,
    /// `Set(None)` clears the description.
    pub description: Field<Option<String>>,
    pub date_range_start: Field<NaiveDate>,
    pub date_range_end: Field<NaiveDate>,
    pub num_slots: Field<i32>,
}

impl ProposalPatch {
    pub fn is_empty(&self) -> bool {
        !(self.title.is_set()
            || self.description.is_set()
            || self.date_range_start.is_set()
            || self.date_range_end.is_set()
            || self.num_slots.is_set())
    }
}

/// Wire form of a partial update. Absent keys keep their value; for
/// `description` an explicit `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProposalRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub date_range_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_range_end: Option<NaiveDate>,
    #[serde(default)]
    pub num_slots: Option<i32>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<UpdateProposalRequest> for ProposalPatch {
    fn from(request: UpdateProposalRequest) -> Self {
        Self {
            title: request.title.into(),
            description: request.description.into(),
            date_range_start: request.date_range_start.into(),
            date_range_end: request.date_range_end.into(),
            num_slots: request.num_slots.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub filled_slots: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalListing {
    pub created: Vec<Proposal>,
    pub responded: Vec<Proposal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalResponse {
    pub proposal: Proposal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalDetailResponse {
    pub proposal: ProposalDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelProposalResponse {
    pub message: String,
    pub proposal: Proposal,
}
