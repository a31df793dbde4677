use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result};
use huddle_core::models::{
    proposal::{Proposal, ProposalStatus},
    slot::{AvailabilityEntry, AvailabilityHistoryRecord, BusyTime, HistoryAction, Slot},
};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbProposal {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date_range_start: NaiveDate,
    pub date_range_end: NaiveDate,
    pub creator_id: Uuid,
    pub num_slots: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbProposal> for Proposal {
    type Error = eyre::Report;

    fn try_from(row: DbProposal) -> Result<Self> {
        let status = row
            .status
            .parse::<ProposalStatus>()
            .map_err(|e| eyre!("Corrupt proposal {}: {}", row.id, e))?;

        Ok(Proposal {
            id: row.id,
            title: row.title,
            description: row.description,
            date_range_start: row.date_range_start,
            date_range_end: row.date_range_end,
            creator_id: row.creator_id,
            num_slots: row.num_slots,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub name: String,
    pub email: String,
    pub has_account: bool,
    pub claimed_at: DateTime<Utc>,
}

impl From<DbSlot> for Slot {
    fn from(row: DbSlot) -> Self {
        Slot {
            id: row.id,
            proposal_id: row.proposal_id,
            name: row.name,
            email: row.email,
            has_account: row.has_account,
            claimed_at: row.claimed_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAvailabilityEntry {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub date: NaiveDate,
    pub busy_times: Json<Vec<BusyTime>>,
    pub created_at: DateTime<Utc>,
}

impl From<DbAvailabilityEntry> for AvailabilityEntry {
    fn from(row: DbAvailabilityEntry) -> Self {
        AvailabilityEntry {
            id: row.id,
            slot_id: row.slot_id,
            date: row.date,
            busy_times: row.busy_times.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbHistoryRecord {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub date: NaiveDate,
    pub busy_times: Option<Json<Vec<BusyTime>>>,
    pub action: String,
    pub changed_at: DateTime<Utc>,
}

impl TryFrom<DbHistoryRecord> for AvailabilityHistoryRecord {
    type Error = eyre::Report;

    fn try_from(row: DbHistoryRecord) -> Result<Self> {
        let action = row
            .action
            .parse::<HistoryAction>()
            .map_err(|e| eyre!("Corrupt history record {}: {}", row.id, e))?;

        Ok(AvailabilityHistoryRecord {
            id: row.id,
            slot_id: row.slot_id,
            date: row.date,
            busy_times: row.busy_times.map(|Json(times)| times).unwrap_or_default(),
            action,
            changed_at: row.changed_at,
        })
    }
}
