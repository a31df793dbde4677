use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub name: String,
    pub email: String,
    /// Snapshot taken at claim time; never re-derived.
    pub has_account: bool,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSlot {
    pub proposal_id: Uuid,
    pub name: String,
    pub email: String,
    pub has_account: bool,
}

/// Part of an available day during which the respondent is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyTime {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl BusyTime {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for BusyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(hhmm::FORMAT),
            self.end.format(hhmm::FORMAT)
        )
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|_| serde::de::Error::custom(format!("invalid time of day: {}", raw)))
    }
}

/// What a respondent submits for one date. An empty `busy_times` means free
/// all day; a date with no `DayAvailability` at all means not available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub busy_times: Vec<BusyTime>,
}

/// `"busyTimes": null` reads the same as an absent list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<BusyTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<BusyTime>>::deserialize(deserializer)?.unwrap_or_default())
}

impl DayAvailability {
    pub fn free_all_day(date: NaiveDate) -> Self {
        Self {
            date,
            busy_times: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub date: NaiveDate,
    pub busy_times: Vec<BusyTime>,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityEntry {
    pub fn to_day(&self) -> DayAvailability {
        DayAvailability {
            date: self.date,
            busy_times: self.busy_times.clone(),
        }
    }
}

/// A slot together with its current availability entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    #[serde(flatten)]
    pub slot: Slot,
    pub availability: Vec<AvailabilityEntry>,
    pub availability_count: usize,
}

impl SlotAvailability {
    pub fn new(slot: Slot, mut availability: Vec<AvailabilityEntry>) -> Self {
        availability.sort_by_key(|entry| entry.date);
        let availability_count = availability.len();
        Self {
            slot,
            availability,
            availability_count,
        }
    }

    pub fn entry_for(&self, date: NaiveDate) -> Option<&AvailabilityEntry> {
        self.availability.iter().find(|entry| entry.date == date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Created => "created",
            HistoryAction::Updated => "updated",
            HistoryAction::Deleted => "deleted",
        }
    }
}

impl FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(HistoryAction::Created),
            "updated" => Ok(HistoryAction::Updated),
            "deleted" => Ok(HistoryAction::Deleted),
            other => Err(format!("unknown history action: {}", other)),
        }
    }
}

/// Append-only audit row. Never rewritten once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityHistoryRecord {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub date: NaiveDate,
    pub busy_times: Vec<BusyTime>,
    pub action: HistoryAction,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub slot_id: Uuid,
    pub date: NaiveDate,
    pub busy_times: Vec<BusyTime>,
    pub action: HistoryAction,
}

/// Whether replacing a slot's availability appends history.
///
/// Claims always append one `updated` record per submitted date. Updates
/// historically appended nothing; `ClaimAndUpdate` records them too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvailabilityHistoryPolicy {
    #[default]
    ClaimOnly,
    ClaimAndUpdate,
}

impl AvailabilityHistoryPolicy {
    pub fn records_updates(&self) -> bool {
        matches!(self, AvailabilityHistoryPolicy::ClaimAndUpdate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSlotRequest {
    pub proposal_id: Uuid,
    pub name: String,
    pub email: String,
    pub availability: Vec<DayAvailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSlotResponse {
    pub slot: Slot,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub availability: Vec<DayAvailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub availability: Vec<AvailabilityEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub slots: Vec<SlotAvailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<AvailabilityHistoryRecord>,
}
