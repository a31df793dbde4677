//! # Availability Aggregator
//!
//! Turns a proposal's date range and its claimed slots into a per-day
//! summary: how many respondents are free, which tier that puts the day in,
//! and who is (and is not) available.
//!
//! Everything here except [`calendar_for_proposal`] is a pure function of its
//! inputs, so the calendar is recomputed on every read.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    errors::{HuddleError, HuddleResult},
    models::{
        calendar::{
            AvailabilityTier, AvailableRespondent, Calendar, CalendarDay, UnavailableRespondent,
        },
        proposal::Proposal,
        slot::SlotAvailability,
    },
    store::SchedulingStore,
};

/// Classifies a day by the share of respondents free on it.
///
/// Breakpoints are inclusive lower bounds on `count / total`: 100% is
/// all-free, 70% most-free, 40% some-free, anything above zero few-free.
/// Compared in integers so that e.g. 7/10 lands exactly on 70%.
pub fn classify(count: usize, total: usize) -> AvailabilityTier {
    if total == 0 || count == 0 {
        return AvailabilityTier::NoneFree;
    }
    let scaled = count.min(total) * 100;
    if count >= total {
        AvailabilityTier::AllFree
    } else if scaled >= total * 70 {
        AvailabilityTier::MostFree
    } else if scaled >= total * 40 {
        AvailabilityTier::SomeFree
    } else {
        AvailabilityTier::FewFree
    }
}

/// Every date from `start` to `end` inclusive, ascending.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

pub fn build_day(date: NaiveDate, slots: &[SlotAvailability]) -> CalendarDay {
    let mut available_slots = Vec::new();
    let mut unavailable_slots = Vec::new();

    for entry in slots {
        match entry.entry_for(date) {
            Some(day) => available_slots.push(AvailableRespondent {
                slot_id: entry.slot.id,
                name: entry.slot.name.clone(),
                busy_times: day.busy_times.iter().map(ToString::to_string).collect(),
            }),
            None => unavailable_slots.push(UnavailableRespondent {
                slot_id: entry.slot.id,
                name: entry.slot.name.clone(),
            }),
        }
    }

    let count = available_slots.len();
    let total = slots.len();
    CalendarDay {
        date,
        count,
        total,
        tier: classify(count, total),
        available_slots,
        unavailable_slots,
    }
}

pub fn build_calendar(proposal: &Proposal, slots: &[SlotAvailability]) -> Calendar {
    let days = days_in_range(proposal.date_range_start, proposal.date_range_end)
        .map(|date| build_day(date, slots))
        .collect();

    Calendar {
        proposal_id: proposal.id,
        days,
    }
}

impl Calendar {
    /// Detail for a selected date, if it lies in the range.
    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days
            .binary_search_by_key(&date, |day| day.date)
            .ok()
            .map(|index| &self.days[index])
    }

    /// Days with at least one respondent free, most free first, earlier
    /// dates winning ties.
    pub fn best_days(&self, limit: usize) -> Vec<&CalendarDay> {
        let mut ranked: Vec<&CalendarDay> = self.days.iter().filter(|day| day.count > 0).collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.date.cmp(&b.date)));
        ranked.truncate(limit);
        ranked
    }
}

pub async fn calendar_for_proposal(
    store: &dyn SchedulingStore,
    proposal_id: Uuid,
) -> HuddleResult<(Proposal, Calendar)> {
    let proposal = store
        .get_proposal(proposal_id)
        .await?
        .ok_or_else(|| HuddleError::proposal_not_found(proposal_id))?;
    let slots = store.list_slots(proposal_id).await?;

    tracing::debug!(
        "Building calendar: proposal_id={}, slots={}",
        proposal_id,
        slots.len()
    );
    let calendar = build_calendar(&proposal, &slots);
    Ok((proposal, calendar))
}
