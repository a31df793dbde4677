//! # Slot Registry
//!
//! Owns the claim transaction: an invitee takes one of a proposal's slots and
//! records availability in a single all-or-nothing write. Also owns the
//! replace-availability transaction for an existing slot.
//!
//! The rules are plain functions (`validate_claim`, `check_claim`,
//! `authorize_claimant`, the history builders) so they can be tested without a
//! store. The async operations run them inside one [`StoreTransaction`].
//!
//! [`StoreTransaction`]: crate::store::StoreTransaction

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::{
    errors::{Conflict, HuddleError, HuddleResult},
    models::{
        identity::Identity,
        proposal::Proposal,
        slot::{
            AvailabilityEntry, AvailabilityHistoryPolicy, AvailabilityHistoryRecord,
            ClaimSlotRequest, DayAvailability, HistoryAction, NewHistoryRecord, NewSlot, Slot,
            SlotAvailability,
        },
    },
    store::SchedulingStore,
};

/// A claim request that passed every check not requiring the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedClaim {
    pub proposal_id: Uuid,
    pub name: String,
    pub email: String,
    pub availability: Vec<DayAvailability>,
}

/// Trims and lower-cases an email, rejecting anything not shaped like
/// `local@domain.tld`.
pub fn normalize_email(raw: &str) -> HuddleResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(HuddleError::validation("Email is required"));
    }
    if !is_address_like(&email) {
        return Err(HuddleError::validation("Invalid email address"));
    }
    Ok(email)
}

fn is_address_like(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Every busy interval must be non-empty and no date may appear twice.
pub fn validate_availability(days: &[DayAvailability]) -> HuddleResult<()> {
    let mut seen = HashSet::with_capacity(days.len());
    for day in days {
        if !seen.insert(day.date) {
            return Err(HuddleError::validation(format!(
                "Date {} submitted more than once",
                day.date
            )));
        }
        if let Some(busy) = day.busy_times.iter().find(|busy| busy.start >= busy.end) {
            return Err(HuddleError::validation(format!(
                "Busy time {} on {} must end after it starts",
                busy, day.date
            )));
        }
    }
    Ok(())
}

pub fn validate_claim(request: ClaimSlotRequest) -> HuddleResult<ValidatedClaim> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(HuddleError::validation("Name is required"));
    }
    let email = normalize_email(&request.email)?;
    validate_availability(&request.availability)?;

    Ok(ValidatedClaim {
        proposal_id: request.proposal_id,
        name,
        email,
        availability: request.availability,
    })
}

pub fn ensure_within_range(proposal: &Proposal, days: &[DayAvailability]) -> HuddleResult<()> {
    match days.iter().find(|day| !proposal.covers(day.date)) {
        Some(day) => Err(HuddleError::validation(format!(
            "Date {} is outside the proposal's date range {} to {}",
            day.date, proposal.date_range_start, proposal.date_range_end
        ))),
        None => Ok(()),
    }
}

/// Preconditions of a claim, evaluated against state read inside the claim
/// transaction.
pub fn check_claim(proposal: &Proposal, filled: i64, already_claimed: bool) -> HuddleResult<()> {
    if !proposal.is_active() {
        return Err(Conflict::ProposalInactive.into());
    }
    if filled >= i64::from(proposal.num_slots) {
        return Err(Conflict::CapacityExceeded.into());
    }
    if already_claimed {
        return Err(Conflict::DuplicateClaim.into());
    }
    Ok(())
}

pub fn authorize_claimant(caller: Option<&Identity>, slot: &Slot) -> HuddleResult<()> {
    match caller {
        Some(identity) if identity.owns_email(&slot.email) => Ok(()),
        _ => Err(HuddleError::not_authorized()),
    }
}

/// History written by a claim: one record per submitted date, tagged
/// `updated` even though the entries are new.
pub fn claim_history(slot_id: Uuid, days: &[DayAvailability]) -> Vec<NewHistoryRecord> {
    days.iter()
        .map(|day| NewHistoryRecord {
            slot_id,
            date: day.date,
            busy_times: day.busy_times.clone(),
            action: HistoryAction::Updated,
        })
        .collect()
}

/// History for replacing `previous` with `next`: dropped dates are
/// `deleted` (with their old busy times), dates present before and after are
/// `updated`, new dates are `created`.
pub fn replacement_history(
    slot_id: Uuid,
    previous: &[AvailabilityEntry],
    next: &[DayAvailability],
) -> Vec<NewHistoryRecord> {
    let before: BTreeMap<_, _> = previous.iter().map(|entry| (entry.date, entry)).collect();
    let after: HashSet<_> = next.iter().map(|day| day.date).collect();

    let deleted = before
        .values()
        .filter(|entry| !after.contains(&entry.date))
        .map(|entry| NewHistoryRecord {
            slot_id,
            date: entry.date,
            busy_times: entry.busy_times.clone(),
            action: HistoryAction::Deleted,
        });

    let written = next.iter().map(|day| NewHistoryRecord {
        slot_id,
        date: day.date,
        busy_times: day.busy_times.clone(),
        action: if before.contains_key(&day.date) {
            HistoryAction::Updated
        } else {
            HistoryAction::Created
        },
    });

    deleted.chain(written).collect()
}

/// Claims a slot on a proposal and records the claimant's availability.
///
/// Runs as one transaction: the proposal row is locked, capacity and
/// uniqueness are checked, the slot, its entries and their history are
/// inserted, and the slot count is checked again before commit. On any error
/// the transaction is dropped and nothing is written.
///
/// # Errors
///
/// * `HuddleError::Validation` - blank name, malformed email, bad busy times,
///   repeated or out-of-range dates
/// * `HuddleError::NotFound` - the proposal does not exist
/// * `HuddleError::Conflict` - proposal inactive, slots full, or the email
///   already holds a slot
/// * `HuddleError::Database` - the store failed; nothing was written
pub async fn claim_slot(
    store: &dyn SchedulingStore,
    request: ClaimSlotRequest,
) -> HuddleResult<Slot> {
    let claim = validate_claim(request)?;

    let mut tx = store.begin().await?;

    let proposal = tx
        .lock_proposal(claim.proposal_id)
        .await?
        .ok_or_else(|| HuddleError::proposal_not_found(claim.proposal_id))?;
    ensure_within_range(&proposal, &claim.availability)?;

    let filled = tx.count_slots(proposal.id).await?;
    let existing = tx.find_claim(proposal.id, &claim.email).await?;
    if let Err(err) = check_claim(&proposal, filled, existing.is_some()) {
        tracing::warn!(
            "Claim rejected: proposal_id={}, filled={}, num_slots={}, reason={}",
            proposal.id, filled, proposal.num_slots, err
        );
        return Err(err);
    }

    let has_account = tx.account_exists(&claim.email).await?;
    let slot = tx
        .insert_slot(&NewSlot {
            proposal_id: proposal.id,
            name: claim.name,
            email: claim.email,
            has_account,
        })
        .await?;

    for day in &claim.availability {
        tx.insert_availability(slot.id, day).await?;
    }
    for record in claim_history(slot.id, &claim.availability) {
        tx.append_history(&record).await?;
    }

    // Final consistency check inside the same transaction boundary.
    let filled = tx.count_slots(proposal.id).await?;
    if filled > i64::from(proposal.num_slots) {
        tracing::warn!(
            "Claim overflowed capacity, rolling back: proposal_id={}, filled={}",
            proposal.id, filled
        );
        return Err(Conflict::CapacityExceeded.into());
    }

    tx.commit().await?;

    tracing::info!(
        "Slot claimed: slot_id={}, proposal_id={}, dates={}, has_account={}",
        slot.id,
        slot.proposal_id,
        claim.availability.len(),
        slot.has_account
    );
    Ok(slot)
}

/// Replaces the whole availability set of a slot.
///
/// Only the claimant may do this. Existing entries are deleted and the new
/// set inserted in one transaction; history is appended only when `policy`
/// asks for it.
///
/// # Errors
///
/// * `HuddleError::Validation` - bad busy times, repeated or out-of-range dates
/// * `HuddleError::NotFound` - the slot does not exist
/// * `HuddleError::Authorization` - the caller is not the claimant
/// * `HuddleError::Database` - the store failed; nothing was written
pub async fn update_availability(
    store: &dyn SchedulingStore,
    caller: Option<&Identity>,
    slot_id: Uuid,
    availability: Vec<DayAvailability>,
    policy: AvailabilityHistoryPolicy,
) -> HuddleResult<Vec<AvailabilityEntry>> {
    validate_availability(&availability)?;

    let mut tx = store.begin().await?;

    let slot = tx
        .lock_slot(slot_id)
        .await?
        .ok_or_else(|| HuddleError::slot_not_found(slot_id))?;
    authorize_claimant(caller, &slot)?;

    let proposal = tx
        .lock_proposal(slot.proposal_id)
        .await?
        .ok_or_else(|| HuddleError::proposal_not_found(slot.proposal_id))?;
    ensure_within_range(&proposal, &availability)?;

    let previous = if policy.records_updates() {
        tx.availability_for_slot(slot.id).await?
    } else {
        Vec::new()
    };

    let removed = tx.delete_availability(slot.id).await?;
    let mut entries = Vec::with_capacity(availability.len());
    for day in &availability {
        entries.push(tx.insert_availability(slot.id, day).await?);
    }

    if policy.records_updates() {
        for record in replacement_history(slot.id, &previous, &availability) {
            tx.append_history(&record).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        "Availability replaced: slot_id={}, removed={}, inserted={}, history={}",
        slot.id,
        removed,
        entries.len(),
        policy.records_updates()
    );
    Ok(entries)
}

pub async fn slots_for_proposal(
    store: &dyn SchedulingStore,
    proposal_id: Uuid,
) -> HuddleResult<Vec<SlotAvailability>> {
    if store.get_proposal(proposal_id).await?.is_none() {
        return Err(HuddleError::proposal_not_found(proposal_id));
    }
    store.list_slots(proposal_id).await
}

pub async fn availability_for_slot(
    store: &dyn SchedulingStore,
    slot_id: Uuid,
) -> HuddleResult<Vec<AvailabilityEntry>> {
    if store.get_slot(slot_id).await?.is_none() {
        return Err(HuddleError::slot_not_found(slot_id));
    }
    store.availability_for_slot(slot_id).await
}

/// Audit trail of a slot, readable by its claimant and by the proposal's
/// creator.
pub async fn history_for_slot(
    store: &dyn SchedulingStore,
    caller: &Identity,
    slot_id: Uuid,
) -> HuddleResult<Vec<AvailabilityHistoryRecord>> {
    let slot = store
        .get_slot(slot_id)
        .await?
        .ok_or_else(|| HuddleError::slot_not_found(slot_id))?;

    if !caller.owns_email(&slot.email) {
        let proposal = store
            .get_proposal(slot.proposal_id)
            .await?
            .ok_or_else(|| HuddleError::proposal_not_found(slot.proposal_id))?;
        if !proposal.is_created_by(caller) {
            return Err(HuddleError::not_authorized());
        }
    }

    store.history_for_slot(slot_id).await
}
