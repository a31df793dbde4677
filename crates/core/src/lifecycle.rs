//! # Proposal Lifecycle
//!
//! Creation, partial updates and cancellation of proposals, plus the
//! per-user listing. Only the creator may mutate a proposal, and only while
//! it is active; cancellation is one way and keeps every slot and
//! availability row.

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::{
    errors::{Conflict, HuddleError, HuddleResult},
    models::{
        identity::Identity,
        proposal::{
            CreateProposalRequest, NewProposal, Proposal, ProposalDetail, ProposalListing,
            ProposalPatch, ProposalStatus,
        },
    },
    store::SchedulingStore,
};

/// Length of the date range used when a proposal is created without one.
pub const DEFAULT_RANGE_DAYS: u64 = 28;

fn check_title(title: &str) -> HuddleResult<()> {
    if title.trim().is_empty() {
        return Err(HuddleError::validation("Title is required"));
    }
    Ok(())
}

fn check_range(start: NaiveDate, end: NaiveDate) -> HuddleResult<()> {
    if start > end {
        return Err(HuddleError::validation(format!(
            "Date range start {} is after end {}",
            start, end
        )));
    }
    Ok(())
}

fn check_num_slots(num_slots: i32) -> HuddleResult<()> {
    if num_slots < 1 {
        return Err(HuddleError::validation("Number of slots must be at least 1"));
    }
    Ok(())
}

/// Validates a create request, filling in the default range
/// `[today, today + 28 days]` for whichever bound is missing.
pub fn prepare_proposal(
    creator: &Identity,
    request: CreateProposalRequest,
    today: NaiveDate,
) -> HuddleResult<NewProposal> {
    check_title(&request.title)?;
    check_num_slots(request.num_slots)?;

    let start = request.date_range_start.unwrap_or(today);
    let end = match request.date_range_end {
        Some(end) => end,
        None => today
            .checked_add_days(Days::new(DEFAULT_RANGE_DAYS))
            .ok_or_else(|| HuddleError::validation("Date range is out of bounds"))?,
    };
    check_range(start, end)?;

    Ok(NewProposal {
        title: request.title.trim().to_string(),
        description: request.description,
        date_range_start: start,
        date_range_end: end,
        creator_id: creator.user_id,
        num_slots: request.num_slots,
    })
}

pub fn authorize_creator(caller: &Identity, proposal: &Proposal) -> HuddleResult<()> {
    if proposal.is_created_by(caller) {
        Ok(())
    } else {
        Err(HuddleError::not_authorized())
    }
}

impl ProposalPatch {
    /// Merges the patch into `proposal`, producing the next value. Fields
    /// left as `Keep` retain their current value. `filled` is the number of
    /// slots already claimed; the target may not drop below it.
    pub fn apply(self, proposal: &Proposal, filled: i64) -> HuddleResult<Proposal> {
        if self.is_empty() {
            return Err(HuddleError::validation("No updates provided"));
        }

        let title = self.title.resolve(proposal.title.clone());
        check_title(&title)?;

        let num_slots = self.num_slots.resolve(proposal.num_slots);
        check_num_slots(num_slots)?;
        if i64::from(num_slots) < filled {
            return Err(HuddleError::validation(format!(
                "Number of slots cannot be less than the {} already filled",
                filled
            )));
        }

        let date_range_start = self.date_range_start.resolve(proposal.date_range_start);
        let date_range_end = self.date_range_end.resolve(proposal.date_range_end);
        check_range(date_range_start, date_range_end)?;

        Ok(Proposal {
            title: title.trim().to_string(),
            description: self.description.resolve(proposal.description.clone()),
            date_range_start,
            date_range_end,
            num_slots,
            ..proposal.clone()
        })
    }
}

pub async fn create_proposal(
    store: &dyn SchedulingStore,
    creator: &Identity,
    request: CreateProposalRequest,
    today: NaiveDate,
) -> HuddleResult<Proposal> {
    let new_proposal = prepare_proposal(creator, request, today)?;
    let proposal = store.insert_proposal(&new_proposal).await?;

    tracing::info!(
        "Proposal created: id={}, creator_id={}, num_slots={}, range={}..={}",
        proposal.id,
        proposal.creator_id,
        proposal.num_slots,
        proposal.date_range_start,
        proposal.date_range_end
    );
    Ok(proposal)
}

pub async fn get_proposal(store: &dyn SchedulingStore, id: Uuid) -> HuddleResult<ProposalDetail> {
    let proposal = store
        .get_proposal(id)
        .await?
        .ok_or_else(|| HuddleError::proposal_not_found(id))?;
    let filled_slots = store.count_slots(id).await?;

    Ok(ProposalDetail {
        proposal,
        filled_slots,
    })
}

/// Applies a partial update on behalf of the creator.
///
/// # Errors
///
/// * `HuddleError::Validation` - empty patch or a patch producing an invalid
///   proposal
/// * `HuddleError::NotFound` - the proposal does not exist
/// * `HuddleError::Authorization` - the caller is not the creator
/// * `HuddleError::Conflict` - the proposal has been cancelled
pub async fn update_proposal(
    store: &dyn SchedulingStore,
    caller: &Identity,
    id: Uuid,
    patch: ProposalPatch,
) -> HuddleResult<Proposal> {
    let mut tx = store.begin().await?;

    let current = tx
        .lock_proposal(id)
        .await?
        .ok_or_else(|| HuddleError::proposal_not_found(id))?;
    authorize_creator(caller, &current)?;
    if patch.is_empty() {
        return Err(HuddleError::validation("No updates provided"));
    }
    if !current.is_active() {
        return Err(Conflict::ProposalInactive.into());
    }

    let filled = tx.count_slots(id).await?;
    let next = patch.apply(&current, filled)?;
    let saved = tx.save_proposal(&next).await?;
    tx.commit().await?;

    tracing::info!("Proposal updated: id={}", saved.id);
    Ok(saved)
}

/// Cancels a proposal. Cancelling an already cancelled proposal succeeds and
/// writes nothing.
pub async fn cancel_proposal(
    store: &dyn SchedulingStore,
    caller: &Identity,
    id: Uuid,
) -> HuddleResult<Proposal> {
    let mut tx = store.begin().await?;

    let current = tx
        .lock_proposal(id)
        .await?
        .ok_or_else(|| HuddleError::proposal_not_found(id))?;
    authorize_creator(caller, &current)?;

    if current.status == ProposalStatus::Cancelled {
        tracing::debug!("Proposal already cancelled: id={}", id);
        return Ok(current);
    }

    let cancelled = tx
        .save_proposal(&Proposal {
            status: ProposalStatus::Cancelled,
            ..current
        })
        .await?;
    tx.commit().await?;

    tracing::info!("Proposal cancelled: id={}", id);
    Ok(cancelled)
}

pub async fn list_for_user(
    store: &dyn SchedulingStore,
    identity: &Identity,
) -> HuddleResult<ProposalListing> {
    let mut created = store.list_created_by(identity.user_id).await?;
    let mut responded: Vec<Proposal> = store
        .list_responded_by(identity)
        .await?
        .into_iter()
        .filter(|proposal| !proposal.is_created_by(identity))
        .collect();

    created.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    responded.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(ProposalListing { created, responded })
}
