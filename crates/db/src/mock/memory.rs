//! In-memory store.
//!
//! A transaction holds the store's lock from `begin` until it is committed
//! or dropped, so transactions never interleave. Writes go to a private copy
//! of the state that replaces the shared state on commit; dropping the
//! transaction discards the copy.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use eyre::eyre;
use huddle_core::{
    errors::{Conflict, HuddleResult},
    models::{
        identity::Identity,
        proposal::{NewProposal, Proposal, ProposalStatus},
        slot::{
            AvailabilityEntry, AvailabilityHistoryRecord, DayAvailability, NewHistoryRecord,
            NewSlot, Slot, SlotAvailability,
        },
    },
    store::{SchedulingStore, StoreTransaction},
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    /// Lower-cased email to user id.
    accounts: HashMap<String, Uuid>,
    proposals: Vec<Proposal>,
    slots: Vec<Slot>,
    entries: Vec<AvailabilityEntry>,
    history: Vec<AvailabilityHistoryRecord>,
}

impl MemoryState {
    fn proposal(&self, id: Uuid) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    fn slot(&self, id: Uuid) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn slot_count(&self, proposal_id: Uuid) -> i64 {
        self.slots
            .iter()
            .filter(|s| s.proposal_id == proposal_id)
            .count() as i64
    }

    fn entries_for(&self, slot_id: Uuid) -> Vec<AvailabilityEntry> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.slot_id == slot_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        entries
    }

    /// Newest first. Ties keep the later insert first.
    fn newest_first<'a>(proposals: impl DoubleEndedIterator<Item = &'a Proposal>) -> Vec<Proposal> {
        let mut list: Vec<Proposal> = proposals.rev().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }
}

#[derive(Debug, Default)]
struct Faults {
    history_writes: AtomicBool,
    commits: AtomicBool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `append_history` fail with a database error.
    pub fn fail_history_writes(&self, fail: bool) {
        self.faults.history_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `commit` fail with a database error.
    pub fn fail_commits(&self, fail: bool) {
        self.faults.commits.store(fail, Ordering::SeqCst);
    }

    pub async fn slot_total(&self) -> usize {
        self.state.lock().await.slots.len()
    }

    pub async fn entry_total(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn history_total(&self) -> usize {
        self.state.lock().await.history.len()
    }

    pub async fn has_account(&self, email: &str) -> bool {
        self.state
            .lock()
            .await
            .accounts
            .contains_key(&email.trim().to_lowercase())
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    faults: Arc<Faults>,
}

#[async_trait]
impl SchedulingStore for MemoryStore {
    async fn begin(&self) -> HuddleResult<Box<dyn StoreTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            faults: Arc::clone(&self.faults),
        }))
    }

    async fn remember_account(&self, identity: &Identity) -> HuddleResult<()> {
        self.state
            .lock()
            .await
            .accounts
            .entry(identity.email.trim().to_lowercase())
            .or_insert(identity.user_id);
        Ok(())
    }

    async fn insert_proposal(&self, proposal: &NewProposal) -> HuddleResult<Proposal> {
        let created = Proposal {
            id: Uuid::new_v4(),
            title: proposal.title.clone(),
            description: proposal.description.clone(),
            date_range_start: proposal.date_range_start,
            date_range_end: proposal.date_range_end,
            creator_id: proposal.creator_id,
            num_slots: proposal.num_slots,
            status: ProposalStatus::Active,
            created_at: Utc::now(),
        };
        self.state.lock().await.proposals.push(created.clone());
        Ok(created)
    }

    async fn get_proposal(&self, id: Uuid) -> HuddleResult<Option<Proposal>> {
        Ok(self.state.lock().await.proposal(id).cloned())
    }

    async fn count_slots(&self, proposal_id: Uuid) -> HuddleResult<i64> {
        Ok(self.state.lock().await.slot_count(proposal_id))
    }

    async fn list_created_by(&self, creator_id: Uuid) -> HuddleResult<Vec<Proposal>> {
        let state = self.state.lock().await;
        Ok(MemoryState::newest_first(
            state.proposals.iter().filter(|p| p.creator_id == creator_id),
        ))
    }

    async fn list_responded_by(&self, identity: &Identity) -> HuddleResult<Vec<Proposal>> {
        let state = self.state.lock().await;
        let email = identity.email.trim().to_lowercase();
        Ok(MemoryState::newest_first(state.proposals.iter().filter(|p| {
            p.creator_id != identity.user_id
                && state
                    .slots
                    .iter()
                    .any(|s| s.proposal_id == p.id && s.email == email)
        })))
    }

    async fn get_slot(&self, id: Uuid) -> HuddleResult<Option<Slot>> {
        Ok(self.state.lock().await.slot(id).cloned())
    }

    async fn list_slots(&self, proposal_id: Uuid) -> HuddleResult<Vec<SlotAvailability>> {
        let state = self.state.lock().await;
        Ok(state
            .slots
            .iter()
            .filter(|s| s.proposal_id == proposal_id)
            .map(|s| SlotAvailability::new(s.clone(), state.entries_for(s.id)))
            .collect())
    }

    async fn availability_for_slot(&self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityEntry>> {
        Ok(self.state.lock().await.entries_for(slot_id))
    }

    async fn history_for_slot(&self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityHistoryRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .history
            .iter()
            .filter(|h| h.slot_id == slot_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_proposal(&mut self, id: Uuid) -> HuddleResult<Option<Proposal>> {
        Ok(self.working.proposal(id).cloned())
    }

    async fn save_proposal(&mut self, proposal: &Proposal) -> HuddleResult<Proposal> {
        let stored = self
            .working
            .proposals
            .iter_mut()
            .find(|p| p.id == proposal.id)
            .ok_or_else(|| eyre!("no proposal row {}", proposal.id))?;
        *stored = proposal.clone();
        Ok(stored.clone())
    }

    async fn count_slots(&mut self, proposal_id: Uuid) -> HuddleResult<i64> {
        Ok(self.working.slot_count(proposal_id))
    }

    async fn find_claim(&mut self, proposal_id: Uuid, email: &str) -> HuddleResult<Option<Slot>> {
        Ok(self
            .working
            .slots
            .iter()
            .find(|s| s.proposal_id == proposal_id && s.email == email)
            .cloned())
    }

    async fn account_exists(&mut self, email: &str) -> HuddleResult<bool> {
        Ok(self.working.accounts.contains_key(&email.to_lowercase()))
    }

    async fn insert_slot(&mut self, slot: &NewSlot) -> HuddleResult<Slot> {
        let taken = self
            .working
            .slots
            .iter()
            .any(|s| s.proposal_id == slot.proposal_id && s.email == slot.email);
        if taken {
            return Err(Conflict::DuplicateClaim.into());
        }
        if self.working.proposal(slot.proposal_id).is_none() {
            return Err(eyre!("slot references missing proposal {}", slot.proposal_id).into());
        }

        let created = Slot {
            id: Uuid::new_v4(),
            proposal_id: slot.proposal_id,
            name: slot.name.clone(),
            email: slot.email.clone(),
            has_account: slot.has_account,
            claimed_at: Utc::now(),
        };
        self.working.slots.push(created.clone());
        Ok(created)
    }

    async fn lock_slot(&mut self, id: Uuid) -> HuddleResult<Option<Slot>> {
        Ok(self.working.slot(id).cloned())
    }

    async fn availability_for_slot(&mut self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityEntry>> {
        Ok(self.working.entries_for(slot_id))
    }

    async fn delete_availability(&mut self, slot_id: Uuid) -> HuddleResult<u64> {
        let before = self.working.entries.len();
        self.working.entries.retain(|e| e.slot_id != slot_id);
        Ok((before - self.working.entries.len()) as u64)
    }

    async fn insert_availability(
        &mut self,
        slot_id: Uuid,
        day: &DayAvailability,
    ) -> HuddleResult<AvailabilityEntry> {
        let duplicate = self
            .working
            .entries
            .iter()
            .any(|e| e.slot_id == slot_id && e.date == day.date);
        if duplicate {
            return Err(eyre!("duplicate entry for slot {} on {}", slot_id, day.date).into());
        }

        let entry = AvailabilityEntry {
            id: Uuid::new_v4(),
            slot_id,
            date: day.date,
            busy_times: day.busy_times.clone(),
            created_at: Utc::now(),
        };
        self.working.entries.push(entry.clone());
        Ok(entry)
    }

    async fn append_history(
        &mut self,
        record: &NewHistoryRecord,
    ) -> HuddleResult<AvailabilityHistoryRecord> {
        if self.faults.history_writes.load(Ordering::SeqCst) {
            return Err(eyre!("history write failed for slot {}", record.slot_id).into());
        }

        let stored = AvailabilityHistoryRecord {
            id: Uuid::new_v4(),
            slot_id: record.slot_id,
            date: record.date,
            busy_times: record.busy_times.clone(),
            action: record.action,
            changed_at: Utc::now(),
        };
        self.working.history.push(stored.clone());
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> HuddleResult<()> {
        if self.faults.commits.load(Ordering::SeqCst) {
            return Err(eyre!("commit failed").into());
        }

        let MemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}
