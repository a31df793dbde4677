//! Storage boundary for the scheduling core.
//!
//! The core never talks to a database directly. Reads go through
//! [`SchedulingStore`]; every multi-row write opens a [`StoreTransaction`],
//! performs its checks and inserts through it, and commits. A transaction
//! that is dropped without [`StoreTransaction::commit`] must leave no trace.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::HuddleResult;
use crate::models::{
    identity::Identity,
    proposal::{NewProposal, Proposal},
    slot::{
        AvailabilityEntry, AvailabilityHistoryRecord, DayAvailability, NewHistoryRecord, NewSlot,
        Slot, SlotAvailability,
    },
};

#[async_trait]
pub trait SchedulingStore: Send + Sync {
    /// Opens a transaction. Writes become visible only after `commit`.
    async fn begin(&self) -> HuddleResult<Box<dyn StoreTransaction>>;

    /// Records that `identity` holds a registered account. Idempotent.
    async fn remember_account(&self, identity: &Identity) -> HuddleResult<()>;

    async fn insert_proposal(&self, proposal: &NewProposal) -> HuddleResult<Proposal>;

    async fn get_proposal(&self, id: Uuid) -> HuddleResult<Option<Proposal>>;

    async fn count_slots(&self, proposal_id: Uuid) -> HuddleResult<i64>;

    /// Proposals created by `creator_id`, newest first.
    async fn list_created_by(&self, creator_id: Uuid) -> HuddleResult<Vec<Proposal>>;

    /// Proposals holding a slot claimed by `identity.email` whose creator is
    /// someone else, newest first.
    async fn list_responded_by(&self, identity: &Identity) -> HuddleResult<Vec<Proposal>>;

    async fn get_slot(&self, id: Uuid) -> HuddleResult<Option<Slot>>;

    /// Slots of a proposal in claim order, each with its current entries.
    async fn list_slots(&self, proposal_id: Uuid) -> HuddleResult<Vec<SlotAvailability>>;

    async fn availability_for_slot(&self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityEntry>>;

    /// History of a slot in the order it was appended.
    async fn history_for_slot(&self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityHistoryRecord>>;
}

#[async_trait]
pub trait StoreTransaction: Send {
    /// Reads a proposal and holds it against concurrent writers until the
    /// transaction ends.
    async fn lock_proposal(&mut self, id: Uuid) -> HuddleResult<Option<Proposal>>;

    async fn save_proposal(&mut self, proposal: &Proposal) -> HuddleResult<Proposal>;

    async fn count_slots(&mut self, proposal_id: Uuid) -> HuddleResult<i64>;

    async fn find_claim(&mut self, proposal_id: Uuid, email: &str) -> HuddleResult<Option<Slot>>;

    async fn account_exists(&mut self, email: &str) -> HuddleResult<bool>;

    async fn insert_slot(&mut self, slot: &NewSlot) -> HuddleResult<Slot>;

    /// Reads a slot and holds it against concurrent writers until the
    /// transaction ends.
    async fn lock_slot(&mut self, id: Uuid) -> HuddleResult<Option<Slot>>;

    async fn availability_for_slot(&mut self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityEntry>>;

    /// Deletes every entry of the slot and returns how many were removed.
    async fn delete_availability(&mut self, slot_id: Uuid) -> HuddleResult<u64>;

    async fn insert_availability(
        &mut self,
        slot_id: Uuid,
        day: &DayAvailability,
    ) -> HuddleResult<AvailabilityEntry>;

    async fn append_history(
        &mut self,
        record: &NewHistoryRecord,
    ) -> HuddleResult<AvailabilityHistoryRecord>;

    async fn commit(self: Box<Self>) -> HuddleResult<()>;
}
