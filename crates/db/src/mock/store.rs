use async_trait::async_trait;
use huddle_core::{
    errors::HuddleResult,
    models::{
        identity::Identity,
        proposal::{NewProposal, Proposal},
        slot::{AvailabilityEntry, AvailabilityHistoryRecord, Slot, SlotAvailability},
    },
    store::{SchedulingStore, StoreTransaction},
};
use mockall::mock;
use uuid::Uuid;

// Mock store for handler tests that need to force a failure or assert that
// the store was never reached.
mock! {
    pub Store {}

    #[async_trait]
    impl SchedulingStore for Store {
        async fn begin(&self) -> HuddleResult<Box<dyn StoreTransaction>>;

        async fn remember_account(&self, identity: &Identity) -> HuddleResult<()>;

        async fn insert_proposal(&self, proposal: &NewProposal) -> HuddleResult<Proposal>;

        async fn get_proposal(&self, id: Uuid) -> HuddleResult<Option<Proposal>>;

        async fn count_slots(&self, proposal_id: Uuid) -> HuddleResult<i64>;

        async fn list_created_by(&self, creator_id: Uuid) -> HuddleResult<Vec<Proposal>>;

        async fn list_responded_by(&self, identity: &Identity) -> HuddleResult<Vec<Proposal>>;

        async fn get_slot(&self, id: Uuid) -> HuddleResult<Option<Slot>>;

        async fn list_slots(&self, proposal_id: Uuid) -> HuddleResult<Vec<SlotAvailability>>;

        async fn availability_for_slot(&self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityEntry>>;

        async fn history_for_slot(&self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityHistoryRecord>>;
    }
}
