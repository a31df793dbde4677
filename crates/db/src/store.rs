//! PostgreSQL implementation of the core store traits.
//!
//! Each [`PgTransaction`] wraps one sqlx transaction. Row locks taken by
//! `lock_proposal` / `lock_slot` (`SELECT ... FOR UPDATE`) serialise
//! concurrent writers on the same proposal; the unique constraints in the
//! schema back the one-slot-per-email and one-entry-per-date invariants.
//! Dropping a `PgTransaction` without committing rolls it back.

use std::collections::HashMap;

use async_trait::async_trait;
use eyre::WrapErr;
use huddle_core::{
    errors::{Conflict, HuddleResult},
    models::{
        identity::Identity,
        proposal::{NewProposal, Proposal},
        slot::{
            AvailabilityEntry, AvailabilityHistoryRecord, DayAvailability, NewHistoryRecord,
            NewSlot, Slot, SlotAvailability,
        },
    },
    store::{SchedulingStore, StoreTransaction},
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::repositories;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

fn is_unique_violation(report: &eyre::Report) -> bool {
    matches!(
        report.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

#[async_trait]
impl SchedulingStore for PgStore {
    async fn begin(&self) -> HuddleResult<Box<dyn StoreTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .wrap_err("Failed to open transaction")?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn remember_account(&self, identity: &Identity) -> HuddleResult<()> {
        repositories::account::upsert_account(&self.pool, identity.user_id, &identity.email).await?;
        Ok(())
    }

    async fn insert_proposal(&self, proposal: &NewProposal) -> HuddleResult<Proposal> {
        let row = repositories::proposal::create_proposal(&self.pool, proposal).await?;
        Ok(Proposal::try_from(row)?)
    }

    async fn get_proposal(&self, id: Uuid) -> HuddleResult<Option<Proposal>> {
        let row = repositories::proposal::get_proposal_by_id(&self.pool, id).await?;
        Ok(row.map(Proposal::try_from).transpose()?)
    }

    async fn count_slots(&self, proposal_id: Uuid) -> HuddleResult<i64> {
        Ok(repositories::slot::count_slots_by_proposal_id(&self.pool, proposal_id).await?)
    }

    async fn list_created_by(&self, creator_id: Uuid) -> HuddleResult<Vec<Proposal>> {
        let rows = repositories::proposal::get_proposals_by_creator(&self.pool, creator_id).await?;
        Ok(rows
            .into_iter()
            .map(Proposal::try_from)
            .collect::<eyre::Result<_>>()?)
    }

    async fn list_responded_by(&self, identity: &Identity) -> HuddleResult<Vec<Proposal>> {
        let rows = repositories::proposal::get_proposals_responded_by(
            &self.pool,
            &identity.email,
            identity.user_id,
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(Proposal::try_from)
            .collect::<eyre::Result<_>>()?)
    }

    async fn get_slot(&self, id: Uuid) -> HuddleResult<Option<Slot>> {
        let row = repositories::slot::get_slot_by_id(&self.pool, id).await?;
        Ok(row.map(Slot::from))
    }

    async fn list_slots(&self, proposal_id: Uuid) -> HuddleResult<Vec<SlotAvailability>> {
        let slots = repositories::slot::get_slots_by_proposal_id(&self.pool, proposal_id).await?;
        let entries =
            repositories::availability::get_entries_by_proposal_id(&self.pool, proposal_id).await?;

        let mut by_slot: HashMap<Uuid, Vec<AvailabilityEntry>> = HashMap::new();
        for entry in entries {
            by_slot
                .entry(entry.slot_id)
                .or_default()
                .push(AvailabilityEntry::from(entry));
        }

        Ok(slots
            .into_iter()
            .map(|row| {
                let availability = by_slot.remove(&row.id).unwrap_or_default();
                SlotAvailability::new(Slot::from(row), availability)
            })
            .collect())
    }

    async fn availability_for_slot(&self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityEntry>> {
        let rows = repositories::availability::get_entries_by_slot_id(&self.pool, slot_id).await?;
        Ok(rows.into_iter().map(AvailabilityEntry::from).collect())
    }

    async fn history_for_slot(&self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityHistoryRecord>> {
        let rows = repositories::history::get_history_by_slot_id(&self.pool, slot_id).await?;
        Ok(rows
            .into_iter()
            .map(AvailabilityHistoryRecord::try_from)
            .collect::<eyre::Result<_>>()?)
    }
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn lock_proposal(&mut self, id: Uuid) -> HuddleResult<Option<Proposal>> {
        let row = repositories::proposal::lock_proposal_by_id(&mut *self.tx, id).await?;
        Ok(row.map(Proposal::try_from).transpose()?)
    }

    async fn save_proposal(&mut self, proposal: &Proposal) -> HuddleResult<Proposal> {
        let row = repositories::proposal::update_proposal(&mut *self.tx, proposal).await?;
        Ok(Proposal::try_from(row)?)
    }

    async fn count_slots(&mut self, proposal_id: Uuid) -> HuddleResult<i64> {
        Ok(repositories::slot::count_slots_by_proposal_id(&mut *self.tx, proposal_id).await?)
    }

    async fn find_claim(&mut self, proposal_id: Uuid, email: &str) -> HuddleResult<Option<Slot>> {
        let row = repositories::slot::get_slot_by_email(&mut *self.tx, proposal_id, email).await?;
        Ok(row.map(Slot::from))
    }

    async fn account_exists(&mut self, email: &str) -> HuddleResult<bool> {
        Ok(repositories::account::account_exists(&mut *self.tx, email).await?)
    }

    async fn insert_slot(&mut self, slot: &NewSlot) -> HuddleResult<Slot> {
        match repositories::slot::create_slot(&mut *self.tx, slot).await {
            Ok(row) => Ok(Slot::from(row)),
            Err(report) if is_unique_violation(&report) => Err(Conflict::DuplicateClaim.into()),
            Err(report) => Err(report.into()),
        }
    }

    async fn lock_slot(&mut self, id: Uuid) -> HuddleResult<Option<Slot>> {
        let row = repositories::slot::lock_slot_by_id(&mut *self.tx, id).await?;
        Ok(row.map(Slot::from))
    }

    async fn availability_for_slot(&mut self, slot_id: Uuid) -> HuddleResult<Vec<AvailabilityEntry>> {
        let rows = repositories::availability::get_entries_by_slot_id(&mut *self.tx, slot_id).await?;
        Ok(rows.into_iter().map(AvailabilityEntry::from).collect())
    }

    async fn delete_availability(&mut self, slot_id: Uuid) -> HuddleResult<u64> {
        Ok(repositories::availability::delete_entries_by_slot_id(&mut *self.tx, slot_id).await?)
    }

    async fn insert_availability(
        &mut self,
        slot_id: Uuid,
        day: &DayAvailability,
    ) -> HuddleResult<AvailabilityEntry> {
        let row = repositories::availability::create_entry(&mut *self.tx, slot_id, day).await?;
        Ok(AvailabilityEntry::from(row))
    }

    async fn append_history(
        &mut self,
        record: &NewHistoryRecord,
    ) -> HuddleResult<AvailabilityHistoryRecord> {
        let row = repositories::history::append_history(&mut *self.tx, record).await?;
        Ok(AvailabilityHistoryRecord::try_from(row)?)
    }

    async fn commit(self: Box<Self>) -> HuddleResult<()> {
        self.tx
            .commit()
            .await
            .wrap_err("Failed to commit transaction")?;
        Ok(())
    }
}
