use crate::models::DbAvailabilityEntry;
use chrono::Utc;
use eyre::Result;
use huddle_core::models::slot::DayAvailability;
use sqlx::{postgres::PgExecutor, types::Json};
use uuid::Uuid;

pub async fn create_entry<'e, E>(
    executor: E,
    slot_id: Uuid,
    day: &DayAvailability,
) -> Result<DbAvailabilityEntry>
where
    E: PgExecutor<'e>,
{
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbAvailabilityEntry>(
        r#"
        INSERT INTO availability_entries (id, slot_id, date, busy_times, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, slot_id, date, busy_times, created_at
        "#,
    )
    .bind(id)
    .bind(slot_id)
    .bind(day.date)
    .bind(Json(&day.busy_times))
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn get_entries_by_slot_id<'e, E>(
    executor: E,
    slot_id: Uuid,
) -> Result<Vec<DbAvailabilityEntry>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DbAvailabilityEntry>(
        r#"
        SELECT id, slot_id, date, busy_times, created_at
        FROM availability_entries
        WHERE slot_id = $1
        ORDER BY date ASC
        "#,
    )
    .bind(slot_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Entries of every slot on a proposal, fetched in one round trip.
pub async fn get_entries_by_proposal_id<'e, E>(
    executor: E,
    proposal_id: Uuid,
) -> Result<Vec<DbAvailabilityEntry>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DbAvailabilityEntry>(
        r#"
        SELECT e.id, e.slot_id, e.date, e.busy_times, e.created_at
        FROM availability_entries e
        JOIN slots s ON s.id = e.slot_id
        WHERE s.proposal_id = $1
        ORDER BY e.slot_id, e.date ASC
        "#,
    )
    .bind(proposal_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn delete_entries_by_slot_id<'e, E>(executor: E, slot_id: Uuid) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM availability_entries
        WHERE slot_id = $1
        "#,
    )
    .bind(slot_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
