use crate::models::DbHistoryRecord;
use chrono::Utc;
use eyre::Result;
use huddle_core::models::slot::NewHistoryRecord;
use sqlx::{postgres::PgExecutor, types::Json};
use uuid::Uuid;

/// History is append-only: this module offers no update or delete.
pub async fn append_history<'e, E>(executor: E, record: &NewHistoryRecord) -> Result<DbHistoryRecord>
where
    E: PgExecutor<'e>,
{
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbHistoryRecord>(
        r#"
        INSERT INTO availability_history (id, slot_id, date, busy_times, action, changed_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, slot_id, date, busy_times, action, changed_at
        "#,
    )
    .bind(id)
    .bind(record.slot_id)
    .bind(record.date)
    .bind(Json(&record.busy_times))
    .bind(record.action.as_str())
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn get_history_by_slot_id<'e, E>(executor: E, slot_id: Uuid) -> Result<Vec<DbHistoryRecord>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DbHistoryRecord>(
        r#"
        SELECT id, slot_id, date, busy_times, action, changed_at
        FROM availability_history
        WHERE slot_id = $1
        ORDER BY seq ASC
        "#,
    )
    .bind(slot_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
