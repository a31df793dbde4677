use crate::models::DbSlot;
use chrono::Utc;
use eyre::Result;
use huddle_core::models::slot::NewSlot;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

pub async fn create_slot<'e, E>(executor: E, slot: &NewSlot) -> Result<DbSlot>
where
    E: PgExecutor<'e>,
{
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbSlot>(
        r#"
        INSERT INTO slots (id, proposal_id, name, email, has_account, claimed_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, proposal_id, name, email, has_account, claimed_at
        "#,
    )
    .bind(id)
    .bind(slot.proposal_id)
    .bind(&slot.name)
    .bind(&slot.email)
    .bind(slot.has_account)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn get_slot_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbSlot>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, proposal_id, name, email, has_account, claimed_at
        FROM slots
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn lock_slot_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbSlot>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, proposal_id, name, email, has_account, claimed_at
        FROM slots
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn count_slots_by_proposal_id<'e, E>(executor: E, proposal_id: Uuid) -> Result<i64>
where
    E: PgExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM slots WHERE proposal_id = $1
        "#,
    )
    .bind(proposal_id)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

pub async fn get_slot_by_email<'e, E>(
    executor: E,
    proposal_id: Uuid,
    email: &str,
) -> Result<Option<DbSlot>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, proposal_id, name, email, has_account, claimed_at
        FROM slots
        WHERE proposal_id = $1 AND email = LOWER($2)
        "#,
    )
    .bind(proposal_id)
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_slots_by_proposal_id<'e, E>(executor: E, proposal_id: Uuid) -> Result<Vec<DbSlot>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, proposal_id, name, email, has_account, claimed_at
        FROM slots
        WHERE proposal_id = $1
        ORDER BY claimed_at ASC, id ASC
        "#,
    )
    .bind(proposal_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
