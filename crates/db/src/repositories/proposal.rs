use crate::models::DbProposal;
use chrono::Utc;
use eyre::Result;
use huddle_core::models::proposal::{NewProposal, Proposal};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

pub async fn create_proposal<'e, E>(executor: E, proposal: &NewProposal) -> Result<DbProposal>
where
    E: PgExecutor<'e>,
{
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating proposal: id={}, creator_id={}, num_slots={}",
        id, proposal.creator_id, proposal.num_slots
    );

    let row = sqlx::query_as::<_, DbProposal>(
        r#"
        INSERT INTO proposals
            (id, title, description, date_range_start, date_range_end, creator_id, num_slots, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', $8)
        RETURNING id, title, description, date_range_start, date_range_end, creator_id, num_slots, status, created_at
        "#,
    )
    .bind(id)
    .bind(&proposal.title)
    .bind(&proposal.description)
    .bind(proposal.date_range_start)
    .bind(proposal.date_range_end)
    .bind(proposal.creator_id)
    .bind(proposal.num_slots)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn get_proposal_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbProposal>>
where
    E: PgExecutor<'e>,
{
    tracing::debug!("Getting proposal by id: {}", id);

    let row = sqlx::query_as::<_, DbProposal>(
        r#"
        SELECT id, title, description, date_range_start, date_range_end, creator_id, num_slots, status, created_at
        FROM proposals
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Same as [`get_proposal_by_id`] but takes a row lock that is held until the
/// surrounding transaction ends. Concurrent claims on one proposal queue here.
pub async fn lock_proposal_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbProposal>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DbProposal>(
        r#"
        SELECT id, title, description, date_range_start, date_range_end, creator_id, num_slots, status, created_at
        FROM proposals
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn update_proposal<'e, E>(executor: E, proposal: &Proposal) -> Result<DbProposal>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DbProposal>(
        r#"
        UPDATE proposals
        SET title = $2,
            description = $3,
            date_range_start = $4,
            date_range_end = $5,
            num_slots = $6,
            status = $7
        WHERE id = $1
        RETURNING id, title, description, date_range_start, date_range_end, creator_id, num_slots, status, created_at
        "#,
    )
    .bind(proposal.id)
    .bind(&proposal.title)
    .bind(&proposal.description)
    .bind(proposal.date_range_start)
    .bind(proposal.date_range_end)
    .bind(proposal.num_slots)
    .bind(proposal.status.as_str())
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn get_proposals_by_creator<'e, E>(executor: E, creator_id: Uuid) -> Result<Vec<DbProposal>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DbProposal>(
        r#"
        SELECT id, title, description, date_range_start, date_range_end, creator_id, num_slots, status, created_at
        FROM proposals
        WHERE creator_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(creator_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn get_proposals_responded_by<'e, E>(
    executor: E,
    email: &str,
    user_id: Uuid,
) -> Result<Vec<DbProposal>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DbProposal>(
        r#"
        SELECT DISTINCT p.id, p.title, p.description, p.date_range_start, p.date_range_end,
               p.creator_id, p.num_slots, p.status, p.created_at
        FROM proposals p
        JOIN slots s ON s.proposal_id = p.id
        WHERE s.email = LOWER($1)
          AND p.creator_id <> $2
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(email)
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
