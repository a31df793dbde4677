use eyre::Result;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

pub async fn upsert_account<'e, E>(executor: E, user_id: Uuid, email: &str) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO accounts (id, email)
        VALUES ($1, LOWER($2))
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(email)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn account_exists<'e, E>(executor: E, email: &str) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM accounts WHERE email = LOWER($1)
        )
        "#,
    )
    .bind(email)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}
