use eyre::{Result, WrapErr};
use sqlx::{Pool, Postgres};
use tracing::info;

const TABLES: &[(&str, &str)] = &[
    (
        "accounts",
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id UUID PRIMARY KEY,
            email VARCHAR(255) NOT NULL UNIQUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "proposals",
        r#"
        CREATE TABLE IF NOT EXISTS proposals (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title VARCHAR(255) NOT NULL,
            description TEXT NULL,
            date_range_start DATE NOT NULL,
            date_range_end DATE NOT NULL,
            creator_id UUID NOT NULL,
            num_slots INTEGER NOT NULL,
            status VARCHAR(50) NOT NULL DEFAULT 'active',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_date_range CHECK (date_range_start <= date_range_end),
            CONSTRAINT valid_num_slots CHECK (num_slots >= 1),
            CONSTRAINT valid_status CHECK (status IN ('active', 'cancelled'))
        );
        "#,
    ),
    (
        "slots",
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            proposal_id UUID NOT NULL REFERENCES proposals(id) ON DELETE CASCADE,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            has_account BOOLEAN NOT NULL DEFAULT FALSE,
            claimed_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT one_slot_per_email UNIQUE (proposal_id, email)
        );
        "#,
    ),
    (
        "availability_entries",
        r#"
        CREATE TABLE IF NOT EXISTS availability_entries (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            slot_id UUID NOT NULL REFERENCES slots(id) ON DELETE CASCADE,
            date DATE NOT NULL,
            busy_times JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT one_entry_per_date UNIQUE (slot_id, date)
        );
        "#,
    ),
    (
        "availability_history",
        r#"
        CREATE TABLE IF NOT EXISTS availability_history (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            seq BIGINT GENERATED ALWAYS AS IDENTITY,
            slot_id UUID NOT NULL REFERENCES slots(id) ON DELETE CASCADE,
            date DATE NOT NULL,
            busy_times JSONB NULL,
            action VARCHAR(50) NOT NULL,
            changed_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_action CHECK (action IN ('created', 'updated', 'deleted'))
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_proposals_creator_id ON proposals(creator_id)",
    "CREATE INDEX IF NOT EXISTS idx_proposals_created_at ON proposals(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_slots_proposal_id ON slots(proposal_id)",
    "CREATE INDEX IF NOT EXISTS idx_slots_email ON slots(email)",
    "CREATE INDEX IF NOT EXISTS idx_availability_entries_slot_id ON availability_entries(slot_id)",
    "CREATE INDEX IF NOT EXISTS idx_availability_history_slot_id ON availability_history(slot_id)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for (table, ddl) in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .wrap_err_with(|| format!("Failed to create table {}", table))?;
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
