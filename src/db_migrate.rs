use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use huddle_db::{DEFAULT_MAX_CONNECTIONS, create_pool, schema::initialize_database};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;

    info!("Connecting to database...");
    let db_pool = create_pool(&database_url, DEFAULT_MAX_CONNECTIONS).await?;

    initialize_database(&db_pool).await?;

    Ok(())
}
