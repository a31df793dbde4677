use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use huddle_api::config::ApiConfig;
use huddle_db::{PgStore, create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Schema creation is idempotent, so every start makes sure it exists.
    initialize_database(&db_pool).await?;

    huddle_api::start_server(config, Arc::new(PgStore::new(db_pool))).await?;

    Ok(())
}
