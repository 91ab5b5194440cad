//! Applies the Biz-Agent schema to `DATABASE_URL` and exits.

use bizagent_api::config::ApiConfig;
use bizagent_db::{create_pool, schema::initialize_database};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;
    bizagent_api::init_tracing(config.log_level)?;

    let pool = create_pool(&config.database_url).await?;
    initialize_database(&pool).await?;
    pool.close().await;

    info!("Schema is up to date");
    Ok(())
}
