use anyhow::anyhow;
use dotenvy::dotenv;
use log::{info, warn};
use std::sync::Arc;

use addressbook::api_router::api_router;
use addressbook::config::AppConfig;
use addressbook::contacts::{MemoryContactRepository, PgContactRepository, SharedRepository};
use addressbook::shared::state::AppState;
use addressbook::shared::utils::{create_conn, run_migrations};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env()?;

    let repository: SharedRepository = match &config.database {
        Some(database) => {
            info!("Connecting to database (pool size {})", database.pool_size);
            let pool = create_conn(database).map_err(|e| anyhow!("Failed to create database pool: {e}"))?;
            let migration_pool = pool.clone();
            tokio::task::spawn_blocking(move || run_migrations(&migration_pool))
                .await?
                .map_err(|e| anyhow!("Failed to run migrations: {e}"))?;
            Arc::new(PgContactRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; contacts are kept in memory and lost on exit");
            Arc::new(MemoryContactRepository::new())
        }
    };

    let app = api_router(Arc::new(AppState::new(repository)));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Address book listening on http://{address}");
    axum::serve(listener, app).await?;

    Ok(())
}
