use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::NoTls;
use tracing::{error, info};

pub mod clock;
pub mod db;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod settings;
pub mod store;
pub mod types;
pub mod webserver;

pub use clock::{Clock, SystemClock};
pub use error::StockError;
pub use manager::StockManager;
pub use settings::Settings;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

pub async fn run(settings: Settings) -> Result<()> {
    info!("Starting stock-manager");
    let (mut client, connection) = tokio_postgres::connect(
        &format!("{}/{}", settings.database.url, settings.database.name),
        NoTls,
    )
    .await
    .context("Failed to connect to Postgres")?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Connection error: {}", e);
        }
    });
    embedded::migrations::runner()
        .run_async(&mut client)
        .await
        .context("Failed to run database migrations")?;

    let client = Arc::new(Mutex::new(client));
    let store = Arc::new(store::PgLotStore::new(client.clone()));
    let articles = Arc::new(store::PgArticleDirectory::new(client));
    let manager = Arc::new(StockManager::new(
        store,
        articles,
        Arc::new(SystemClock),
        settings.app.allocation_mode,
    ));
    webserver::run(settings.webserver.port, manager).await;
    Ok(())
}
