use super::{ArticleDirectory, LotStore};
use crate::db;
use crate::types::{AllocationMode, Lot, Movement};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::Client;
use uuid::Uuid;

/// [`LotStore`] backed by the service's postgres connection. `commit` runs
/// inside a transaction so the quantity mutation and its ledger entries are
/// inseparable.
pub struct PgLotStore {
    client: Arc<Mutex<Client>>,
}

impl PgLotStore {
    pub fn new(client: Arc<Mutex<Client>>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LotStore for PgLotStore {
    async fn insert_lot(&self, lot: &Lot) -> Result<()> {
        let client = self.client.lock().await;
        db::save_lot(&*client, lot)
            .await
            .context("Failed to save lot")
    }

    async fn lot(&self, id: Uuid) -> Result<Option<Lot>> {
        let client = self.client.lock().await;
        db::get_lot_by_id(&*client, id)
            .await
            .context("Failed to get lot")
    }

    async fn lots_for_article(&self, article_id: Uuid) -> Result<Vec<Lot>> {
        let client = self.client.lock().await;
        db::get_lots_by_article(&*client, article_id)
            .await
            .context("Failed to get lots")
    }

    async fn eligible_lots(
        &self,
        article_id: Uuid,
        mode: AllocationMode,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Lot>> {
        let client = self.client.lock().await;
        db::get_eligible_lots(&*client, article_id, mode, as_of)
            .await
            .context("Failed to get eligible lots")
    }

    async fn movements_for_lot(&self, lot_id: Uuid) -> Result<Vec<Movement>> {
        let client = self.client.lock().await;
        db::get_movements_by_lot(&*client, lot_id)
            .await
            .context("Failed to get movements")
    }

    async fn movements_for_work_order(&self, work_order_id: Uuid) -> Result<Vec<Movement>> {
        let client = self.client.lock().await;
        db::get_movements_by_work_order(&*client, work_order_id)
            .await
            .context("Failed to get movements")
    }

    async fn commit(&self, lots: &[Lot], movements: &[Movement]) -> Result<()> {
        let mut client = self.client.lock().await;
        let transaction = client
            .transaction()
            .await
            .context("Failed to open transaction")?;
        for lot in lots {
            db::update_lot(&transaction, lot)
                .await
                .context("Failed to update lot")?;
        }
        for movement in movements {
            db::save_movement(&transaction, movement)
                .await
                .context("Failed to save movement")?;
        }
        transaction
            .commit()
            .await
            .context("Failed to commit stock update")
    }
}

pub struct PgArticleDirectory {
    client: Arc<Mutex<Client>>,
}

impl PgArticleDirectory {
    pub fn new(client: Arc<Mutex<Client>>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleDirectory for PgArticleDirectory {
    async fn article_exists(&self, article_id: Uuid) -> Result<bool> {
        let client = self.client.lock().await;
        db::article_exists(&*client, article_id)
            .await
            .context("Failed to check article")
    }
}
