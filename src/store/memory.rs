use super::{ArticleDirectory, LotStore};
use crate::types::{eligibility_order, AllocationMode, Lot, Movement};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    lots: HashMap<Uuid, Lot>,
    movements: Vec<Movement>,
}

/// In-process [`LotStore`] with the same ordering and atomicity semantics
/// as the postgres store. Used by the test suite and suitable for
/// ephemeral embedding; nothing survives the process.
#[derive(Default)]
pub struct MemoryLotStore {
    state: RwLock<MemoryState>,
}

impl MemoryLotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LotStore for MemoryLotStore {
    async fn insert_lot(&self, lot: &Lot) -> Result<()> {
        let mut state = self.state.write().await;
        state.lots.insert(lot.id, lot.clone());
        Ok(())
    }

    async fn lot(&self, id: Uuid) -> Result<Option<Lot>> {
        let state = self.state.read().await;
        Ok(state.lots.get(&id).cloned())
    }

    async fn lots_for_article(&self, article_id: Uuid) -> Result<Vec<Lot>> {
        let state = self.state.read().await;
        let mut lots: Vec<Lot> = state
            .lots
            .values()
            .filter(|lot| lot.article_id == article_id)
            .cloned()
            .collect();
        lots.sort_by(|a, b| eligibility_order(AllocationMode::Fifo, a, b));
        Ok(lots)
    }

    async fn eligible_lots(
        &self,
        article_id: Uuid,
        mode: AllocationMode,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Lot>> {
        let state = self.state.read().await;
        let mut lots: Vec<Lot> = state
            .lots
            .values()
            .filter(|lot| lot.article_id == article_id && lot.is_eligible())
            .filter(|lot| mode == AllocationMode::Fifo || !lot.is_expired(as_of))
            .cloned()
            .collect();
        lots.sort_by(|a, b| eligibility_order(mode, a, b));
        Ok(lots)
    }

    async fn movements_for_lot(&self, lot_id: Uuid) -> Result<Vec<Movement>> {
        let state = self.state.read().await;
        Ok(state
            .movements
            .iter()
            .filter(|movement| movement.lot_id == lot_id)
            .cloned()
            .collect())
    }

    async fn movements_for_work_order(&self, work_order_id: Uuid) -> Result<Vec<Movement>> {
        let state = self.state.read().await;
        Ok(state
            .movements
            .iter()
            .filter(|movement| movement.work_order_id == Some(work_order_id))
            .cloned()
            .collect())
    }

    async fn commit(&self, lots: &[Lot], movements: &[Movement]) -> Result<()> {
        let mut state = self.state.write().await;
        for lot in lots {
            state.lots.insert(lot.id, lot.clone());
        }
        state.movements.extend_from_slice(movements);
        Ok(())
    }
}

/// In-process stand-in for the article collaborator: knows exactly the
/// articles it was told about.
#[derive(Default)]
pub struct MemoryArticleDirectory {
    articles: RwLock<HashSet<Uuid>>,
}

impl MemoryArticleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, article_id: Uuid) {
        self.articles.write().await.insert(article_id);
    }
}

#[async_trait]
impl ArticleDirectory for MemoryArticleDirectory {
    async fn article_exists(&self, article_id: Uuid) -> Result<bool> {
        Ok(self.articles.read().await.contains(&article_id))
    }
}
