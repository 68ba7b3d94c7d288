use crate::clock::Clock;
use crate::error::{Result, StockError};
use crate::store::{ArticleDirectory, LotStore};
use crate::types::{AllocationMode, Lot, NewLot};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

mod consumption;
mod priority;
mod reservations;
mod summary;

/// The stock service. Holds only injected dependencies (store, article
/// directory, clock, allocation mode) so isolated instances can run in
/// parallel; all lot mutation in the process goes through one of its
/// operations, which is what makes the movement ledger complete.
pub struct StockManager<S, A> {
    store: Arc<S>,
    articles: Arc<A>,
    clock: Arc<dyn Clock>,
    mode: AllocationMode,
    article_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S: LotStore, A: ArticleDirectory> StockManager<S, A> {
    pub fn new(store: Arc<S>, articles: Arc<A>, clock: Arc<dyn Clock>, mode: AllocationMode) -> Self {
        Self {
            store,
            articles,
            clock,
            mode,
            article_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    /// Records a stock entry. The created lot's quantities and costs are
    /// fixed here; afterwards only the allocation operations may touch it.
    #[tracing::instrument(skip(self, new), fields(article_id = %new.article_id, quantity = %new.quantity))]
    pub async fn create_lot(&self, new: NewLot, actor: &str) -> Result<Lot> {
        debug!("Creating lot");
        if new.quantity <= Decimal::ZERO {
            return Err(StockError::InvalidQuantity(new.quantity));
        }
        self.ensure_article(new.article_id).await?;
        let _guard = self.lock_article(new.article_id).await;
        let lot = Lot::new(new, self.clock.now(), actor);
        self.store.insert_lot(&lot).await?;
        Ok(lot)
    }

    pub(super) async fn ensure_article(&self, article_id: Uuid) -> Result<()> {
        if self.articles.article_exists(article_id).await? {
            Ok(())
        } else {
            Err(StockError::ArticleNotFound(article_id))
        }
    }

    /// Per-article mutual exclusion: every mutating operation holds the
    /// lock of each article it touches for its whole read-plan-commit
    /// sequence, so two concurrent calls cannot both drain the same lot.
    pub(super) async fn lock_article(&self, article_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.article_locks.lock().await;
            locks
                .entry(article_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Locks several articles in sorted id order so cross-article callers
    /// (release) cannot deadlock against each other.
    pub(super) async fn lock_articles(&self, mut article_ids: Vec<Uuid>) -> Vec<OwnedMutexGuard<()>> {
        article_ids.sort();
        article_ids.dedup();
        let mut guards = Vec::with_capacity(article_ids.len());
        for article_id in article_ids {
            guards.push(self.lock_article(article_id).await);
        }
        guards
    }
}
