use crate::types::{AllocationMode, Lot, Movement};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::{MemoryArticleDirectory, MemoryLotStore};
pub use postgres::{PgArticleDirectory, PgLotStore};

/// Persistence seam for lots and the movement ledger. The store exclusively
/// owns the records; the service mutates them only through [`commit`],
/// which applies a batch of lot updates and ledger appends atomically.
///
/// [`commit`]: LotStore::commit
#[async_trait]
pub trait LotStore: Send + Sync {
    async fn insert_lot(&self, lot: &Lot) -> Result<()>;

    async fn lot(&self, id: Uuid) -> Result<Option<Lot>>;

    async fn lots_for_article(&self, article_id: Uuid) -> Result<Vec<Lot>>;

    /// Active lots with remaining quantity, in allocation order for `mode`.
    /// FEFO additionally excludes lots already expired at `as_of`.
    async fn eligible_lots(
        &self,
        article_id: Uuid,
        mode: AllocationMode,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Lot>>;

    async fn movements_for_lot(&self, lot_id: Uuid) -> Result<Vec<Movement>>;

    async fn movements_for_work_order(&self, work_order_id: Uuid) -> Result<Vec<Movement>>;

    /// All-or-nothing: either every lot update and every movement lands, or
    /// none do.
    async fn commit(&self, lots: &[Lot], movements: &[Movement]) -> Result<()>;
}

/// Article existence checks are answered by a collaborator; this is its
/// boundary.
#[async_trait]
pub trait ArticleDirectory: Send + Sync {
    async fn article_exists(&self, article_id: Uuid) -> Result<bool>;
}
