use super::StockManager;
use crate::error::{Result, StockError};
use crate::store::{ArticleDirectory, LotStore};
use crate::types::{Lot, Movement, OnHandAudit, StockSummary};
use rust_decimal::Decimal;
use tracing::{trace, warn};
use uuid::Uuid;

impl<S: LotStore, A: ArticleDirectory> StockManager<S, A> {
    /// Per-article totals and lot breakdown. Pure read; an article with no
    /// lots (or one unknown to the directory) yields an empty summary.
    #[tracing::instrument(skip(self), fields(%article_id))]
    pub async fn summarize(&self, article_id: Uuid) -> Result<StockSummary> {
        trace!("Summarizing article");
        let mut lots = self.store.lots_for_article(article_id).await?;
        lots.retain(|lot| lot.active);
        Ok(StockSummary::from_lots(article_id, &lots))
    }

    /// Compares the collaborator's on-hand figure with the lot ledger. Any
    /// divergence is a data-integrity defect: it is reported (and logged),
    /// never corrected here.
    #[tracing::instrument(skip(self), fields(%article_id, %reported_quantity))]
    pub async fn audit_on_hand(
        &self,
        article_id: Uuid,
        reported_quantity: Decimal,
    ) -> Result<OnHandAudit> {
        let lots = self.store.lots_for_article(article_id).await?;
        let ledger_quantity = lots
            .iter()
            .filter(|lot| lot.active)
            .fold(Decimal::ZERO, |total, lot| total + lot.current_quantity);
        let audit = OnHandAudit {
            article_id,
            ledger_quantity,
            reported_quantity,
            divergence: reported_quantity - ledger_quantity,
        };
        if !audit.is_consistent() {
            warn!(
                ledger = %audit.ledger_quantity,
                reported = %audit.reported_quantity,
                "On-hand figure diverges from lot ledger"
            );
        }
        Ok(audit)
    }

    /// Point lookup for a single lot.
    #[tracing::instrument(skip(self), fields(%lot_id))]
    pub async fn lot(&self, lot_id: Uuid) -> Result<Lot> {
        self.store
            .lot(lot_id)
            .await?
            .ok_or(StockError::LotNotFound(lot_id))
    }

    /// The full audit trail of one lot, oldest first. Read surface for
    /// reporting collaborators.
    #[tracing::instrument(skip(self), fields(%lot_id))]
    pub async fn movement_history(&self, lot_id: Uuid) -> Result<Vec<Movement>> {
        self.store
            .lot(lot_id)
            .await?
            .ok_or(StockError::LotNotFound(lot_id))?;
        Ok(self.store.movements_for_lot(lot_id).await?)
    }
}
