use super::StockManager;
use crate::error::{Result, StockError};
use crate::store::{ArticleDirectory, LotStore};
use crate::types::{AllocationMode, Lot, Movement, MovementKind};
use chrono::Duration;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

impl<S: LotStore, A: ArticleDirectory> StockManager<S, A> {
    /// Administrative FIFO override: backdates the lot's entry date to one
    /// second before the article's current allocation head, making it the
    /// next lot drawn. Quantities are untouched; the change is recorded as
    /// a zero-quantity movement carrying the original and new dates.
    #[tracing::instrument(skip(self, actor, notes), fields(%lot_id))]
    pub async fn prioritize(&self, lot_id: Uuid, actor: &str, notes: Option<&str>) -> Result<Lot> {
        debug!("Prioritizing lot");
        let lot = self
            .store
            .lot(lot_id)
            .await?
            .ok_or(StockError::LotNotFound(lot_id))?;
        let _guard = self.lock_article(lot.article_id).await;
        let mut lot = self
            .store
            .lot(lot_id)
            .await?
            .ok_or(StockError::LotNotFound(lot_id))?;
        if !lot.active {
            return Err(StockError::InvalidState {
                lot_id,
                reason: "lot is inactive".to_string(),
            });
        }
        if lot.current_quantity <= Decimal::ZERO {
            return Err(StockError::InvalidState {
                lot_id,
                reason: "lot is depleted".to_string(),
            });
        }

        let as_of = self.clock.now();
        let eligible = self
            .store
            .eligible_lots(lot.article_id, AllocationMode::Fifo, as_of)
            .await?;
        let head = eligible
            .first()
            .map(|oldest| oldest.entry_date)
            .unwrap_or(lot.entry_date);
        let original = lot.entry_date;
        lot.entry_date = head.min(original) - Duration::seconds(1);

        let note = match notes {
            Some(notes) => format!("entry date {} -> {}; {}", original, lot.entry_date, notes),
            None => format!("entry date {} -> {}", original, lot.entry_date),
        };
        let movement =
            Movement::new(lot.id, MovementKind::PriorityAdjustment, Decimal::ZERO, as_of, actor)
                .notes(Some(note.as_str()));
        self.store
            .commit(std::slice::from_ref(&lot), &[movement])
            .await?;
        Ok(lot)
    }

    /// Moves a lot to a different warehouse placement. Metadata only; the
    /// change is recorded as a zero-quantity movement.
    #[tracing::instrument(skip(self, actor, notes), fields(%lot_id, location))]
    pub async fn relocate(
        &self,
        lot_id: Uuid,
        location: &str,
        actor: &str,
        notes: Option<&str>,
    ) -> Result<Lot> {
        debug!("Relocating lot");
        let lot = self
            .store
            .lot(lot_id)
            .await?
            .ok_or(StockError::LotNotFound(lot_id))?;
        let _guard = self.lock_article(lot.article_id).await;
        let mut lot = self
            .store
            .lot(lot_id)
            .await?
            .ok_or(StockError::LotNotFound(lot_id))?;
        if !lot.active {
            return Err(StockError::InvalidState {
                lot_id,
                reason: "lot is inactive".to_string(),
            });
        }

        let previous = lot.location.take().unwrap_or_else(|| "unassigned".to_string());
        lot.location = Some(location.to_string());
        let note = match notes {
            Some(notes) => format!("location {} -> {}; {}", previous, location, notes),
            None => format!("location {} -> {}", previous, location),
        };
        let movement = Movement::new(
            lot.id,
            MovementKind::LocationAdjustment,
            Decimal::ZERO,
            self.clock.now(),
            actor,
        )
        .notes(Some(note.as_str()));
        self.store
            .commit(std::slice::from_ref(&lot), &[movement])
            .await?;
        Ok(lot)
    }
}
