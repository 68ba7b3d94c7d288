use super::StockManager;
use crate::error::{Result, StockError};
use crate::metrics::{ALLOCATED_QUANTITY, NUM_ALLOCATIONS, SHORTAGE_QUANTITY};
use crate::store::{ArticleDirectory, LotStore};
use crate::types::{
    outstanding_reservations, plan_reservation, AllocationOutcome, Assignment, Movement,
    MovementKind,
};
use rust_decimal::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

impl<S: LotStore, A: ArticleDirectory> StockManager<S, A> {
    /// Places a hold on available quantity in allocation order. Holds do
    /// not reduce on-hand stock; they are drained by consumption against
    /// the same work order or released.
    #[tracing::instrument(skip(self, reference_doc, actor, notes), fields(%article_id, %quantity, %work_order_id))]
    pub async fn reserve(
        &self,
        article_id: Uuid,
        quantity: Decimal,
        work_order_id: Uuid,
        reference_doc: Option<&str>,
        actor: &str,
        notes: Option<&str>,
    ) -> Result<AllocationOutcome> {
        debug!("Reserving stock");
        if quantity < Decimal::ZERO {
            return Err(StockError::InvalidQuantity(quantity));
        }
        self.ensure_article(article_id).await?;
        if quantity.is_zero() {
            return Ok(AllocationOutcome::empty());
        }

        let _guard = self.lock_article(article_id).await;
        let as_of = self.clock.now();
        let lots = self.store.eligible_lots(article_id, self.mode, as_of).await?;
        let plan = plan_reservation(&lots, quantity);

        let mut updated = Vec::with_capacity(plan.draws.len());
        let mut movements = Vec::with_capacity(plan.draws.len());
        let mut assignments = Vec::with_capacity(plan.draws.len());
        for draw in plan.draws {
            let mut lot = draw.lot;
            lot.reserved_quantity += draw.quantity;
            movements.push(
                Movement::new(lot.id, MovementKind::Reservation, draw.quantity, as_of, actor)
                    .work_order(Some(work_order_id))
                    .reference_doc(reference_doc)
                    .notes(notes),
            );
            assignments.push(Assignment {
                lot: lot.clone(),
                quantity: draw.quantity,
            });
            updated.push(lot);
        }
        self.store.commit(&updated, &movements).await?;

        let outcome = AllocationOutcome {
            assignments,
            shortage: plan.shortage,
        };
        NUM_ALLOCATIONS.with_label_values(&["reservation"]).inc();
        ALLOCATED_QUANTITY
            .with_label_values(&["reservation"])
            .inc_by(outcome.assigned_quantity().to_f64().unwrap_or_default());
        if outcome.shortage > Decimal::ZERO {
            SHORTAGE_QUANTITY
                .with_label_values(&["reservation"])
                .inc_by(outcome.shortage.to_f64().unwrap_or_default());
            debug!(shortage = %outcome.shortage, "Reservation partially fulfilled");
        }
        Ok(outcome)
    }

    /// Releases whatever the work order still holds, lot by lot. Calling
    /// this for a work order with nothing outstanding is a no-op returning
    /// an empty list.
    #[tracing::instrument(skip(self, actor, notes), fields(%work_order_id))]
    pub async fn release(
        &self,
        work_order_id: Uuid,
        actor: &str,
        notes: Option<&str>,
    ) -> Result<Vec<Assignment>> {
        debug!("Releasing reservations");
        let movements = self.store.movements_for_work_order(work_order_id).await?;
        let outstanding = outstanding_reservations(&movements);
        if outstanding.is_empty() {
            return Ok(Vec::new());
        }

        let known_lots: HashSet<Uuid> = outstanding.keys().copied().collect();
        let mut article_ids = Vec::with_capacity(known_lots.len());
        for lot_id in &known_lots {
            if let Some(lot) = self.store.lot(*lot_id).await? {
                article_ids.push(lot.article_id);
            }
        }
        let _guards = self.lock_articles(article_ids).await;

        // Re-derive the outstanding holds now that the locks are held, so a
        // concurrent release of the same work order stays idempotent. Lots
        // reserved after the first read belong to articles we did not lock
        // and are left for a later call.
        let movements = self.store.movements_for_work_order(work_order_id).await?;
        let mut outstanding = outstanding_reservations(&movements);
        outstanding.retain(|lot_id, _| known_lots.contains(lot_id));

        let as_of = self.clock.now();
        let mut lot_ids: Vec<Uuid> = outstanding.keys().copied().collect();
        lot_ids.sort();

        let mut updated = Vec::with_capacity(lot_ids.len());
        let mut ledger = Vec::with_capacity(lot_ids.len());
        let mut released = Vec::with_capacity(lot_ids.len());
        for lot_id in lot_ids {
            let mut lot = match self.store.lot(lot_id).await? {
                Some(lot) => lot,
                None => {
                    warn!(%lot_id, "Reserved lot missing from store");
                    continue;
                }
            };
            let held = outstanding[&lot_id];
            if held > lot.reserved_quantity {
                warn!(%lot_id, %held, reserved = %lot.reserved_quantity, "Ledger and lot disagree on reserved quantity");
            }
            let quantity = held.min(lot.reserved_quantity);
            if quantity <= Decimal::ZERO {
                continue;
            }
            lot.reserved_quantity -= quantity;
            ledger.push(
                Movement::new(lot.id, MovementKind::Release, quantity, as_of, actor)
                    .work_order(Some(work_order_id))
                    .notes(notes),
            );
            released.push(Assignment {
                lot: lot.clone(),
                quantity,
            });
            updated.push(lot);
        }
        self.store.commit(&updated, &ledger).await?;
        Ok(released)
    }
}
