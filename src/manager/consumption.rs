use super::StockManager;
use crate::error::{Result, StockError};
use crate::metrics::{ALLOCATED_QUANTITY, NUM_ALLOCATIONS, SHORTAGE_QUANTITY};
use crate::store::{ArticleDirectory, LotStore};
use crate::types::{
    outstanding_reservations, plan_consumption, AllocationOutcome, Assignment, Movement,
    MovementKind,
};
use rust_decimal::prelude::*;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

impl<S: LotStore, A: ArticleDirectory> StockManager<S, A> {
    /// Withdraws stock, oldest eligible lot first, splitting across lots
    /// until the request is satisfied or every eligible lot is drained.
    /// Irreversible: a mistaken consumption is compensated by a new entry,
    /// never rewound.
    ///
    /// Without a work order the draw is limited to unreserved quantity.
    /// With one, the order's own outstanding holds are consumed first and
    /// their drawdown is recorded as release movements next to the
    /// consumption movements.
    #[tracing::instrument(skip(self, reference_doc, actor, notes), fields(%article_id, %quantity))]
    pub async fn consume(
        &self,
        article_id: Uuid,
        quantity: Decimal,
        work_order_id: Option<Uuid>,
        reference_doc: Option<&str>,
        actor: &str,
        notes: Option<&str>,
    ) -> Result<AllocationOutcome> {
        debug!("Consuming stock");
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
        let own_holds = match work_order_id {
            Some(work_order_id) => {
                let movements = self.store.movements_for_work_order(work_order_id).await?;
                outstanding_reservations(&movements)
            }
            None => HashMap::new(),
        };
        let plan = plan_consumption(&lots, &own_holds, quantity);

        let mut updated = Vec::with_capacity(plan.draws.len());
        let mut movements = Vec::new();
        let mut assignments = Vec::with_capacity(plan.draws.len());
        for draw in plan.draws {
            let mut lot = draw.lot;
            lot.current_quantity -= draw.quantity;
            lot.reserved_quantity -= draw.from_reservation;
            movements.push(
                Movement::new(lot.id, MovementKind::Consumption, draw.quantity, as_of, actor)
                    .work_order(work_order_id)
                    .reference_doc(reference_doc)
                    .notes(notes),
            );
            if draw.from_reservation > Decimal::ZERO {
                movements.push(
                    Movement::new(lot.id, MovementKind::Release, draw.from_reservation, as_of, actor)
                        .work_order(work_order_id)
                        .notes(Some("reservation applied to consumption")),
                );
            }
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
        NUM_ALLOCATIONS.with_label_values(&["consumption"]).inc();
        ALLOCATED_QUANTITY
            .with_label_values(&["consumption"])
            .inc_by(outcome.assigned_quantity().to_f64().unwrap_or_default());
        if outcome.shortage > Decimal::ZERO {
            SHORTAGE_QUANTITY
                .with_label_values(&["consumption"])
                .inc_by(outcome.shortage.to_f64().unwrap_or_default());
            debug!(shortage = %outcome.shortage, "Consumption partially fulfilled");
        }
        Ok(outcome)
    }
}
