use super::Lot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Read-only per-article view composed from the lot store. Never on the
/// write path.
#[derive(Clone, Debug, Serialize)]
pub struct StockSummary {
    pub article_id: Uuid,
    pub total_current: Decimal,
    pub total_reserved: Decimal,
    pub total_available: Decimal,
    pub lots: Vec<LotBreakdown>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LotBreakdown {
    pub id: Uuid,
    pub lot_code: Option<String>,
    pub current_quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub available_quantity: Decimal,
    pub unit_cost: Decimal,
    pub entry_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl StockSummary {
    /// Folds the article's active lots; the breakdown lists only lots with
    /// remaining quantity, in the order the allocator would visit them.
    pub fn from_lots(article_id: Uuid, lots: &[Lot]) -> Self {
        let (total_current, total_reserved) =
            lots.iter().fold((Decimal::ZERO, Decimal::ZERO), |acc, lot| {
                (acc.0 + lot.current_quantity, acc.1 + lot.reserved_quantity)
            });
        let lots = lots
            .iter()
            .filter(|lot| lot.current_quantity > Decimal::ZERO)
            .map(|lot| LotBreakdown {
                id: lot.id,
                lot_code: lot.lot_code.clone(),
                current_quantity: lot.current_quantity,
                reserved_quantity: lot.reserved_quantity,
                available_quantity: lot.available(),
                unit_cost: lot.unit_cost,
                entry_date: lot.entry_date,
                expiry_date: lot.expiry_date,
            })
            .collect();
        Self {
            article_id,
            total_current,
            total_reserved,
            total_available: total_current - total_reserved,
            lots,
        }
    }
}

/// Result of comparing the collaborator-tracked on-hand figure against the
/// lot ledger. A divergence is reported, never corrected here.
#[derive(Clone, Debug, Serialize)]
pub struct OnHandAudit {
    pub article_id: Uuid,
    pub ledger_quantity: Decimal,
    pub reported_quantity: Decimal,
    pub divergence: Decimal,
}

impl OnHandAudit {
    pub fn is_consistent(&self) -> bool {
        self.divergence.is_zero()
    }
}
