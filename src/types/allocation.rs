use super::{Lot, Movement, MovementKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

/// Which ordering discipline governs lot selection.
///
/// `Fifo` reproduces the legacy selection: active lots with remaining
/// quantity, oldest entry first, regardless of expiry. `Fefo` orders by
/// expiry (never-expiring lots last) and skips lots that have already
/// expired at the allocation instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    Fifo,
    Fefo,
}

/// Total, deterministic ordering of eligible lots: the mode key first, then
/// entry date, then lot id as the final tie-break.
pub fn eligibility_order(mode: AllocationMode, a: &Lot, b: &Lot) -> Ordering {
    let key = match mode {
        AllocationMode::Fifo => Ordering::Equal,
        AllocationMode::Fefo => match (a.expiry_date, b.expiry_date) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => left.cmp(&right),
        },
    };
    key.then(a.entry_date.cmp(&b.entry_date))
        .then(a.id.cmp(&b.id))
}

/// One planned draw against a single lot. `from_reservation` is the portion
/// taken out of the requesting work order's own outstanding hold.
#[derive(Clone, Debug, PartialEq)]
pub struct LotDraw {
    pub lot: Lot,
    pub quantity: Decimal,
    pub from_reservation: Decimal,
}

#[derive(Clone, Debug)]
pub struct AllocationPlan {
    pub draws: Vec<LotDraw>,
    pub shortage: Decimal,
}

/// Quantity actually assigned to one lot, with the lot state after the
/// operation was applied.
#[derive(Clone, Debug, Serialize)]
pub struct Assignment {
    pub lot: Lot,
    pub quantity: Decimal,
}

#[derive(Clone, Debug, Serialize)]
pub struct AllocationOutcome {
    pub assignments: Vec<Assignment>,
    pub shortage: Decimal,
}

impl AllocationOutcome {
    pub fn empty() -> Self {
        Self {
            assignments: Vec::new(),
            shortage: Decimal::ZERO,
        }
    }

    pub fn assigned_quantity(&self) -> Decimal {
        self.assignments
            .iter()
            .fold(Decimal::ZERO, |total, assignment| total + assignment.quantity)
    }
}

/// Greedy reservation plan: walk the (already ordered) lots and hold
/// unreserved quantity until the request is satisfied. The remainder is the
/// shortage, a normal outcome the caller must handle.
pub fn plan_reservation(lots: &[Lot], requested: Decimal) -> AllocationPlan {
    let mut remaining = requested;
    let mut draws = Vec::new();
    for lot in lots {
        if remaining.is_zero() {
            break;
        }
        let take = remaining.min(lot.available());
        if take > Decimal::ZERO {
            draws.push(LotDraw {
                lot: lot.clone(),
                quantity: take,
                from_reservation: Decimal::ZERO,
            });
            remaining -= take;
        }
    }
    AllocationPlan {
        draws,
        shortage: remaining,
    }
}

/// Greedy consumption plan. A lot's consumable quantity is its unreserved
/// remainder plus whatever the requesting work order still holds on it, so
/// reserve-then-consume drains the order's own hold (reservation-first)
/// while other orders' holds stay untouched.
pub fn plan_consumption(
    lots: &[Lot],
    own_holds: &HashMap<Uuid, Decimal>,
    requested: Decimal,
) -> AllocationPlan {
    let mut remaining = requested;
    let mut draws = Vec::new();
    for lot in lots {
        if remaining.is_zero() {
            break;
        }
        let own_hold = own_holds
            .get(&lot.id)
            .copied()
            .unwrap_or(Decimal::ZERO)
            .min(lot.reserved_quantity);
        let take = remaining.min(lot.available() + own_hold);
        if take > Decimal::ZERO {
            draws.push(LotDraw {
                lot: lot.clone(),
                quantity: take,
                from_reservation: take.min(own_hold),
            });
            remaining -= take;
        }
    }
    AllocationPlan {
        draws,
        shortage: remaining,
    }
}

/// Per-lot quantity a work order still holds, derived from its ledger
/// slice: reservations minus releases.
pub fn outstanding_reservations(movements: &[Movement]) -> HashMap<Uuid, Decimal> {
    let mut by_lot: HashMap<Uuid, Decimal> = HashMap::new();
    for movement in movements {
        let delta = match movement.kind {
            MovementKind::Reservation => movement.quantity,
            MovementKind::Release => -movement.quantity,
            _ => continue,
        };
        *by_lot.entry(movement.lot_id).or_insert(Decimal::ZERO) += delta;
    }
    by_lot.retain(|_, quantity| *quantity > Decimal::ZERO);
    by_lot
}
