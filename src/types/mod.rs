mod allocation;
mod lot;
mod movement;
mod summary;

pub use allocation::{
    eligibility_order, outstanding_reservations, plan_consumption, plan_reservation,
    AllocationMode, AllocationOutcome, AllocationPlan, Assignment, LotDraw,
};
pub use lot::{Lot, NewLot};
pub use movement::{Movement, MovementKind};
pub use summary::{LotBreakdown, OnHandAudit, StockSummary};
