use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tokio_postgres::Row;
use tracing::trace;
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[serde(rename_all = "snake_case")]
#[postgres(name = "movement_kind")]
pub enum MovementKind {
    #[postgres(name = "consumption")]
    Consumption,
    #[postgres(name = "reservation")]
    Reservation,
    #[postgres(name = "release")]
    Release,
    #[postgres(name = "priority_adjustment")]
    PriorityAdjustment,
    #[postgres(name = "location_adjustment")]
    LocationAdjustment,
}

/// One entry in the append-only audit ledger. Written exactly once, never
/// updated or deleted; metadata-only kinds carry a zero quantity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub reference_doc: Option<String>,
    pub work_order_id: Option<Uuid>,
    pub actor: String,
    pub notes: Option<String>,
}

impl Movement {
    #[tracing::instrument(skip(lot_id, quantity, occurred_at, actor))]
    pub fn new(
        lot_id: Uuid,
        kind: MovementKind,
        quantity: Decimal,
        occurred_at: DateTime<Utc>,
        actor: &str,
    ) -> Self {
        trace!(%lot_id, ?kind, %quantity, "New Movement");
        Self {
            id: Uuid::new_v4(),
            lot_id,
            kind,
            quantity,
            occurred_at,
            reference_doc: None,
            work_order_id: None,
            actor: actor.to_string(),
            notes: None,
        }
    }

    pub fn reference_doc(mut self, reference_doc: Option<&str>) -> Self {
        self.reference_doc = reference_doc.map(str::to_string);
        self
    }

    pub fn work_order(mut self, work_order_id: Option<Uuid>) -> Self {
        self.work_order_id = work_order_id;
        self
    }

    pub fn notes(mut self, notes: Option<&str>) -> Self {
        self.notes = notes.map(str::to_string);
        self
    }
}

impl TryFrom<Row> for Movement {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            lot_id: row.try_get("lot_id")?,
            kind: row.try_get("kind")?,
            quantity: row.try_get("quantity")?,
            occurred_at: row.try_get("occurred_at")?,
            reference_doc: row.try_get("reference_doc")?,
            work_order_id: row.try_get("work_order_id")?,
            actor: row.try_get("actor")?,
            notes: row.try_get("notes")?,
        })
    }
}
