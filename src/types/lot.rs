use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tokio_postgres::Row;
use tracing::trace;
use uuid::Uuid;

/// A batch of stock received at one point in time, tracked independently so
/// withdrawals can be ordered by entry date (FIFO) or expiry date (FEFO).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Lot {
    pub id: Uuid,
    pub article_id: Uuid,
    pub lot_code: Option<String>,
    pub entry_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub initial_quantity: Decimal,
    pub current_quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub source_doc: Option<String>,
    pub supplier_ref: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub active: bool,
}

/// Parameters for a new stock entry. Everything else on [`Lot`] is derived
/// at creation time and owned by the store afterwards.
#[derive(Clone, Debug, Deserialize)]
pub struct NewLot {
    pub article_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub lot_code: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub source_doc: Option<String>,
    pub supplier_ref: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl Lot {
    #[tracing::instrument(skip(new, entry_date, created_by), fields(article_id = %new.article_id))]
    pub fn new(new: NewLot, entry_date: DateTime<Utc>, created_by: &str) -> Self {
        trace!(quantity = %new.quantity, unit_cost = %new.unit_cost, %entry_date, "New Lot");
        Self {
            id: Uuid::new_v4(),
            article_id: new.article_id,
            lot_code: new.lot_code,
            entry_date,
            expiry_date: new.expiry_date,
            initial_quantity: new.quantity,
            current_quantity: new.quantity,
            reserved_quantity: Decimal::ZERO,
            unit_cost: new.unit_cost,
            total_cost: new.quantity * new.unit_cost,
            source_doc: new.source_doc,
            supplier_ref: new.supplier_ref,
            location: new.location,
            notes: new.notes,
            created_by: created_by.to_string(),
            active: true,
        }
    }

    /// Quantity not held by any reservation.
    pub fn available(&self) -> Decimal {
        self.current_quantity - self.reserved_quantity
    }

    pub fn is_expired(&self, as_of: DateTime<Utc>) -> bool {
        matches!(self.expiry_date, Some(expiry) if expiry <= as_of)
    }

    pub fn is_eligible(&self) -> bool {
        self.active && self.current_quantity > Decimal::ZERO
    }
}

impl TryFrom<Row> for Lot {
    type Error = tokio_postgres::Error;
    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            article_id: row.try_get("article_id")?,
            lot_code: row.try_get("lot_code")?,
            entry_date: row.try_get("entry_date")?,
            expiry_date: row.try_get("expiry_date")?,
            initial_quantity: row.try_get("initial_quantity")?,
            current_quantity: row.try_get("current_quantity")?,
            reserved_quantity: row.try_get("reserved_quantity")?,
            unit_cost: row.try_get("unit_cost")?,
            total_cost: row.try_get("total_cost")?,
            source_doc: row.try_get("source_doc")?,
            supplier_ref: row.try_get("supplier_ref")?,
            location: row.try_get("location")?,
            notes: row.try_get("notes")?,
            created_by: row.try_get("created_by")?,
            active: row.try_get("active")?,
        })
    }
}
