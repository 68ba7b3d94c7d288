use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Failure kinds surfaced to callers. A shortage is never an error: partial
/// fulfillment is reported through [`crate::types::AllocationOutcome`].
#[derive(Debug, Error)]
pub enum StockError {
    #[error("article {0} is not known to the article directory")]
    ArticleNotFound(Uuid),
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),
    #[error("lot {0} not found")]
    LotNotFound(Uuid),
    #[error("lot {lot_id} is in an invalid state: {reason}")]
    InvalidState { lot_id: Uuid, reason: String },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StockError>;
