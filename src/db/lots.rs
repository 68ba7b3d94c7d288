use crate::types::{AllocationMode, Lot};
use chrono::{DateTime, Utc};
use std::convert::TryInto;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

#[tracing::instrument(skip(client))]
pub async fn get_lot_by_id<T: GenericClient>(client: &T, id: Uuid) -> Result<Option<Lot>, Error> {
    trace!(%id, "Fetching lot");
    client
        .query_opt("SELECT * FROM lots WHERE id = $1", &[&id])
        .await?
        .map(TryInto::try_into)
        .transpose()
}

#[tracing::instrument(skip(client))]
pub async fn get_lots_by_article<T: GenericClient>(
    client: &T,
    article_id: Uuid,
) -> Result<Vec<Lot>, Error> {
    trace!(%article_id, "Fetching lots for article");
    client
        .query(
            "SELECT * FROM lots WHERE article_id = $1 ORDER BY entry_date, id",
            &[&article_id],
        )
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}

#[tracing::instrument(skip(client))]
pub async fn get_eligible_lots<T: GenericClient>(
    client: &T,
    article_id: Uuid,
    mode: AllocationMode,
    as_of: DateTime<Utc>,
) -> Result<Vec<Lot>, Error> {
    trace!(%article_id, ?mode, "Fetching eligible lots");
    let rows = match mode {
        AllocationMode::Fifo => {
            client
                .query(
                    "SELECT * FROM lots \
                     WHERE article_id = $1 AND active AND current_quantity > 0 \
                     ORDER BY entry_date, id",
                    &[&article_id],
                )
                .await?
        }
        AllocationMode::Fefo => {
            client
                .query(
                    "SELECT * FROM lots \
                     WHERE article_id = $1 AND active AND current_quantity > 0 \
                     AND (expiry_date IS NULL OR expiry_date > $2) \
                     ORDER BY expiry_date ASC NULLS LAST, entry_date, id",
                    &[&article_id, &as_of],
                )
                .await?
        }
    };
    rows.into_iter().map(TryInto::try_into).collect()
}

#[tracing::instrument(skip(client, lot))]
pub async fn save_lot<T: GenericClient>(client: &T, lot: &Lot) -> Result<(), Error> {
    trace!(id = %lot.id, "Saving lot");
    client
        .execute(
            "INSERT INTO lots (id, article_id, lot_code, entry_date, expiry_date, \
             initial_quantity, current_quantity, reserved_quantity, unit_cost, total_cost, \
             source_doc, supplier_ref, location, notes, created_by, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16);",
            &[
                &lot.id,
                &lot.article_id,
                &lot.lot_code,
                &lot.entry_date,
                &lot.expiry_date,
                &lot.initial_quantity,
                &lot.current_quantity,
                &lot.reserved_quantity,
                &lot.unit_cost,
                &lot.total_cost,
                &lot.source_doc,
                &lot.supplier_ref,
                &lot.location,
                &lot.notes,
                &lot.created_by,
                &lot.active,
            ],
        )
        .await?;
    Ok(())
}

#[tracing::instrument(skip(client, lot))]
pub async fn update_lot<T: GenericClient>(client: &T, lot: &Lot) -> Result<(), Error> {
    trace!(id = %lot.id, "Updating lot");
    client
        .execute(
            "UPDATE lots SET entry_date = $2, expiry_date = $3, current_quantity = $4, \
             reserved_quantity = $5, location = $6, active = $7 WHERE id = $1",
            &[
                &lot.id,
                &lot.entry_date,
                &lot.expiry_date,
                &lot.current_quantity,
                &lot.reserved_quantity,
                &lot.location,
                &lot.active,
            ],
        )
        .await?;
    Ok(())
}
