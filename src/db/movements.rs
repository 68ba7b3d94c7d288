use crate::types::Movement;
use std::convert::TryInto;
use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

#[tracing::instrument(skip(client, movement))]
pub async fn save_movement<T: GenericClient>(client: &T, movement: &Movement) -> Result<(), Error> {
    trace!(id = %movement.id, lot_id = %movement.lot_id, "Saving movement");
    client
        .execute(
            "INSERT INTO movements (id, lot_id, kind, quantity, occurred_at, reference_doc, \
             work_order_id, actor, notes) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);",
            &[
                &movement.id,
                &movement.lot_id,
                &movement.kind,
                &movement.quantity,
                &movement.occurred_at,
                &movement.reference_doc,
                &movement.work_order_id,
                &movement.actor,
                &movement.notes,
            ],
        )
        .await?;
    Ok(())
}

#[tracing::instrument(skip(client))]
pub async fn get_movements_by_lot<T: GenericClient>(
    client: &T,
    lot_id: Uuid,
) -> Result<Vec<Movement>, Error> {
    trace!(%lot_id, "Fetching movements for lot");
    client
        .query(
            "SELECT * FROM movements WHERE lot_id = $1 ORDER BY occurred_at, id",
            &[&lot_id],
        )
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}

#[tracing::instrument(skip(client))]
pub async fn get_movements_by_work_order<T: GenericClient>(
    client: &T,
    work_order_id: Uuid,
) -> Result<Vec<Movement>, Error> {
    trace!(%work_order_id, "Fetching movements for work order");
    client
        .query(
            "SELECT * FROM movements WHERE work_order_id = $1 ORDER BY occurred_at, id",
            &[&work_order_id],
        )
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
}
