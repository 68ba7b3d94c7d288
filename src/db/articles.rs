use tokio_postgres::{Error, GenericClient};
use tracing::trace;
use uuid::Uuid;

#[tracing::instrument(skip(client))]
pub async fn article_exists<T: GenericClient>(client: &T, article_id: Uuid) -> Result<bool, Error> {
    trace!(%article_id, "Checking article");
    let row = client
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM articles WHERE id = $1)",
            &[&article_id],
        )
        .await?;
    row.try_get(0)
}
