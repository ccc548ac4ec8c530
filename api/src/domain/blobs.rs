//! Blob domain - DB queries for stored image bytes

use sqlx::{Executor, Postgres};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct BlobRow {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub async fn insert_blob<'e, E>(
    executor: E,
    id: Uuid,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO image_blobs (id, filename, content_type, data)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(filename)
    .bind(content_type)
    .bind(data)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_blob<'e, E>(executor: E, id: Uuid) -> Result<Option<BlobRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, filename, content_type, data FROM image_blobs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
