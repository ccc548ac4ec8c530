//! Detection domain - DB queries for classification records
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct DetectionRow {
    pub id: i64,
    pub image_id: Uuid,
    pub filename: String,
    pub class: String,
    pub created_at: DateTime<Utc>,
}

/// Insert a detection record, returning the stored row
pub async fn insert_detection<'e, E>(
    executor: E,
    image_id: Uuid,
    filename: &str,
    class: &str,
) -> Result<DetectionRow, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO detections (image_id, filename, class)
        VALUES ($1, $2, $3)
        RETURNING id, image_id, filename, class, created_at
        "#,
    )
    .bind(image_id)
    .bind(filename)
    .bind(class)
    .fetch_one(executor)
    .await
}

/// List detections newest first. A `None` limit returns every row.
pub async fn list_detections<'e, E>(
    executor: E,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<DetectionRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, image_id, filename, class, created_at
        FROM detections
        ORDER BY id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}
