//! Database connection and schema setup
//!
//! Domain functions in `crate::domain` use sqlx's generic Executor trait, so
//! they accept both `&PgPool` and `&mut PgConnection` (transactions):
//!
//! ```ignore
//! pub async fn my_query<'e, E>(executor: E, id: i64) -> Result<MyType, sqlx::Error>
//! where
//!     E: Executor<'e, Database = Postgres>,
//! ```
//!
//! The pool is opened once at startup. A failed connection or probe does not
//! stop the process; the caller switches the result store to degraded mode.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Open a pool and run a `SELECT 1` probe, both bounded by `timeout`
pub async fn connect_with_probe(
    database_url: &str,
    max_connections: u32,
    timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let connect = async {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await?;
        ping(&pool).await?;
        Ok::<_, sqlx::Error>(pool)
    };

    tokio::time::timeout(timeout, connect)
        .await
        .map_err(|_| sqlx::Error::PoolTimedOut)?
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create the tables if they do not exist yet
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS image_blobs (
            id UUID PRIMARY KEY,
            filename TEXT NOT NULL,
            content_type TEXT NOT NULL,
            data BYTEA NOT NULL,
            uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // No foreign key: blobs and records are written without a shared transaction
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS detections (
            id BIGSERIAL PRIMARY KEY,
            image_id UUID NOT NULL,
            filename TEXT NOT NULL,
            class TEXT NOT NULL CHECK (class IN ('AI', 'Human')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
