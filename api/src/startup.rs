//! Startup and teardown of process-wide resources.

use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

use crate::AppState;
use crate::assets::Animations;
use crate::classifier::OnnxClassifier;
use crate::config::{AppConfig, StoreBackend};
use crate::services::db;
use crate::store::{PgStore, ResultStore};
use crate::views::Views;

/// Everything built at startup. Dropped after the server stops.
pub struct Resources {
    pub state: Arc<AppState>,
    pool: Option<PgPool>,
}

impl Resources {
    pub async fn shutdown(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
            tracing::info!("database pool closed");
        }
    }
}

/// Load the model, assets and templates, and connect the store.
///
/// A missing model, animation or template is fatal. An unreachable database
/// is not: the store starts degraded and detection keeps working.
pub async fn initialize(config: &AppConfig) -> anyhow::Result<Resources> {
    let model_path = config.model_path.clone();
    let threads = config.inference_threads;
    let classifier = tokio::task::spawn_blocking(move || OnnxClassifier::load(&model_path, threads))
        .await
        .context("model loading task failed")?
        .context("classifier model is required to serve detections")?;

    let animations = Animations::load(&config.assets_dir)?;
    let views = Views::new().context("compiling page templates")?;
    let (store, pool) = open_store(config).await;

    let state = Arc::new(AppState {
        classifier: Arc::new(classifier),
        store,
        views,
        animations,
        assets_dir: config.assets_dir.clone(),
    });

    Ok(Resources { state, pool })
}

async fn open_store(config: &AppConfig) -> (ResultStore, Option<PgPool>) {
    let database_url = match &config.store {
        StoreBackend::Memory => {
            tracing::info!("using in-memory store, results are lost on restart");
            return (ResultStore::in_memory(), None);
        }
        StoreBackend::Postgres { database_url } => database_url,
    };

    let pool = match db::connect_with_probe(
        database_url,
        config.db_max_connections,
        config.db_connect_timeout,
    )
    .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                timeout_secs = config.db_connect_timeout.as_secs(),
                "database unreachable, saving and history are disabled"
            );
            return (ResultStore::degraded(), None);
        }
    };

    if let Err(e) = db::run_migrations(&pool).await {
        tracing::warn!(error = %e, "schema setup failed, saving and history are disabled");
        pool.close().await;
        return (ResultStore::degraded(), None);
    }

    tracing::info!("database connected");
    let pg = Arc::new(PgStore::new(pool.clone()));
    (ResultStore::connected(pg.clone(), pg), Some(pool))
}
