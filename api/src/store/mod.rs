//! Result persistence: a metadata record store plus a blob store, behind a
//! facade that degrades to a no-op when the database was unreachable at
//! startup.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::constants::STORED_CONTENT_TYPE;
use crate::models::{BlobRef, ClassLabel, DetectionRecord, ListRange, NewDetection, StoredBlob};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is unavailable")]
    Unavailable,

    #[error("blob not found: {0}")]
    NotFound(BlobRef),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Metadata records, newest first by insertion order
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, detection: NewDetection) -> Result<DetectionRecord, StoreError>;

    async fn list(&self, range: ListRange) -> Result<Vec<DetectionRecord>, StoreError>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Encoded image bytes addressed by a generated reference
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<BlobRef, StoreError>;

    /// Fails with [`StoreError::NotFound`] when the reference is dangling
    async fn get(&self, blob_ref: BlobRef) -> Result<StoredBlob, StoreError>;
}

/// Outcome of a store call that is skipped while the store is degraded
#[derive(Debug, Clone, PartialEq)]
pub enum Persistence<T> {
    Available(T),
    Unavailable,
}

impl<T> Persistence<T> {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Persistence::Unavailable)
    }

    pub fn available(self) -> Option<T> {
        match self {
            Persistence::Available(value) => Some(value),
            Persistence::Unavailable => None,
        }
    }
}

impl<T: Default> Persistence<T> {
    /// The value, or its default when the store is degraded
    pub fn unwrap_or_default(self) -> T {
        self.available().unwrap_or_default()
    }
}

#[derive(Clone)]
struct Backends {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
}

/// Facade the routes talk to
#[derive(Clone)]
pub struct ResultStore {
    backends: Option<Backends>,
}

impl ResultStore {
    pub fn connected(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            backends: Some(Backends { records, blobs }),
        }
    }

    /// Persistence disabled: saves and listings are skipped
    pub fn degraded() -> Self {
        Self { backends: None }
    }

    /// Memory backend for both records and blobs
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::connected(store.clone(), store)
    }

    pub fn is_available(&self) -> bool {
        self.backends.is_some()
    }

    /// Write the blob, then the record pointing at it.
    ///
    /// The two writes are not transactional. If the record insert fails the
    /// blob stays behind unreferenced.
    pub async fn save(
        &self,
        image: &[u8],
        filename: &str,
        label: ClassLabel,
    ) -> Result<Persistence<DetectionRecord>, StoreError> {
        let Some(backends) = &self.backends else {
            tracing::warn!(filename, "store unavailable, result not saved");
            return Ok(Persistence::Unavailable);
        };

        let blob_ref = backends
            .blobs
            .put(filename, STORED_CONTENT_TYPE, image)
            .await?;

        let record = backends
            .records
            .insert(NewDetection {
                blob_ref,
                filename: filename.to_string(),
                label,
            })
            .await
            .inspect_err(|e| {
                tracing::error!(%blob_ref, error = %e, "record insert failed, blob left orphaned");
            })?;

        tracing::info!(id = record.id, %blob_ref, %label, filename, "detection saved");
        Ok(Persistence::Available(record))
    }

    pub async fn list_recent(
        &self,
        range: ListRange,
    ) -> Result<Persistence<Vec<DetectionRecord>>, StoreError> {
        let Some(backends) = &self.backends else {
            tracing::warn!("store unavailable, history not loaded");
            return Ok(Persistence::Unavailable);
        };

        let records = backends.records.list(range).await?;
        Ok(Persistence::Available(records))
    }

    /// Live connectivity check of the record store
    pub async fn ping(&self) -> Result<Persistence<()>, StoreError> {
        match &self.backends {
            Some(backends) => backends.records.ping().await.map(Persistence::Available),
            None => Ok(Persistence::Unavailable),
        }
    }

    pub async fn fetch_blob(&self, blob_ref: BlobRef) -> Result<Vec<u8>, StoreError> {
        let backends = self.backends.as_ref().ok_or(StoreError::Unavailable)?;
        let blob = backends.blobs.get(blob_ref).await?;
        Ok(blob.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRecords;

    #[async_trait]
    impl RecordStore for FailingRecords {
        async fn insert(&self, _detection: NewDetection) -> Result<DetectionRecord, StoreError> {
            Err(StoreError::Backend("insert rejected".into()))
        }

        async fn list(&self, _range: ListRange) -> Result<Vec<DetectionRecord>, StoreError> {
            Err(StoreError::Backend("list rejected".into()))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn save_then_list_returns_newest_first_with_identical_bytes() {
        let store = ResultStore::in_memory();

        store.save(b"first", "first.jpg", ClassLabel::Human).await.unwrap();
        let saved = store
            .save(b"\xff\xd8sketch", "sketch.jpg", ClassLabel::Ai)
            .await
            .unwrap()
            .available()
            .expect("store available");

        let history = store.list_recent(ListRange::all()).await.unwrap().unwrap_or_default();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], saved);
        assert_eq!(history[0].filename, "sketch.jpg");
        assert_eq!(history[0].label, ClassLabel::Ai);
        assert_eq!(history[1].filename, "first.jpg");

        let bytes = store.fetch_blob(saved.blob_ref).await.unwrap();
        assert_eq!(bytes, b"\xff\xd8sketch");
    }

    #[tokio::test]
    async fn degraded_store_skips_without_error() {
        let store = ResultStore::degraded();
        assert!(!store.is_available());

        let saved = store.save(b"img", "a.jpg", ClassLabel::Ai).await.unwrap();
        assert!(saved.is_unavailable());

        let listed = store.list_recent(ListRange::all()).await.unwrap();
        assert!(listed.is_unavailable());
        assert!(listed.unwrap_or_default().is_empty());

        let err = store.fetch_blob(BlobRef::generate()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable));
    }

    #[tokio::test]
    async fn unknown_blob_is_not_found() {
        let store = ResultStore::in_memory();
        let missing = BlobRef::generate();
        let err = store.fetch_blob(missing).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(r) if r == missing));
    }

    #[tokio::test]
    async fn failed_record_insert_leaves_orphaned_blob() {
        let blobs = Arc::new(MemoryStore::new());
        let store = ResultStore::connected(Arc::new(FailingRecords), blobs.clone());

        let err = store.save(b"img", "a.jpg", ClassLabel::Human).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(blobs.blob_count(), 1);
    }

    #[tokio::test]
    async fn list_failure_is_an_error_not_a_degraded_result() {
        let store = ResultStore::connected(Arc::new(FailingRecords), Arc::new(MemoryStore::new()));
        assert!(store.list_recent(ListRange::all()).await.is_err());
    }
}
