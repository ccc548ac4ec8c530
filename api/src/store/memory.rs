use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{BlobStore, RecordStore, StoreError};
use crate::models::{BlobRef, DetectionRecord, ListRange, NewDetection, StoredBlob};

#[derive(Default)]
struct Inner {
    records: Vec<DetectionRecord>,
    blobs: HashMap<BlobRef, StoredBlob>,
    next_id: i64,
}

/// Process-local record and blob store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Backend(format!("memory store poisoned: {e}")))
    }

    /// Number of stored blobs, referenced or not
    pub fn blob_count(&self) -> usize {
        self.lock().map(|inner| inner.blobs.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, detection: NewDetection) -> Result<DetectionRecord, StoreError> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let record = DetectionRecord {
            id: inner.next_id,
            blob_ref: detection.blob_ref,
            filename: detection.filename,
            label: detection.label,
            created_at: Utc::now(),
        };
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn list(&self, range: ListRange) -> Result<Vec<DetectionRecord>, StoreError> {
        let inner = self.lock()?;
        let newest_first = inner.records.iter().rev().skip(range.offset as usize);
        let records = match range.limit {
            Some(limit) => newest_first.take(limit as usize).cloned().collect(),
            None => newest_first.cloned().collect(),
        };
        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<BlobRef, StoreError> {
        let blob_ref = BlobRef::generate();
        self.lock()?.blobs.insert(
            blob_ref,
            StoredBlob {
                blob_ref,
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                data: data.to_vec(),
            },
        );
        Ok(blob_ref)
    }

    async fn get(&self, blob_ref: BlobRef) -> Result<StoredBlob, StoreError> {
        self.lock()?
            .blobs
            .get(&blob_ref)
            .cloned()
            .ok_or(StoreError::NotFound(blob_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassLabel;

    fn detection(name: &str) -> NewDetection {
        NewDetection {
            blob_ref: BlobRef::generate(),
            filename: name.to_string(),
            label: ClassLabel::Human,
        }
    }

    #[tokio::test]
    async fn ids_increase_with_insertion_order() {
        let store = MemoryStore::new();
        let a = store.insert(detection("a.png")).await.unwrap();
        let b = store.insert(detection("b.png")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn list_applies_offset_and_limit_newest_first() {
        let store = MemoryStore::new();
        for name in ["a.png", "b.png", "c.png", "d.png"] {
            store.insert(detection(name)).await.unwrap();
        }

        let page = store.list(ListRange::new(Some(2), 1)).await.unwrap();
        let names: Vec<_> = page.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["c.png", "b.png"]);

        let all = store.list(ListRange::all()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].filename, "d.png");
    }

    #[tokio::test]
    async fn blobs_keep_metadata() {
        let store = MemoryStore::new();
        let blob_ref = store.put("x.jpg", "image/jpeg", b"abc").await.unwrap();
        let blob = store.get(blob_ref).await.unwrap();
        assert_eq!(blob.filename, "x.jpg");
        assert_eq!(blob.content_type, "image/jpeg");
        assert_eq!(blob.data, b"abc");
    }
}
