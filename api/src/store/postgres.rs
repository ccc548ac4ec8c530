use async_trait::async_trait;
use sqlx::PgPool;

use super::{BlobStore, RecordStore, StoreError};
use crate::domain::{blobs, detections};
use crate::models::{BlobRef, DetectionRecord, ListRange, NewDetection, StoredBlob};
use crate::services::db;

/// Records in `detections`, image bytes in `image_blobs`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<detections::DetectionRow> for DetectionRecord {
    type Error = StoreError;

    fn try_from(row: detections::DetectionRow) -> Result<Self, Self::Error> {
        let label = row
            .class
            .parse()
            .map_err(|e| StoreError::Backend(format!("detection {}: {e}", row.id)))?;
        Ok(DetectionRecord {
            id: row.id,
            blob_ref: BlobRef(row.image_id),
            filename: row.filename,
            label,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert(&self, detection: NewDetection) -> Result<DetectionRecord, StoreError> {
        let row = detections::insert_detection(
            &self.pool,
            detection.blob_ref.0,
            &detection.filename,
            detection.label.as_str(),
        )
        .await?;
        row.try_into()
    }

    async fn list(&self, range: ListRange) -> Result<Vec<DetectionRecord>, StoreError> {
        detections::list_detections(&self.pool, range.limit, range.offset)
            .await?
            .into_iter()
            .map(DetectionRecord::try_from)
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        db::ping(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for PgStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<BlobRef, StoreError> {
        let blob_ref = BlobRef::generate();
        blobs::insert_blob(&self.pool, blob_ref.0, filename, content_type, data).await?;
        Ok(blob_ref)
    }

    async fn get(&self, blob_ref: BlobRef) -> Result<StoredBlob, StoreError> {
        let row = blobs::get_blob(&self.pool, blob_ref.0)
            .await?
            .ok_or(StoreError::NotFound(blob_ref))?;
        Ok(StoredBlob {
            blob_ref: BlobRef(row.id),
            filename: row.filename,
            content_type: row.content_type,
            data: row.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(class: &str) -> detections::DetectionRow {
        detections::DetectionRow {
            id: 7,
            image_id: Uuid::new_v4(),
            filename: "photo.png".into(),
            class: class.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn known_class_converts() {
        let record = DetectionRecord::try_from(row("Human")).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.label, crate::models::ClassLabel::Human);
        assert_eq!(record.filename, "photo.png");
    }

    #[test]
    fn unknown_class_is_rejected() {
        let err = DetectionRecord::try_from(row("Robot")).unwrap_err();
        assert!(matches!(err, StoreError::Backend(ref msg) if msg.contains("detection 7")));
    }
}
