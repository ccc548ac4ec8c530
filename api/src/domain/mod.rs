pub mod blobs;
pub mod detections;
