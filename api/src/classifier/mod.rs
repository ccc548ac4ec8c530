use std::path::PathBuf;
use thiserror::Error;

use crate::models::ClassLabel;
use crate::preprocess::ImageBatch;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("failed to load model from {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ort::Error,
    },

    #[error("inference failed: {0}")]
    Inference(#[from] ort::Error),

    #[error("model returned an unusable output: {0}")]
    InvalidOutput(String),
}

/// Pluggable binary classifier for AI-generated images
pub trait Classifier: Send + Sync {
    /// Raw sigmoid probability that the image is human-made
    fn score(&self, batch: &ImageBatch) -> Result<f32, ClassifyError>;

    /// Threshold the score into a label. The score itself is discarded.
    fn classify(&self, batch: &ImageBatch) -> Result<ClassLabel, ClassifyError> {
        let score = self.score(batch)?;
        tracing::debug!(score, "classifier score");
        ClassLabel::from_score(score)
            .ok_or_else(|| ClassifyError::InvalidOutput(format!("non-finite score {score}")))
    }
}

mod onnx;

pub use onnx::OnnxClassifier;
