use ndarray::CowArray;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use std::path::Path;

use super::{Classifier, ClassifyError};
use crate::preprocess::ImageBatch;

/// Classifier backed by an ONNX export of the trained Keras model.
///
/// The graph takes one NHWC float input and returns one sigmoid output of
/// shape `(1, 1)`.
pub struct OnnxClassifier {
    session: Session,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path, intra_threads: usize) -> Result<Self, ClassifyError> {
        let model_load = |source| ClassifyError::ModelLoad {
            path: model_path.to_path_buf(),
            source,
        };

        tracing::info!(path = %model_path.display(), "loading classifier model");

        let session = Session::builder()
            .map_err(model_load)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(model_load)?
            .with_intra_threads(intra_threads)
            .map_err(model_load)?
            .commit_from_file(model_path)
            .map_err(model_load)?;

        tracing::info!(
            inputs = session.inputs.len(),
            outputs = session.outputs.len(),
            "classifier model loaded"
        );

        Ok(Self { session })
    }
}

impl Classifier for OnnxClassifier {
    fn score(&self, batch: &ImageBatch) -> Result<f32, ClassifyError> {
        let xs = CowArray::from(batch.as_array().view().into_dyn());
        let outputs = self.session.run(ort::inputs![xs.view()]?)?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| ClassifyError::InvalidOutput("model produced no outputs".into()))?;
        let scores = output.try_extract_tensor::<f32>()?;

        scores
            .iter()
            .next()
            .copied()
            .ok_or_else(|| ClassifyError::InvalidOutput("empty output tensor".into()))
    }
}
