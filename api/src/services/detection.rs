//! The detection pipeline: decode, classify, re-encode for storage.
//!
//! Runs synchronously; callers on the async runtime move it onto the
//! blocking pool.

use thiserror::Error;

use crate::classifier::{Classifier, ClassifyError};
use crate::models::ClassLabel;
use crate::preprocess::{self, PreprocessError};

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

#[derive(Debug, Clone)]
pub struct Detection {
    pub label: ClassLabel,
    /// The upload re-encoded as JPEG, ready for the blob store
    pub jpeg: Vec<u8>,
}

pub fn detect(classifier: &dyn Classifier, upload: &[u8]) -> Result<Detection, DetectionError> {
    let image = preprocess::decode(upload)?;
    let batch = preprocess::to_batch(&image);
    let label = classifier.classify(&batch)?;
    let jpeg = preprocess::encode_jpeg(&image)?;
    Ok(Detection { label, jpeg })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::ImageBatch;
    use crate::preprocess::tests::encoded;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        score: f32,
        calls: AtomicUsize,
    }

    impl Classifier for Scripted {
        fn score(&self, batch: &ImageBatch) -> Result<f32, ClassifyError> {
            assert_eq!(batch.shape(), &[1, 224, 224, 3]);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.score)
        }
    }

    #[test]
    fn sketch_with_low_score_is_ai() {
        let sketch = RgbImage::from_pixel(512, 512, Rgb([240, 240, 235]));
        let upload = encoded(DynamicImage::ImageRgb8(sketch), ImageFormat::Jpeg);
        let classifier = Scripted {
            score: 0.05,
            calls: AtomicUsize::new(0),
        };

        let detection = detect(&classifier, &upload).expect("detect");

        assert_eq!(detection.label, ClassLabel::Ai);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        let stored = preprocess::decode(&detection.jpeg).expect("stored jpeg decodes");
        assert_eq!((stored.width(), stored.height()), (512, 512));
    }

    #[test]
    fn undecodable_upload_never_reaches_classifier() {
        let classifier = Scripted {
            score: 0.9,
            calls: AtomicUsize::new(0),
        };

        let err = detect(&classifier, b"GIF89a-but-truncated").unwrap_err();

        assert!(matches!(err, DetectionError::Preprocess(PreprocessError::Decode(_))));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }
}
