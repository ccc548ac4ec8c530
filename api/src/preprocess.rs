//! Upload decoding and tensor preparation for the classifier.
//!
//! The model expects a single NHWC batch of 224x224 RGB pixels scaled to
//! [0, 1]. Resizing ignores the aspect ratio.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use std::path::Path;
use thiserror::Error;

use crate::constants::{ACCEPTED_EXTENSIONS, CHANNELS, IMAGE_SIZE, STORED_JPEG_QUALITY};

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// A `1 x 224 x 224 x 3` batch of normalised pixels
#[derive(Debug, Clone)]
pub struct ImageBatch(Array4<f32>);

impl ImageBatch {
    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.0
    }
}

/// True when the upload's filename carries one of the accepted extensions
pub fn is_accepted_filename(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
    image::load_from_memory(bytes).map_err(PreprocessError::Decode)
}

/// Drop alpha, resize to the model resolution and scale into [0, 1]
pub fn to_batch(image: &DynamicImage) -> ImageBatch {
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, IMAGE_SIZE, IMAGE_SIZE, FilterType::CatmullRom);

    let side = IMAGE_SIZE as usize;
    let mut batch = Array4::<f32>::zeros((1, side, side, CHANNELS));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..CHANNELS {
            batch[[0, y as usize, x as usize, c]] = f32::from(pixel[c]) / 255.0;
        }
    }

    ImageBatch(batch)
}

pub fn preprocess(bytes: &[u8]) -> Result<ImageBatch, PreprocessError> {
    let image = decode(bytes)?;
    Ok(to_batch(&image))
}

/// Re-encode a decoded upload as an RGB JPEG for the blob store
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let rgb = image.to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, STORED_JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(PreprocessError::Encode)?;
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    pub(crate) fn encoded(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).expect("encode fixture");
        buf.into_inner()
    }

    #[test]
    fn rgba_input_becomes_single_rgb_batch() {
        let rgba = RgbaImage::from_pixel(37, 91, Rgba([255, 128, 0, 10]));
        let bytes = encoded(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);

        let batch = preprocess(&bytes).expect("preprocess png");

        assert_eq!(batch.shape(), &[1, 224, 224, 3]);
        let arr = batch.as_array();
        assert!(arr.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!((arr[[0, 100, 100, 0]] - 1.0).abs() < 1e-6);
        assert!((arr[[0, 100, 100, 1]] - 128.0 / 255.0).abs() < 1e-6);
        assert!(arr[[0, 100, 100, 2]].abs() < 1e-6);
    }

    #[test]
    fn resize_ignores_aspect_ratio() {
        let wide = RgbImage::from_pixel(512, 64, Rgb([0, 0, 255]));
        let batch = to_batch(&DynamicImage::ImageRgb8(wide));

        assert_eq!(batch.shape(), &[1, 224, 224, 3]);
        // No letterboxing: corners carry the image colour, not padding
        let arr = batch.as_array();
        assert!((arr[[0, 0, 0, 2]] - 1.0).abs() < 1e-6);
        assert!((arr[[0, 223, 223, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = preprocess(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PreprocessError::Decode(_)));
    }

    #[test]
    fn accepted_extensions_are_case_insensitive() {
        assert!(is_accepted_filename("sketch.jpg"));
        assert!(is_accepted_filename("SKETCH.JPEG"));
        assert!(is_accepted_filename("photo.Png"));
        assert!(!is_accepted_filename("anim.gif"));
        assert!(!is_accepted_filename("no_extension"));
    }

    #[test]
    fn jpeg_reencode_round_trips_dimensions() {
        let rgba = RgbaImage::from_pixel(40, 30, Rgba([10, 20, 30, 0]));
        let jpeg = encode_jpeg(&DynamicImage::ImageRgba8(rgba)).expect("encode");

        assert_eq!(image::guess_format(&jpeg).expect("format"), ImageFormat::Jpeg);
        let decoded = decode(&jpeg).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }
}
