//! Application constants

/// Side length of the square input the classifier was trained on
pub const IMAGE_SIZE: u32 = 224;

/// Colour channels fed to the classifier (RGB, alpha dropped)
pub const CHANNELS: usize = 3;

/// Scores at or above this value are "Human", below are "AI"
pub const HUMAN_THRESHOLD: f32 = 0.5;

/// JPEG quality used when re-encoding uploads for storage
pub const STORED_JPEG_QUALITY: u8 = 90;

/// Content type of every stored blob
pub const STORED_CONTENT_TYPE: &str = "image/jpeg";

/// Maximum upload size (200 MB)
pub const MAX_UPLOAD_SIZE: usize = 200 * 1024 * 1024;

/// File extensions accepted by the upload form
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

/// Multipart field carrying the uploaded image
pub const UPLOAD_FIELD: &str = "image";

/// Maximum page size for the history listing
pub const MAX_HISTORY_PAGE_SIZE: i64 = 500;

/// Rendered width of images on the detection and history pages
pub const PREVIEW_WIDTH: u32 = 224;
