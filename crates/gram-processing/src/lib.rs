//! Image preparation for uploads
//!
//! - File validation (media type, size)
//! - Compression (downscale + JPEG re-encode)
//! - Base64 data-URL encoding

pub mod compression;
pub mod encoding;
pub mod validator;

pub use compression::{CompressedImage, CompressionOptions, ImageCompressor};
pub use encoding::{file_to_data_url, parse_data_url, read_to_data_url, to_data_url};
pub use validator::{guess_media_type, ImageFileValidator, ValidationError};

use gram_core::AppError;

/// Failure while decoding, re-encoding or reading an image
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Failed to read image data: {0}")]
    Read(#[from] std::io::Error),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Decode(msg) => AppError::ImageProcessing(msg),
            ProcessingError::Encode(msg) => AppError::Encoding(msg),
            ProcessingError::Read(e) => AppError::Encoding(e.to_string()),
        }
    }
}
