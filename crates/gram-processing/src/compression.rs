use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;

use crate::ProcessingError;

const DEFAULT_MAX_WIDTH: u32 = 1200;
const DEFAULT_QUALITY: f32 = 0.8;

/// Compression parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionOptions {
    /// Images wider than this are scaled down to it, keeping the aspect ratio
    pub max_width: u32,
    /// JPEG quality factor in (0, 1]
    pub quality: f32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CompressionOptions {
    /// Quality mapped onto the encoder's 1-100 scale
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Output of the compressor. Always JPEG.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn content_type(&self) -> &'static str {
        gram_core::models::UPLOAD_CONTENT_TYPE
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Downscales and re-encodes user-selected images before upload
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompressor {
    options: CompressionOptions,
}

impl ImageCompressor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompressionOptions {
        self.options
    }

    /// Width and height after clamping `width` to `max_width`. Never upscales.
    pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
        if width <= max_width {
            return (width, height);
        }
        let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
        (max_width, scaled.max(1))
    }

    /// Decode any supported raster format (PNG, GIF, JPEG, WebP) and re-encode as JPEG
    pub fn compress(&self, data: &[u8]) -> Result<CompressedImage, ProcessingError> {
        let cursor = Cursor::new(data);
        let img = image::ImageReader::new(cursor)
            .with_guessed_format()?
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        let (target_width, target_height) =
            Self::target_dimensions(width, height, self.options.max_width);

        let img = if (target_width, target_height) != (width, height) {
            tracing::debug!(
                from_width = width,
                from_height = height,
                to_width = target_width,
                to_height = target_height,
                "Downscaling image"
            );
            img.resize_exact(target_width, target_height, FilterType::Triangle)
        } else {
            img
        };

        let input_bytes = data.len();
        let data = Self::encode_jpeg(&img, self.options.jpeg_quality())?;

        tracing::debug!(
            input_bytes,
            output_bytes = data.len(),
            quality = self.options.jpeg_quality(),
            "Image compressed"
        );

        Ok(CompressedImage {
            data,
            width: target_width,
            height: target_height,
        })
    }

    /// Same as [`compress`](Self::compress), run on the blocking pool.
    /// Decoding is CPU-bound and must not stall other tasks.
    ///
    /// Dropping the returned future (for example when a `tokio::time::timeout`
    /// around it fires) does not stop the work: the blocking task runs to
    /// completion and its result is discarded.
    pub async fn compress_blocking(&self, data: Bytes) -> Result<CompressedImage, ProcessingError> {
        let compressor = *self;
        tokio::task::spawn_blocking(move || compressor.compress(&data))
            .await
            .map_err(|e| ProcessingError::Decode(format!("compression task failed: {}", e)))?
    }

    fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, ProcessingError> {
        // JPEG has no alpha channel
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut buffer = Vec::with_capacity((width * height) as usize / 4);
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| ProcessingError::Encode(e.to_string()))?;
        Ok(Bytes::from(buffer))
    }
}
