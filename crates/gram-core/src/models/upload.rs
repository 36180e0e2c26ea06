use serde::{Deserialize, Serialize};

/// Content type of every image the console uploads; the compressor always emits JPEG.
pub const UPLOAD_CONTENT_TYPE: &str = "image/jpeg";

/// Image attachment embedded in a JSON request body.
///
/// Serializes to `{imageData, contentType, filename, size}` and is flattened into
/// the record payload of image-bearing resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// `data:image/jpeg;base64,...` URL
    pub image_data: String,
    pub content_type: String,
    /// Name of the file the administrator picked
    pub filename: String,
    /// Byte size of the compressed image
    pub size: u64,
}
