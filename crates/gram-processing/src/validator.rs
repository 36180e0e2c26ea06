use std::path::Path;

/// 10 MiB, the largest file a form accepts before compression
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Reasons a selected file is rejected before any processing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid content type: {content_type} (expected image/*)")]
    NotAnImage { content_type: String },

    #[error("Empty file")]
    EmptyFile,
}

impl ValidationError {
    /// Message shown next to the file picker
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::FileTooLarge { max, .. } => {
                format!("File size must be less than {}MB", max / (1024 * 1024))
            }
            ValidationError::NotAnImage { .. } | ValidationError::EmptyFile => {
                "Please select a valid image file".to_string()
            }
        }
    }
}

/// Gatekeeper for files picked in an upload form
#[derive(Debug, Clone, Copy)]
pub struct ImageFileValidator {
    max_file_size: u64,
}

impl Default for ImageFileValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl ImageFileValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if !content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(ValidationError::NotAnImage {
                content_type: content_type.to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Type first, then size
    pub fn validate(&self, content_type: &str, size: u64) -> Result<(), ValidationError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(size)
    }
}

/// Media type implied by a file name's extension, for files picked from disk
pub fn guess_media_type(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let media_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "mp4" => "video/mp4",
        _ => return None,
    };
    Some(media_type)
}
