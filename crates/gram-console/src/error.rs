use gram_core::validation::FieldError;
use gram_core::{AppError, ErrorMetadata};
use gram_processing::{ProcessingError, ValidationError};

pub const UPLOAD_TIMEOUT_MESSAGE: &str =
    "Upload timeout. Please try with a smaller image or check your internet connection.";

pub const IMAGE_UNREADABLE_MESSAGE: &str =
    "Could not process the selected image. Please choose a different file.";

/// Why a form submission did not go through
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    File(#[from] ValidationError),

    #[error("Image compression did not finish in time")]
    CompressionTimeout,

    #[error(transparent)]
    Image(#[from] ProcessingError),

    #[error(transparent)]
    Request(#[from] AppError),
}

impl SubmitError {
    /// The single error string shown on the form. `generic` is the
    /// per-content-type fallback used when the backend gave no message.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            SubmitError::Field(e) => e.message.clone(),
            SubmitError::File(e) => e.user_message(),
            SubmitError::CompressionTimeout | SubmitError::Image(ProcessingError::Decode(_)) => {
                IMAGE_UNREADABLE_MESSAGE.to_string()
            }
            SubmitError::Image(_) => generic.to_string(),
            SubmitError::Request(e) if e.is_timeout() => UPLOAD_TIMEOUT_MESSAGE.to_string(),
            SubmitError::Request(e) => e
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| generic.to_string()),
        }
    }

    /// Failed before any compression or network work started
    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::Field(_) | SubmitError::File(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SubmitError::Field(_) | SubmitError::File(_) => "VALIDATION_ERROR",
            SubmitError::CompressionTimeout => "COMPRESSION_TIMEOUT",
            SubmitError::Image(_) => "IMAGE_PROCESSING_ERROR",
            SubmitError::Request(e) => e.error_code(),
        }
    }
}
