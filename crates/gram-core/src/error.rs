//! Error types module
//!
//! `AppError` is the single error type crossing crate boundaries in the console.
//! Transport failures from the HTTP client, image processing failures and local
//! validation failures all end up here so the submission layer can decide what
//! the administrator gets to see.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like timeouts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the administrator.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "UPLOAD_TIMEOUT")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same action may succeed
    fn is_recoverable(&self) -> bool;

    /// Message safe to show in a form
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        /// `message` field of the backend error envelope, when present
        message: Option<String>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidResponse(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, LogLevel) {
    match err {
        AppError::Validation(_) => ("VALIDATION_ERROR", false, LogLevel::Debug),
        AppError::Timeout(_) => ("REQUEST_TIMEOUT", true, LogLevel::Warn),
        AppError::Server { status, .. } if *status >= 500 => {
            ("SERVER_ERROR", true, LogLevel::Error)
        }
        AppError::Server { .. } => ("REQUEST_REJECTED", false, LogLevel::Warn),
        AppError::Unauthorized(_) => ("UNAUTHORIZED", false, LogLevel::Debug),
        AppError::Transport(_) => ("TRANSPORT_ERROR", true, LogLevel::Warn),
        AppError::ImageProcessing(_) => ("IMAGE_PROCESSING_ERROR", false, LogLevel::Warn),
        AppError::Encoding(_) => ("ENCODING_ERROR", false, LogLevel::Error),
        AppError::InvalidResponse(_) => ("INVALID_RESPONSE", false, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            ("INTERNAL_ERROR", false, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Whether this error came from the transport timing out
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Timeout(_))
    }

    /// Server-provided message text, if the backend sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Server { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Timeout(_) => "The server took too long to respond".to_string(),
            AppError::Server { message, status } => message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Request failed with status {}", status)),
            AppError::Unauthorized(_) => "Your session has expired. Please log in again".to_string(),
            AppError::Transport(_) => "Could not reach the server".to_string(),
            AppError::ImageProcessing(_) => "The selected image could not be processed".to_string(),
            AppError::Encoding(_) => "The selected image could not be prepared for upload".to_string(),
            AppError::InvalidResponse(_) => "Unexpected response from the server".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal error".to_string()
            }
        }
    }
}
