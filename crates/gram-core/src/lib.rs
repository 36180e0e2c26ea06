//! Gram Core Library
//!
//! This crate provides the domain models, error types, configuration and field
//! validation shared by every Gram admin console component.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ConsoleConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
