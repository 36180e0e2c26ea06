//! Data models for the admin console
//!
//! Wire types for the village website backend, organized by feature area.
//! Content records managed through descriptors travel as [`Record`]; the
//! workflows with their own screens (auth, feedback, citizen services,
//! notifications) have typed models.

mod admin;
mod citizen_service;
mod envelope;
mod feedback;
mod notification;
mod record;
mod upload;

pub use admin::*;
pub use citizen_service::*;
pub use envelope::*;
pub use feedback::*;
pub use notification::*;
pub use record::*;
pub use upload::*;
