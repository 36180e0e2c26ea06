//! Gram Console Library
//!
//! Everything the admin console does between the administrator and the
//! backend: content descriptors, form controllers, the image submission
//! pipeline with its single-flight guard, status desks for citizen
//! submissions and the dashboard counts.
//!
//! Front ends (the `gram-admin` CLI) only drive [`RecordController`],
//! [`FeedbackDesk`], [`ApplicationDesk`] and [`load_stats`]; the HTTP side is
//! reached through the traits in [`backend`].

pub mod backend;
pub mod controller;
pub mod coordinator;
pub mod dashboard;
pub mod descriptor;
pub mod draft;
pub mod error;
pub mod in_flight;
pub mod pending;
pub mod progress;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{ApplicationBackend, FeedbackBackend, RecordBackend};
pub use controller::{Confirm, ControllerError, DeleteOutcome, FormMode, ModalState, RecordController};
pub use coordinator::{PipelineOptions, SubmissionCoordinator, SubmissionState, SubmitOutcome};
pub use dashboard::{load_stats, DashboardStats};
pub use descriptor::{ContentDescriptor, ContentKind};
pub use draft::{FieldValue, FormDraft};
pub use error::SubmitError;
pub use pending::SelectedFile;
pub use status::{ApplicationDesk, FeedbackDesk, UpdateOutcome};
