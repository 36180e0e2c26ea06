//! Form record controller.
//!
//! Drives one content type's list and its modal form:
//! `closed -> open(create | edit | view) -> submitting -> closed`.
//! All methods take `&self`; a controller is shared behind an `Arc` by
//! whatever front end renders it.

use gram_core::models::{Language, Record, StatusFilter};
use gram_core::validation::FieldError;
use gram_core::{AppError, ErrorMetadata};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::backend::RecordBackend;
use crate::coordinator::{PipelineOptions, Submission, SubmissionCoordinator, SubmitOutcome};
use crate::descriptor::{ContentDescriptor, FieldKind, ImagePolicy};
use crate::draft::FormDraft;
use crate::error::SubmitError;
use crate::in_flight::InFlightSet;
use crate::pending::{PendingUpload, SelectedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
    /// Read-only; never submits
    View,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    Closed,
    Open {
        mode: FormMode,
        /// The record being edited or viewed
        record: Option<Record>,
    },
}

impl ModalState {
    pub fn mode(&self) -> Option<FormMode> {
        match self {
            ModalState::Closed => None,
            ModalState::Open { mode, .. } => Some(*mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The administrator declined the confirmation
    Cancelled,
    /// A delete for the same id is still running
    AlreadyInFlight,
    /// Backend refused or was unreachable; the list is unchanged
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("Cannot change the form while a submission is in progress")]
    Busy,

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("The form is not open for editing")]
    NotEditable,

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// Blocking yes/no prompt shown before destructive actions
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug)]
struct FormState {
    modal: ModalState,
    draft: FormDraft,
    pending: Option<PendingUpload>,
    error: Option<String>,
}

pub struct RecordController<B> {
    descriptor: &'static ContentDescriptor,
    backend: Arc<B>,
    coordinator: SubmissionCoordinator,
    form: Mutex<FormState>,
    records: RwLock<Vec<Record>>,
    query: Mutex<Vec<(String, String)>>,
    deleting: InFlightSet,
}

impl<B: RecordBackend + 'static> RecordController<B> {
    pub fn new(
        descriptor: &'static ContentDescriptor,
        backend: Arc<B>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            descriptor,
            backend,
            coordinator: SubmissionCoordinator::new(options),
            form: Mutex::new(FormState {
                modal: ModalState::Closed,
                draft: descriptor.empty_draft(),
                pending: None,
                error: None,
            }),
            records: RwLock::new(Vec::new()),
            query: Mutex::new(Vec::new()),
            deleting: InFlightSet::default(),
        }
    }

    pub fn descriptor(&self) -> &'static ContentDescriptor {
        self.descriptor
    }

    pub fn coordinator(&self) -> &SubmissionCoordinator {
        &self.coordinator
    }

    // List

    /// Query parameters passed through to the list endpoint on every refresh
    pub async fn set_query(&self, query: Vec<(String, String)>) {
        *self.query.lock().await = query;
    }

    /// Refetch the whole list
    pub async fn refresh(&self) -> Result<(), AppError> {
        let query = self.query.lock().await.clone();
        let records = self.backend.list(self.descriptor, &query).await?;
        tracing::debug!(kind = %self.descriptor.kind, count = records.len(), "List refreshed");
        *self.records.write().await = records;
        Ok(())
    }

    pub async fn records(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    pub async fn filtered(&self, search: &str, status: StatusFilter) -> Vec<Record> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| status.matches(r) && self.descriptor.matches_search(r, search))
            .cloned()
            .collect()
    }

    pub async fn find(&self, id: &str) -> Option<Record> {
        let records = self.records.read().await;
        if self.descriptor.singleton {
            return records.first().cloned();
        }
        records.iter().find(|r| r.id == id).cloned()
    }

    // Modal

    pub async fn modal(&self) -> ModalState {
        self.form.lock().await.modal.clone()
    }

    pub async fn draft(&self) -> FormDraft {
        self.form.lock().await.draft.clone()
    }

    pub async fn form_error(&self) -> Option<String> {
        self.form.lock().await.error.clone()
    }

    pub async fn preview_path(&self) -> Option<PathBuf> {
        self.form
            .lock()
            .await
            .pending
            .as_ref()
            .map(PendingUpload::preview_path)
    }

    async fn open(&self, mode: FormMode, record: Option<Record>) -> Result<(), ControllerError> {
        if self.coordinator.is_in_flight() {
            return Err(ControllerError::Busy);
        }
        let draft = match &record {
            Some(record) => self.descriptor.draft_from(record),
            None => self.descriptor.empty_draft(),
        };

        let mut form = self.form.lock().await;
        form.modal = ModalState::Open { mode, record };
        form.draft = draft;
        form.pending = None;
        form.error = None;
        tracing::debug!(kind = %self.descriptor.kind, ?mode, "Form opened");
        Ok(())
    }

    /// Open an empty form. Always starts from a blank draft.
    pub async fn open_create(&self) -> Result<(), ControllerError> {
        self.open(FormMode::Create, None).await
    }

    pub async fn open_edit(&self, id: &str) -> Result<(), ControllerError> {
        let record = self.find(id).await;
        if record.is_none() && !self.descriptor.singleton {
            return Err(ControllerError::NotFound(id.to_string()));
        }
        self.open(FormMode::Edit, record).await
    }

    pub async fn open_view(&self, id: &str) -> Result<(), ControllerError> {
        let record = self
            .find(id)
            .await
            .ok_or_else(|| ControllerError::NotFound(id.to_string()))?;
        self.open(FormMode::View, Some(record)).await
    }

    /// Refused while a submission is in flight. Releases the preview.
    pub async fn close(&self) -> Result<(), ControllerError> {
        if self.coordinator.is_in_flight() {
            return Err(ControllerError::Busy);
        }
        let mut form = self.form.lock().await;
        Self::reset(self.descriptor, &mut form);
        Ok(())
    }

    fn reset(descriptor: &ContentDescriptor, form: &mut FormState) {
        form.modal = ModalState::Closed;
        form.draft = descriptor.empty_draft();
        form.pending = None;
        form.error = None;
    }

    async fn editable_form(&self) -> Result<tokio::sync::MutexGuard<'_, FormState>, ControllerError> {
        if self.coordinator.is_in_flight() {
            return Err(ControllerError::Busy);
        }
        let form = self.form.lock().await;
        match form.modal.mode() {
            Some(FormMode::Create) | Some(FormMode::Edit) => Ok(form),
            _ => Err(ControllerError::NotEditable),
        }
    }

    pub async fn set_field(&self, name: &str, value: &str) -> Result<(), ControllerError> {
        let field = self
            .descriptor
            .field(name)
            .filter(|f| f.kind != FieldKind::Bilingual)
            .ok_or_else(|| ControllerError::UnknownField(name.to_string()))?;
        let mut form = self.editable_form().await?;
        form.draft.set_text(field.name, value);
        Ok(())
    }

    pub async fn set_localized(
        &self,
        name: &str,
        lang: Language,
        value: &str,
    ) -> Result<(), ControllerError> {
        let field = self
            .descriptor
            .field(name)
            .filter(|f| f.kind == FieldKind::Bilingual)
            .ok_or_else(|| ControllerError::UnknownField(name.to_string()))?;
        let mut form = self.editable_form().await?;
        form.draft.set_localized(field.name, lang, value);
        Ok(())
    }

    /// Attach a file. Type and size are checked immediately; a rejected file
    /// leaves the previous selection in place.
    pub async fn select_file(&self, file: SelectedFile) -> Result<(), SubmitError> {
        let mut form = self
            .editable_form()
            .await
            .map_err(|e| SubmitError::Field(FieldError::new("image", e.to_string())))?;

        let mode = form.modal.mode().unwrap_or(FormMode::Create);
        if self.descriptor.image_policy(mode) == ImagePolicy::None {
            let err = SubmitError::Field(FieldError::new(
                "image",
                format!("A {} does not take an image", self.descriptor.label),
            ));
            form.error = Some(err.user_message(self.descriptor.generic_error));
            return Err(err);
        }

        if let Err(e) = self
            .coordinator
            .validator()
            .validate(&file.media_type, file.size())
        {
            let err = SubmitError::File(e);
            form.error = Some(err.user_message(self.descriptor.generic_error));
            return Err(err);
        }

        // replacing drops the previous preview
        form.pending = Some(PendingUpload::new(file)?);
        form.error = None;
        Ok(())
    }

    pub async fn remove_file(&self) -> Result<(), ControllerError> {
        let mut form = self.editable_form().await?;
        form.pending = None;
        Ok(())
    }

    // Submit

    /// Submit the open form. On success the form closes and the list is
    /// refetched; on failure the form stays open with one error message.
    pub async fn submit(&self) -> Result<SubmitOutcome, SubmitError> {
        if self.coordinator.is_in_flight() {
            return Ok(SubmitOutcome::Ignored);
        }

        let (mode, record_id, draft, file) = {
            let form = self.form.lock().await;
            let (mode, record) = match &form.modal {
                ModalState::Open { mode, record } if *mode != FormMode::View => (*mode, record),
                _ => {
                    tracing::debug!(kind = %self.descriptor.kind, "No editable form open; nothing to submit");
                    return Ok(SubmitOutcome::Ignored);
                }
            };
            (
                mode,
                record.as_ref().map(|r| r.id.clone()).unwrap_or_default(),
                form.draft.clone(),
                form.pending.as_ref().map(|p| p.file().clone()),
            )
        };

        let descriptor = self.descriptor;
        let backend = self.backend.clone();
        let draft_ref = &draft;
        let id_ref = record_id.as_str();

        let result = self
            .coordinator
            .submit(
                Submission {
                    descriptor,
                    mode,
                    draft: &draft,
                    file: file.as_ref(),
                },
                move |image| async move {
                    let body = descriptor.build_payload(mode, draft_ref, image.as_ref())?;
                    match mode {
                        FormMode::Edit => backend.update(descriptor, id_ref, body).await,
                        _ => backend.create(descriptor, body).await,
                    }
                },
            )
            .await;

        match &result {
            Ok(SubmitOutcome::Submitted) => {
                Self::reset(descriptor, &mut *self.form.lock().await);
                if let Err(e) = self.refresh().await {
                    tracing::warn!(kind = %descriptor.kind, error = %e, "Failed to refresh list after submit");
                }
            }
            Ok(SubmitOutcome::Ignored) => {}
            Err(e) => {
                self.form.lock().await.error = Some(e.user_message(descriptor.generic_error));
            }
        }
        result
    }

    // Delete

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    /// Ask for confirmation, then delete. At most one delete per id runs at a
    /// time; deletes of different ids run independently.
    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> DeleteOutcome {
        if self.deleting.contains(id) {
            return DeleteOutcome::AlreadyInFlight;
        }

        let prompt = format!("Are you sure you want to delete this {}?", self.descriptor.label);
        if !confirm.confirm(&prompt) {
            return DeleteOutcome::Cancelled;
        }

        let Some(_ticket) = self.deleting.try_acquire(id) else {
            return DeleteOutcome::AlreadyInFlight;
        };

        match self.backend.delete(self.descriptor, id).await {
            Ok(()) => {
                tracing::info!(kind = %self.descriptor.kind, id, "Record deleted");
                if let Err(e) = self.refresh().await {
                    tracing::warn!(kind = %self.descriptor.kind, error = %e, "Failed to refresh list after delete");
                }
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::error!(
                    kind = %self.descriptor.kind,
                    id,
                    error_code = e.error_code(),
                    error = %e,
                    "Delete failed"
                );
                DeleteOutcome::Failed(e.client_message())
            }
        }
    }
}
