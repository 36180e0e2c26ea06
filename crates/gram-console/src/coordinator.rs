//! Submission pipeline: validate, compress, encode, send.
//!
//! One coordinator belongs to one form. It admits a single submission at a
//! time; a request that arrives while another is in flight is dropped. The
//! in-flight flag is owned by an RAII guard so every exit path, including
//! errors and panics in the send future, releases it.

use gram_core::models::{ImagePayload, UPLOAD_CONTENT_TYPE};
use gram_core::{AppError, ConsoleConfig};
use gram_processing::{to_data_url, CompressionOptions, ImageCompressor, ImageFileValidator};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use crate::descriptor::ContentDescriptor;
use crate::draft::FormDraft;
use crate::error::SubmitError;
use crate::pending::SelectedFile;
use crate::progress::{Checkpoint, ProgressReporter};
use crate::FormMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Compressing,
    Encoding,
    Uploading,
    Succeeded,
    Failed,
}

impl SubmissionState {
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            SubmissionState::Compressing | SubmissionState::Encoding | SubmissionState::Uploading
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// Another submission was already running; nothing was done
    Ignored,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub compression: CompressionOptions,
    pub max_upload_bytes: u64,
    /// Upper bound on the compression step
    pub compression_timeout: Duration,
    /// Pause after success before the form closes; may be zero
    pub success_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&ConsoleConfig::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self {
            compression: CompressionOptions {
                max_width: config.image_max_width,
                quality: config.image_quality,
            },
            max_upload_bytes: config.max_upload_bytes,
            compression_timeout: config.decode_timeout(),
            success_delay: config.success_delay(),
        }
    }
}

/// What to submit. Borrowed from the form for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    pub descriptor: &'static ContentDescriptor,
    pub mode: FormMode,
    pub draft: &'a FormDraft,
    pub file: Option<&'a SelectedFile>,
}

#[derive(Debug)]
pub struct SubmissionCoordinator {
    in_flight: AtomicBool,
    state: watch::Sender<SubmissionState>,
    progress: ProgressReporter,
    compressor: ImageCompressor,
    validator: ImageFileValidator,
    options: PipelineOptions,
}

struct InFlightGuard<'a> {
    coordinator: &'a SubmissionCoordinator,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.state.send_replace(SubmissionState::Idle);
        self.coordinator.progress.reset();
        self.coordinator.in_flight.store(false, Ordering::Release);
    }
}

impl Default for SubmissionCoordinator {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl SubmissionCoordinator {
    pub fn new(options: PipelineOptions) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            in_flight: AtomicBool::new(false),
            state,
            progress: ProgressReporter::default(),
            compressor: ImageCompressor::new(options.compression),
            validator: ImageFileValidator::new(options.max_upload_bytes),
            options,
        }
    }

    pub fn validator(&self) -> &ImageFileValidator {
        &self.validator
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { coordinator: self })
    }

    fn enter(&self, state: SubmissionState, checkpoint: Checkpoint) {
        self.state.send_replace(state);
        self.progress.report(checkpoint);
    }

    /// Run the pipeline. `send` receives the encoded image (if a file was
    /// attached) and performs the network call.
    pub async fn submit<F, Fut>(
        &self,
        submission: Submission<'_>,
        send: F,
    ) -> Result<SubmitOutcome, SubmitError>
    where
        F: FnOnce(Option<ImagePayload>) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!(kind = %submission.descriptor.kind, "Submission already in flight; ignoring");
            return Ok(SubmitOutcome::Ignored);
        };

        let result = self.run(submission, send).await;
        match &result {
            Ok(_) => {
                if !self.options.success_delay.is_zero() {
                    tokio::time::sleep(self.options.success_delay).await;
                }
            }
            Err(e) if e.is_validation() => {}
            Err(e) => {
                self.state.send_replace(SubmissionState::Failed);
                tracing::warn!(
                    kind = %submission.descriptor.kind,
                    error_code = e.error_code(),
                    error = %e,
                    "Submission failed"
                );
            }
        }
        result
    }

    async fn run<F, Fut>(
        &self,
        submission: Submission<'_>,
        send: F,
    ) -> Result<SubmitOutcome, SubmitError>
    where
        F: FnOnce(Option<ImagePayload>) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let Submission {
            descriptor,
            mode,
            draft,
            file,
        } = submission;

        descriptor.validate(mode, draft, file.is_some())?;
        if let Some(file) = file {
            self.validator.validate(&file.media_type, file.size())?;
        }

        let payload = match file {
            Some(file) => Some(self.prepare_image(file).await?),
            None => None,
        };

        self.enter(SubmissionState::Uploading, Checkpoint::Uploading);
        send(payload).await?;

        self.enter(SubmissionState::Succeeded, Checkpoint::Done);
        tracing::info!(kind = %descriptor.kind, ?mode, "Submission accepted");
        Ok(SubmitOutcome::Submitted)
    }

    async fn prepare_image(&self, file: &SelectedFile) -> Result<ImagePayload, SubmitError> {
        self.enter(SubmissionState::Compressing, Checkpoint::Compressing);
        let compressed = tokio::time::timeout(
            self.options.compression_timeout,
            self.compressor.compress_blocking(file.data.clone()),
        )
        .await
        .map_err(|_| SubmitError::CompressionTimeout)??;

        self.enter(SubmissionState::Encoding, Checkpoint::Encoding);
        let image_data = to_data_url(&compressed.data, UPLOAD_CONTENT_TYPE);

        tracing::debug!(
            filename = %file.filename,
            original_bytes = file.size(),
            compressed_bytes = compressed.size(),
            width = compressed.width,
            height = compressed.height,
            "Image prepared"
        );

        Ok(ImagePayload {
            image_data,
            content_type: UPLOAD_CONTENT_TYPE.to_string(),
            filename: file.filename.clone(),
            size: compressed.size(),
        })
    }
}
