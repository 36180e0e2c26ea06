//! Fixtures shared by the unit tests in this crate.

use async_trait::async_trait;
use gram_core::models::{
    ApplicationStatus, Feedback, FeedbackStatus, FeedbackStatusUpdate, Record, ServiceApplication,
};
use gram_core::AppError;
use serde_json::Value;
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Barrier, Notify};

use crate::backend::{ApplicationBackend, FeedbackBackend, RecordBackend};
use crate::descriptor::ContentDescriptor;
use crate::pending::SelectedFile;

/// A real PNG of the given size, wrapped as a picked file
pub(crate) fn png_file(name: &str, width: u32, height: u32) -> SelectedFile {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    SelectedFile::new(name, "image/png", out.into_inner())
}

pub(crate) fn record(id: &str, fields: Value) -> Record {
    let mut value = fields;
    value["_id"] = Value::String(id.to_string());
    serde_json::from_value(value).unwrap()
}

pub(crate) fn feedback(id: &str, subject: &str, status: FeedbackStatus) -> Feedback {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "name": "Ramesh Jadhav",
        "email": "ramesh@example.com",
        "subject": subject,
        "message": "Street light not working",
        "status": status,
    }))
    .unwrap()
}

pub(crate) fn application(id: &str, first: &str, status: ApplicationStatus) -> ServiceApplication {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "firstName": first,
        "lastName": "Patil",
        "email": format!("{}@example.com", first.to_lowercase()),
        "whatsappNumber": "9876543210",
        "status": status,
    }))
    .unwrap()
}

type ErrorFactory = fn() -> AppError;

/// In-memory backend that records every write.
///
/// Writes can be held on a [`Notify`], failed with an injected error, or
/// (for deletes) made to meet at a [`Barrier`].
#[derive(Default)]
pub(crate) struct MockBackend {
    records: Mutex<Vec<Record>>,
    feedback: Mutex<Vec<Feedback>>,
    applications: Mutex<Vec<ServiceApplication>>,
    created: Mutex<Vec<Value>>,
    updated: Mutex<Vec<(String, Value)>>,
    deleted: Mutex<Vec<String>>,
    status_updates: Mutex<Vec<(String, String)>>,
    list_calls: AtomicUsize,
    next_id: AtomicUsize,
    write_error: Mutex<Option<ErrorFactory>>,
    failing_lists: Mutex<HashSet<&'static str>>,
    hold: Mutex<Option<Arc<Notify>>>,
    delete_barrier: Mutex<Option<Arc<Barrier>>>,
}

impl MockBackend {
    pub(crate) fn with_records(records: Vec<Record>) -> Self {
        let backend = Self::default();
        *backend.records.lock().unwrap() = records;
        backend
    }

    pub(crate) fn set_feedback(&self, items: Vec<Feedback>) {
        *self.feedback.lock().unwrap() = items;
    }

    pub(crate) fn set_applications(&self, items: Vec<ServiceApplication>) {
        *self.applications.lock().unwrap() = items;
    }

    /// Every write waits for one notification before completing
    pub(crate) fn hold_writes(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub(crate) fn fail_writes_with(&self, error: ErrorFactory) {
        *self.write_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn clear_write_failure(&self) {
        *self.write_error.lock().unwrap() = None;
    }

    pub(crate) fn fail_list(&self, path: &'static str) {
        self.failing_lists.lock().unwrap().insert(path);
    }

    pub(crate) fn set_delete_barrier(&self, barrier: Arc<Barrier>) {
        *self.delete_barrier.lock().unwrap() = Some(barrier);
    }

    pub(crate) fn created(&self) -> Vec<Value> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn updated(&self) -> Vec<(String, Value)> {
        self.updated.lock().unwrap().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub(crate) fn status_updates(&self) -> Vec<(String, String)> {
        self.status_updates.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn before_write(&self) -> Result<(), AppError> {
        let hold = self.hold.lock().unwrap().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }
        match *self.write_error.lock().unwrap() {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }

    fn before_list(&self, path: &str) -> Result<(), AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_lists.lock().unwrap().contains(path) {
            return Err(AppError::Server {
                status: 500,
                message: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for MockBackend {
    async fn list(
        &self,
        descriptor: &ContentDescriptor,
        _query: &[(String, String)],
    ) -> Result<Vec<Record>, AppError> {
        self.before_list(descriptor.list_path)?;
        Ok(self.records.lock().unwrap().clone())
    }

    async fn create(&self, descriptor: &ContentDescriptor, body: Value) -> Result<(), AppError> {
        self.before_write().await?;
        let id = format!("new-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let stored = record(if descriptor.singleton { "" } else { id.as_str() }, body.clone());
        self.records.lock().unwrap().push(stored);
        self.created.lock().unwrap().push(body);
        Ok(())
    }

    async fn update(
        &self,
        descriptor: &ContentDescriptor,
        id: &str,
        body: Value,
    ) -> Result<(), AppError> {
        self.before_write().await?;
        let stored = record(id, body.clone());
        {
            let mut records = self.records.lock().unwrap();
            if descriptor.singleton {
                *records = vec![stored];
            } else if let Some(existing) = records.iter_mut().find(|r| r.id == id) {
                *existing = stored;
            }
        }
        self.updated.lock().unwrap().push((id.to_string(), body));
        Ok(())
    }

    async fn delete(&self, descriptor: &ContentDescriptor, id: &str) -> Result<(), AppError> {
        let barrier = self.delete_barrier.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
        self.before_write().await?;
        {
            let mut records = self.records.lock().unwrap();
            if descriptor.singleton {
                records.clear();
            } else {
                records.retain(|r| r.id != id);
            }
        }
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

#[async_trait]
impl FeedbackBackend for MockBackend {
    async fn list_feedback(&self, status: Option<FeedbackStatus>) -> Result<Vec<Feedback>, AppError> {
        self.before_list("/feedback")?;
        Ok(self
            .feedback
            .lock()
            .unwrap()
            .iter()
            .filter(|f| status.map(|s| f.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn update_feedback_status(
        &self,
        id: &str,
        update: FeedbackStatusUpdate,
    ) -> Result<(), AppError> {
        self.before_write().await?;
        if let Some(item) = self.feedback.lock().unwrap().iter_mut().find(|f| f.id == id) {
            item.status = update.status;
            item.admin_notes = Some(update.admin_notes.clone());
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((id.to_string(), update.status.to_string()));
        Ok(())
    }

    async fn delete_feedback(&self, id: &str) -> Result<(), AppError> {
        self.before_write().await?;
        self.feedback.lock().unwrap().retain(|f| f.id != id);
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

#[async_trait]
impl ApplicationBackend for MockBackend {
    async fn list_applications(&self) -> Result<Vec<ServiceApplication>, AppError> {
        self.before_list("/nagrik-seva/applications")?;
        Ok(self.applications.lock().unwrap().clone())
    }

    async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), AppError> {
        self.before_write().await?;
        if let Some(item) = self
            .applications
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.id == id)
        {
            item.status = status;
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((id.to_string(), status.to_string()));
        Ok(())
    }

    async fn delete_application(&self, id: &str) -> Result<(), AppError> {
        self.before_write().await?;
        self.applications.lock().unwrap().retain(|a| a.id != id);
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn delete_applications(&self, ids: &[String]) -> Result<(), AppError> {
        self.before_write().await?;
        self.applications
            .lock()
            .unwrap()
            .retain(|a| !ids.contains(&a.id));
        self.deleted.lock().unwrap().extend(ids.iter().cloned());
        Ok(())
    }
}
