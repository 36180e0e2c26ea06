//! Status workflows for citizen submissions.
//!
//! Feedback and certificate applications are not edited through forms; the
//! administrator moves them between statuses and deletes them. Both desks keep
//! a cached list and allow one action per id at a time.

use gram_core::models::{
    ApplicationStatus, Feedback, FeedbackStatus, FeedbackStatusUpdate, ServiceApplication,
};
use gram_core::{AppError, ErrorMetadata};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::{ApplicationBackend, FeedbackBackend};
use crate::controller::{Confirm, DeleteOutcome};
use crate::in_flight::InFlightSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    AlreadyInFlight,
    Failed(String),
}

fn log_failure(action: &str, id: &str, err: &AppError) -> String {
    tracing::error!(action, id, error_code = err.error_code(), error = %err, "Status action failed");
    err.client_message()
}

pub struct FeedbackDesk<B> {
    backend: Arc<B>,
    items: RwLock<Vec<Feedback>>,
    filter: RwLock<Option<FeedbackStatus>>,
    busy: InFlightSet,
}

impl<B: FeedbackBackend> FeedbackDesk<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            items: RwLock::new(Vec::new()),
            filter: RwLock::new(None),
            busy: InFlightSet::default(),
        }
    }

    /// Server-side status filter applied on every refresh
    pub async fn set_filter(&self, status: Option<FeedbackStatus>) {
        *self.filter.write().await = status;
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let status = *self.filter.read().await;
        let items = self.backend.list_feedback(status).await?;
        tracing::debug!(count = items.len(), ?status, "Feedback refreshed");
        *self.items.write().await = items;
        Ok(())
    }

    pub async fn items(&self) -> Vec<Feedback> {
        self.items.read().await.clone()
    }

    pub async fn search(&self, term: &str) -> Vec<Feedback> {
        let term = term.trim();
        self.items
            .read()
            .await
            .iter()
            .filter(|f| term.is_empty() || f.matches_search(term))
            .cloned()
            .collect()
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.busy.contains(id)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: FeedbackStatus,
        admin_notes: &str,
    ) -> UpdateOutcome {
        let Some(_ticket) = self.busy.try_acquire(id) else {
            return UpdateOutcome::AlreadyInFlight;
        };

        let update = FeedbackStatusUpdate {
            status,
            admin_notes: admin_notes.trim().to_string(),
        };
        match self.backend.update_feedback_status(id, update).await {
            Ok(()) => {
                tracing::info!(id, %status, "Feedback status updated");
                if let Err(e) = self.refresh().await {
                    tracing::warn!(error = %e, "Failed to refresh feedback");
                }
                UpdateOutcome::Updated
            }
            Err(e) => UpdateOutcome::Failed(log_failure("update_feedback_status", id, &e)),
        }
    }

    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> DeleteOutcome {
        if self.busy.contains(id) {
            return DeleteOutcome::AlreadyInFlight;
        }
        if !confirm.confirm("Are you sure you want to delete this feedback?") {
            return DeleteOutcome::Cancelled;
        }
        let Some(_ticket) = self.busy.try_acquire(id) else {
            return DeleteOutcome::AlreadyInFlight;
        };

        match self.backend.delete_feedback(id).await {
            Ok(()) => {
                tracing::info!(id, "Feedback deleted");
                if let Err(e) = self.refresh().await {
                    tracing::warn!(error = %e, "Failed to refresh feedback");
                }
                DeleteOutcome::Deleted
            }
            Err(e) => DeleteOutcome::Failed(log_failure("delete_feedback", id, &e)),
        }
    }
}

pub struct ApplicationDesk<B> {
    backend: Arc<B>,
    items: RwLock<Vec<ServiceApplication>>,
    busy: InFlightSet,
}

impl<B: ApplicationBackend> ApplicationDesk<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            items: RwLock::new(Vec::new()),
            busy: InFlightSet::default(),
        }
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let items = self.backend.list_applications().await?;
        tracing::debug!(count = items.len(), "Applications refreshed");
        *self.items.write().await = items;
        Ok(())
    }

    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Failed to refresh applications");
        }
    }

    pub async fn items(&self) -> Vec<ServiceApplication> {
        self.items.read().await.clone()
    }

    /// Search and status filter, both applied locally
    pub async fn filtered(
        &self,
        term: &str,
        status: Option<ApplicationStatus>,
    ) -> Vec<ServiceApplication> {
        let term = term.trim();
        self.items
            .read()
            .await
            .iter()
            .filter(|a| status.map(|s| a.status == s).unwrap_or(true))
            .filter(|a| term.is_empty() || a.matches_search(term))
            .cloned()
            .collect()
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.busy.contains(id)
    }

    pub async fn update_status(&self, id: &str, status: ApplicationStatus) -> UpdateOutcome {
        let Some(_ticket) = self.busy.try_acquire(id) else {
            return UpdateOutcome::AlreadyInFlight;
        };

        match self.backend.update_application_status(id, status).await {
            Ok(()) => {
                tracing::info!(id, %status, "Application status updated");
                self.refresh_after_write().await;
                UpdateOutcome::Updated
            }
            Err(e) => UpdateOutcome::Failed(log_failure("update_application_status", id, &e)),
        }
    }

    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> DeleteOutcome {
        if self.busy.contains(id) {
            return DeleteOutcome::AlreadyInFlight;
        }
        if !confirm.confirm("Are you sure you want to delete this application?") {
            return DeleteOutcome::Cancelled;
        }
        let Some(_ticket) = self.busy.try_acquire(id) else {
            return DeleteOutcome::AlreadyInFlight;
        };

        match self.backend.delete_application(id).await {
            Ok(()) => {
                tracing::info!(id, "Application deleted");
                self.refresh_after_write().await;
                DeleteOutcome::Deleted
            }
            Err(e) => DeleteOutcome::Failed(log_failure("delete_application", id, &e)),
        }
    }

    /// Delete several applications in one request. Ids with another action in
    /// flight are skipped.
    pub async fn bulk_delete(&self, ids: &[String], confirm: &dyn Confirm) -> DeleteOutcome {
        if ids.is_empty() {
            return DeleteOutcome::Cancelled;
        }
        let prompt = format!(
            "Are you sure you want to delete {} selected application(s)?",
            ids.len()
        );
        if !confirm.confirm(&prompt) {
            return DeleteOutcome::Cancelled;
        }

        let tickets: Vec<_> = ids.iter().filter_map(|id| self.busy.try_acquire(id)).collect();
        if tickets.is_empty() {
            return DeleteOutcome::AlreadyInFlight;
        }
        let acquired: Vec<String> = tickets.iter().map(|t| t.id().to_string()).collect();

        match self.backend.delete_applications(&acquired).await {
            Ok(()) => {
                tracing::info!(count = acquired.len(), "Applications deleted");
                self.refresh_after_write().await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                let joined = acquired.join(",");
                DeleteOutcome::Failed(log_failure("delete_applications", &joined, &e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{application, feedback, MockBackend};

    fn yes() -> impl Confirm {
        |_: &str| true
    }

    #[tokio::test]
    async fn feedback_status_update_refreshes() {
        let backend = Arc::new(MockBackend::default());
        backend.set_feedback(vec![
            feedback("f1", "Street light", FeedbackStatus::Pending),
            feedback("f2", "Water supply", FeedbackStatus::Resolved),
        ]);
        let desk = FeedbackDesk::new(backend.clone());
        desk.refresh().await.unwrap();

        assert_eq!(
            desk.update_status("f1", FeedbackStatus::Reviewed, " checked ").await,
            UpdateOutcome::Updated
        );
        assert_eq!(backend.status_updates(), vec![("f1".to_string(), "reviewed".to_string())]);
        let item = desk.items().await.into_iter().find(|f| f.id == "f1").unwrap();
        assert_eq!(item.status, FeedbackStatus::Reviewed);
        assert_eq!(item.admin_notes.as_deref(), Some("checked"));
    }

    #[tokio::test]
    async fn feedback_filter_and_search() {
        let backend = Arc::new(MockBackend::default());
        backend.set_feedback(vec![
            feedback("f1", "Street light", FeedbackStatus::Pending),
            feedback("f2", "Water supply", FeedbackStatus::Resolved),
        ]);
        let desk = FeedbackDesk::new(backend);

        desk.set_filter(Some(FeedbackStatus::Pending)).await;
        desk.refresh().await.unwrap();
        assert_eq!(desk.items().await.len(), 1);

        desk.set_filter(None).await;
        desk.refresh().await.unwrap();
        let found = desk.search("WATER").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "f2");
        assert_eq!(desk.search("  ").await.len(), 2);
    }

    #[tokio::test]
    async fn feedback_update_is_single_flight_per_id() {
        let backend = Arc::new(MockBackend::default());
        backend.set_feedback(vec![feedback("f1", "Road", FeedbackStatus::Pending)]);
        let release = backend.hold_writes();
        let desk = Arc::new(FeedbackDesk::new(backend.clone()));

        let first = {
            let desk = desk.clone();
            tokio::spawn(async move { desk.update_status("f1", FeedbackStatus::Resolved, "").await })
        };
        while !desk.is_busy("f1") {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            desk.update_status("f1", FeedbackStatus::Reviewed, "").await,
            UpdateOutcome::AlreadyInFlight
        );
        assert_eq!(desk.delete("f1", &yes()).await, DeleteOutcome::AlreadyInFlight);

        release.notify_one();
        assert_eq!(first.await.unwrap(), UpdateOutcome::Updated);
        assert_eq!(backend.status_updates().len(), 1);
    }

    #[tokio::test]
    async fn feedback_delete_failure_keeps_list() {
        let backend = Arc::new(MockBackend::default());
        backend.set_feedback(vec![feedback("f1", "Road", FeedbackStatus::Pending)]);
        backend.fail_writes_with(|| AppError::Transport("connection reset".to_string()));
        let desk = FeedbackDesk::new(backend);
        desk.refresh().await.unwrap();

        assert!(matches!(desk.delete("f1", &yes()).await, DeleteOutcome::Failed(_)));
        assert_eq!(desk.items().await.len(), 1);
        assert!(!desk.is_busy("f1"));
    }

    #[tokio::test]
    async fn application_filter_by_status_and_search() {
        let backend = Arc::new(MockBackend::default());
        backend.set_applications(vec![
            application("a1", "Sunita", ApplicationStatus::Pending),
            application("a2", "Mahesh", ApplicationStatus::Approved),
        ]);
        let desk = ApplicationDesk::new(backend);
        desk.refresh().await.unwrap();

        assert_eq!(desk.filtered("", None).await.len(), 2);
        assert_eq!(desk.filtered("", Some(ApplicationStatus::Approved)).await[0].id, "a2");
        assert_eq!(desk.filtered("sunita patil", None).await[0].id, "a1");
        assert_eq!(desk.filtered("98765", None).await.len(), 2);
        assert!(desk
            .filtered("mahesh", Some(ApplicationStatus::Pending))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn application_status_update_refetches() {
        let backend = Arc::new(MockBackend::default());
        backend.set_applications(vec![application("a1", "Sunita", ApplicationStatus::Pending)]);
        let desk = ApplicationDesk::new(backend.clone());
        desk.refresh().await.unwrap();
        let calls = backend.list_calls();

        assert_eq!(
            desk.update_status("a1", ApplicationStatus::Rejected).await,
            UpdateOutcome::Updated
        );
        assert_eq!(desk.items().await[0].status, ApplicationStatus::Rejected);
        assert_eq!(backend.list_calls(), calls + 1);
    }

    #[tokio::test]
    async fn application_delete_needs_confirmation() {
        let backend = Arc::new(MockBackend::default());
        backend.set_applications(vec![application("a1", "Sunita", ApplicationStatus::Pending)]);
        let desk = ApplicationDesk::new(backend.clone());
        desk.refresh().await.unwrap();

        let no = |_: &str| false;
        assert_eq!(desk.delete("a1", &no).await, DeleteOutcome::Cancelled);
        assert!(backend.deleted().is_empty());

        assert_eq!(desk.delete("a1", &yes()).await, DeleteOutcome::Deleted);
        assert!(desk.items().await.is_empty());
    }

    #[tokio::test]
    async fn bulk_delete_removes_selected() {
        let backend = Arc::new(MockBackend::default());
        backend.set_applications(vec![
            application("a1", "Sunita", ApplicationStatus::Pending),
            application("a2", "Mahesh", ApplicationStatus::Approved),
            application("a3", "Kavita", ApplicationStatus::Rejected),
        ]);
        let desk = ApplicationDesk::new(backend.clone());
        desk.refresh().await.unwrap();

        let prompts = std::sync::Mutex::new(Vec::new());
        let confirm = |p: &str| {
            prompts.lock().unwrap().push(p.to_string());
            true
        };
        let ids = vec!["a1".to_string(), "a3".to_string()];
        assert_eq!(desk.bulk_delete(&ids, &confirm).await, DeleteOutcome::Deleted);

        assert_eq!(backend.deleted(), ids);
        assert_eq!(
            prompts.lock().unwrap()[0],
            "Are you sure you want to delete 2 selected application(s)?"
        );
        let left: Vec<_> = desk.items().await.into_iter().map(|a| a.id).collect();
        assert_eq!(left, vec!["a2".to_string()]);
        assert!(!desk.is_busy("a1") && !desk.is_busy("a3"));

        assert_eq!(desk.bulk_delete(&[], &confirm).await, DeleteOutcome::Cancelled);
    }
}
