//! Domain methods for the backend API.
//!
//! Content records (announcements, gallery, awards, members, programs, village
//! details, citizen-service header) go through the generic record methods; the
//! caller supplies the paths. Feedback, applications and notifications have
//! typed methods.

use gram_core::models::{
    ApplicationStatus, ApplicationStatusUpdate, BulkDeleteRequest, Feedback, FeedbackStatus,
    FeedbackStatusUpdate, Notification, Record, ServiceApplication,
};
use gram_core::AppError;
use serde_json::Value;

use crate::{item_path, ApiClient, Transfer};

const FEEDBACK: &str = "/feedback";
const APPLICATIONS: &str = "/nagrik-seva/applications";
const NOTIFICATIONS: &str = "/admin/notifications";

impl ApiClient {
    /// Records at `path`. A missing `data` field is an empty list.
    pub async fn list_records(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<Record>, AppError> {
        Ok(self
            .get::<Vec<Record>>(path, query)
            .await?
            .into_data()
            .unwrap_or_default())
    }

    /// Singleton resource; `None` when the backend has nothing stored
    pub async fn get_singleton(&self, path: &str) -> Result<Option<Record>, AppError> {
        Ok(self.get::<Record>(path, &[]).await?.into_data())
    }

    pub async fn create_record(&self, path: &str, body: &Value) -> Result<Option<Record>, AppError> {
        Ok(self
            .post_json::<Record>(path, Some(body), Transfer::Upload)
            .await?
            .into_data())
    }

    pub async fn update_record(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
    ) -> Result<Option<Record>, AppError> {
        Ok(self
            .put_json::<Record>(&item_path(collection, id), Some(body), Transfer::Upload)
            .await?
            .into_data())
    }

    pub async fn delete_record(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.delete(&item_path(collection, id), None).await
    }

    // Feedback

    pub async fn list_feedback(
        &self,
        status: Option<FeedbackStatus>,
    ) -> Result<Vec<Feedback>, AppError> {
        let query: Vec<(&str, String)> = status
            .map(|s| vec![("status", s.to_string())])
            .unwrap_or_default();
        Ok(self
            .get::<Vec<Feedback>>(FEEDBACK, &query)
            .await?
            .into_data()
            .unwrap_or_default())
    }

    pub async fn update_feedback_status(
        &self,
        id: &str,
        update: &FeedbackStatusUpdate,
    ) -> Result<(), AppError> {
        let body = serde_json::to_value(update)?;
        let path = format!("{}/status", item_path(FEEDBACK, id));
        self.put_json::<Value>(&path, Some(&body), Transfer::Standard)
            .await
            .map(|_| ())
    }

    pub async fn delete_feedback(&self, id: &str) -> Result<(), AppError> {
        self.delete(&item_path(FEEDBACK, id), None).await
    }

    // Citizen-service applications

    pub async fn list_applications(&self) -> Result<Vec<ServiceApplication>, AppError> {
        Ok(self
            .get::<Vec<ServiceApplication>>(APPLICATIONS, &[])
            .await?
            .into_data()
            .unwrap_or_default())
    }

    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), AppError> {
        let body = serde_json::to_value(ApplicationStatusUpdate { status })?;
        let path = format!("{}/status", item_path(APPLICATIONS, id));
        self.patch_json::<Value>(&path, &body).await.map(|_| ())
    }

    pub async fn delete_application(&self, id: &str) -> Result<(), AppError> {
        self.delete(&item_path(APPLICATIONS, id), None).await
    }

    pub async fn delete_applications(&self, ids: &[String]) -> Result<(), AppError> {
        let body = serde_json::to_value(BulkDeleteRequest { ids: ids.to_vec() })?;
        self.delete(APPLICATIONS, Some(&body)).await
    }

    // Notifications

    pub async fn list_notifications(&self) -> Result<Vec<Notification>, AppError> {
        Ok(self
            .get::<Vec<Notification>>(NOTIFICATIONS, &[])
            .await?
            .into_data()
            .unwrap_or_default())
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), AppError> {
        let path = format!("{}/read", item_path(NOTIFICATIONS, id));
        self.put_json::<Value>(&path, None, Transfer::Standard)
            .await
            .map(|_| ())
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), AppError> {
        let path = format!("{}/read-all", NOTIFICATIONS);
        self.put_json::<Value>(&path, None, Transfer::Standard)
            .await
            .map(|_| ())
    }

    pub async fn delete_notification(&self, id: &str) -> Result<(), AppError> {
        self.delete(&item_path(NOTIFICATIONS, id), None).await
    }
}
