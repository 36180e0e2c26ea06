//! Seams between the controllers and the HTTP client.
//!
//! Controllers only see these traits; [`ApiClient`] implements all of them.

use async_trait::async_trait;
use gram_api_client::ApiClient;
use gram_core::models::{
    ApplicationStatus, Feedback, FeedbackStatus, FeedbackStatusUpdate, Record,
    ServiceApplication,
};
use gram_core::AppError;
use serde_json::Value;

use crate::descriptor::ContentDescriptor;

#[async_trait]
pub trait RecordBackend: Send + Sync {
    async fn list(
        &self,
        descriptor: &ContentDescriptor,
        query: &[(String, String)],
    ) -> Result<Vec<Record>, AppError>;

    async fn create(&self, descriptor: &ContentDescriptor, body: Value) -> Result<(), AppError>;

    async fn update(
        &self,
        descriptor: &ContentDescriptor,
        id: &str,
        body: Value,
    ) -> Result<(), AppError>;

    async fn delete(&self, descriptor: &ContentDescriptor, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait FeedbackBackend: Send + Sync {
    async fn list_feedback(&self, status: Option<FeedbackStatus>) -> Result<Vec<Feedback>, AppError>;
    async fn update_feedback_status(
        &self,
        id: &str,
        update: FeedbackStatusUpdate,
    ) -> Result<(), AppError>;
    async fn delete_feedback(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ApplicationBackend: Send + Sync {
    async fn list_applications(&self) -> Result<Vec<ServiceApplication>, AppError>;
    async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), AppError>;
    async fn delete_application(&self, id: &str) -> Result<(), AppError>;
    async fn delete_applications(&self, ids: &[String]) -> Result<(), AppError>;
}

#[async_trait]
impl RecordBackend for ApiClient {
    async fn list(
        &self,
        descriptor: &ContentDescriptor,
        query: &[(String, String)],
    ) -> Result<Vec<Record>, AppError> {
        if descriptor.singleton {
            return Ok(self
                .get_singleton(descriptor.list_path)
                .await?
                .into_iter()
                .collect());
        }
        let query: Vec<(&str, String)> = query
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        self.list_records(descriptor.list_path, &query).await
    }

    async fn create(&self, descriptor: &ContentDescriptor, body: Value) -> Result<(), AppError> {
        self.create_record(descriptor.collection, &body).await.map(|_| ())
    }

    async fn update(
        &self,
        descriptor: &ContentDescriptor,
        id: &str,
        body: Value,
    ) -> Result<(), AppError> {
        if descriptor.singleton {
            // the header is replaced wholesale through the collection endpoint
            return self.create(descriptor, body).await;
        }
        self.update_record(descriptor.collection, id, &body)
            .await
            .map(|_| ())
    }

    async fn delete(&self, descriptor: &ContentDescriptor, id: &str) -> Result<(), AppError> {
        if descriptor.singleton {
            return ApiClient::delete(self, descriptor.collection, None).await;
        }
        self.delete_record(descriptor.collection, id).await
    }
}

#[async_trait]
impl FeedbackBackend for ApiClient {
    async fn list_feedback(&self, status: Option<FeedbackStatus>) -> Result<Vec<Feedback>, AppError> {
        ApiClient::list_feedback(self, status).await
    }

    async fn update_feedback_status(
        &self,
        id: &str,
        update: FeedbackStatusUpdate,
    ) -> Result<(), AppError> {
        ApiClient::update_feedback_status(self, id, &update).await
    }

    async fn delete_feedback(&self, id: &str) -> Result<(), AppError> {
        ApiClient::delete_feedback(self, id).await
    }
}

#[async_trait]
impl ApplicationBackend for ApiClient {
    async fn list_applications(&self) -> Result<Vec<ServiceApplication>, AppError> {
        ApiClient::list_applications(self).await
    }

    async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), AppError> {
        ApiClient::update_application_status(self, id, status).await
    }

    async fn delete_application(&self, id: &str) -> Result<(), AppError> {
        ApiClient::delete_application(self, id).await
    }

    async fn delete_applications(&self, ids: &[String]) -> Result<(), AppError> {
        ApiClient::delete_applications(self, ids).await
    }
}
