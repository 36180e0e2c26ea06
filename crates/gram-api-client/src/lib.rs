//! HTTP client for the village website backend.
//!
//! Two reqwest clients share one session: a short-timeout client for reads and
//! text-only writes, and a long-timeout client for bodies that may carry an
//! image. Every request carries the bearer token; a `401` from any endpoint
//! clears the session process-wide.

pub mod api;
pub mod auth;
pub mod session;

use gram_core::models::ApiEnvelope;
use gram_core::{AppError, ConsoleConfig};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};

/// Which timeout a request runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Reads and small JSON writes
    Standard,
    /// Writes that may embed an encoded image
    Upload,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    upload_client: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        upload_timeout: Duration,
        session: Session,
    ) -> Result<Self, AppError> {
        let build = |timeout: Duration| {
            Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
        };

        Ok(Self {
            client: build(request_timeout)?,
            upload_client: build(upload_timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &ConsoleConfig, session: Session) -> Result<Self, AppError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout(),
            config.upload_timeout(),
            session,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and unwrap the `{success, data, message}` envelope.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        transfer: Transfer,
    ) -> Result<ApiEnvelope<T>, AppError> {
        let client = match transfer {
            Transfer::Standard => &self.client,
            Transfer::Upload => &self.upload_client,
        };
        let url = self.build_url(path);

        let mut request = client.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.apply_auth(request).await;

        tracing::debug!(%method, path, ?transfer, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(e, &method, path))?;

        let response = self.check_status(response, &method, path).await?;
        let text = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, &method, path))?;

        if text.trim().is_empty() {
            return Ok(ApiEnvelope {
                success: true,
                data: None,
                message: None,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            AppError::InvalidResponse(format!("{} {}: {}", method, path, e))
        })
    }

    async fn check_status(
        &self,
        response: Response,
        method: &Method,
        path: &str,
    ) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, path, "Backend rejected the session token; signing out");
            self.session.clear().await;
            return Err(AppError::Unauthorized(format!("{} {}", method, path)));
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str::<ApiEnvelope<Value>>(&text).ok())
            .and_then(|envelope| envelope.message);

        tracing::debug!(%method, path, status = status.as_u16(), ?message, "Request failed");

        Err(AppError::Server {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiEnvelope<T>, AppError> {
        self.request(Method::GET, path, query, None, Transfer::Standard)
            .await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
        transfer: Transfer,
    ) -> Result<ApiEnvelope<T>, AppError> {
        self.request(Method::POST, path, &[], body, transfer).await
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
        transfer: Transfer,
    ) -> Result<ApiEnvelope<T>, AppError> {
        self.request(Method::PUT, path, &[], body, transfer).await
    }

    pub async fn patch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<ApiEnvelope<T>, AppError> {
        self.request(Method::PATCH, path, &[], Some(body), Transfer::Standard)
            .await
    }

    /// DELETE, optionally with a JSON body (bulk deletes)
    pub async fn delete(&self, path: &str, body: Option<&Value>) -> Result<(), AppError> {
        self.request::<Value>(Method::DELETE, path, &[], body, Transfer::Standard)
            .await
            .map(|_| ())
    }
}

/// `/{collection}/{id}` with the id percent-encoded
pub fn item_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, urlencoding::encode(id))
}

fn map_transport_error(err: reqwest::Error, method: &Method, path: &str) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(format!("{} {}", method, path))
    } else {
        AppError::Transport(format!("{} {}: {}", method, path, err))
    }
}
