//! Sign-in, sign-out and startup token verification

use gram_core::models::{AdminProfile, Credentials, LoginResponse, SetupStatus};
use gram_core::AppError;
use serde_json::Value;

use crate::{ApiClient, Transfer};

/// How a successful sign-in was completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInKind {
    /// First administrator account was created
    Setup,
    Login,
}

impl ApiClient {
    pub async fn setup_status(&self) -> Result<SetupStatus, AppError> {
        self.get::<SetupStatus>("/admin/setup-status", &[])
            .await?
            .into_data()
            .ok_or_else(|| AppError::InvalidResponse("setup status missing".to_string()))
    }

    pub async fn profile(&self) -> Result<AdminProfile, AppError> {
        self.get::<AdminProfile>("/admin/profile", &[])
            .await?
            .into_data()
            .ok_or_else(|| AppError::InvalidResponse("profile missing".to_string()))
    }

    /// Create the first admin account when the backend asks for it, otherwise log in.
    /// The returned token is persisted.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignInKind, AppError> {
        let status = self.setup_status().await?;
        let (path, kind) = if status.setup_required {
            ("/admin/setup", SignInKind::Setup)
        } else {
            ("/admin/login", SignInKind::Login)
        };

        let body = serde_json::to_value(credentials)?;
        let login = self
            .post_json::<LoginResponse>(path, Some(&body), Transfer::Standard)
            .await?
            .into_data()
            .ok_or_else(|| AppError::InvalidResponse("login response missing".to_string()))?;

        tracing::info!(username = %login.admin.username, ?kind, "Signed in");
        self.session().establish(login.token, login.admin).await?;
        Ok(kind)
    }

    /// Startup check: load the stored token and verify it against the profile
    /// endpoint. An invalid token is removed. Returns the profile when valid.
    pub async fn restore_session(&self) -> Result<Option<AdminProfile>, AppError> {
        if !self.session().restore().await {
            return Ok(None);
        }

        match self.profile().await {
            Ok(profile) => {
                self.session().set_admin(profile.clone()).await;
                Ok(Some(profile))
            }
            Err(AppError::Unauthorized(_)) => Ok(None),
            Err(e @ (AppError::Timeout(_) | AppError::Transport(_))) => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Stored token could not be verified; discarding it");
                self.session().clear().await;
                Ok(None)
            }
        }
    }

    /// Best-effort server logout followed by local teardown
    pub async fn sign_out(&self) {
        if self.session().is_authenticated().await {
            if let Err(e) = self
                .post_json::<Value>("/admin/logout", None, Transfer::Standard)
                .await
            {
                tracing::debug!(error = %e, "Server logout failed");
            }
        }
        self.session().clear().await;
        tracing::info!("Signed out");
    }
}
