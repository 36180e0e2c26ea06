//! Administrator session
//!
//! One `Session` is shared by every client clone in the process. It owns the
//! bearer token (memory + durable store) and the profile of the signed-in
//! administrator. Clearing it is the process-wide logout.

use async_trait::async_trait;
use gram_core::models::AdminProfile;
use gram_core::AppError;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

/// Durable storage for the bearer token. The token is the only thing persisted.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, AppError>;
    async fn save(&self, token: &str) -> Result<(), AppError>;
    async fn remove(&self) -> Result<(), AppError>;
}

/// Token kept in a single file, created readable only by the owner on unix
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).await?;

        // mode only applies on creation; tighten a file that already existed
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
        }

        file.write_all(token.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn remove(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        *self.token.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn remove(&self) -> Result<(), AppError> {
        *self.token.lock().await = None;
        Ok(())
    }
}

struct SessionState {
    token: Option<String>,
    admin: Option<AdminProfile>,
}

#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    store: Arc<dyn TokenStore>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Empty session backed by `store`. Call [`Session::restore`] to pick up a saved token.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState {
                token: None,
                admin: None,
            })),
            store,
        }
    }

    /// Load the persisted token into memory. An unreadable store counts as signed out.
    pub async fn restore(&self) -> bool {
        let token = match self.store.load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                None
            }
        };
        let found = token.is_some();
        self.state.write().await.token = token;
        found
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    pub async fn admin(&self) -> Option<AdminProfile> {
        self.state.read().await.admin.clone()
    }

    pub async fn set_admin(&self, admin: AdminProfile) {
        self.state.write().await.admin = Some(admin);
    }

    /// Persist `token` and mark `admin` as signed in
    pub async fn establish(&self, token: String, admin: AdminProfile) -> Result<(), AppError> {
        self.store.save(&token).await?;
        let mut state = self.state.write().await;
        state.token = Some(token);
        state.admin = Some(admin);
        Ok(())
    }

    /// Process-wide logout: forget the token in memory and in the store
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.token = None;
            state.admin = None;
        }
        if let Err(e) = self.store.remove().await {
            tracing::warn!(error = %e, "Failed to remove stored token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminProfile {
        serde_json::from_value(serde_json::json!({ "username": "sarpanch" })).unwrap()
    }

    #[tokio::test]
    async fn file_store_persists_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("token"));

        assert_eq!(store.load().await.unwrap(), None);
        store.save("abc.def").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("abc.def"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        store.remove().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // removing twice is fine
        store.remove().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn save_tightens_existing_token_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "old-token-that-is-longer").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileTokenStore::new(&path);
        store.save("new").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn blank_token_file_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(FileTokenStore::new(path).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn restore_establish_clear() {
        let store = Arc::new(MemoryTokenStore::with_token("saved"));
        let session = Session::new(store.clone());

        assert!(!session.is_authenticated().await);
        assert!(session.restore().await);
        assert_eq!(session.token().await.as_deref(), Some("saved"));

        session.establish("fresh".to_string(), admin()).await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("fresh"));
        assert_eq!(session.admin().await.unwrap().username, "sarpanch");

        session.clear().await;
        assert!(!session.is_authenticated().await);
        assert!(session.admin().await.is_none());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let session = Session::new(Arc::new(MemoryTokenStore::default()));
        let other = session.clone();
        session.establish("t".to_string(), admin()).await.unwrap();
        assert!(other.is_authenticated().await);
        other.clear().await;
        assert!(!session.is_authenticated().await);
    }
}
