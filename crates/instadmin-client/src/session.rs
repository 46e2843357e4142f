//! Authentication context: the bearer token, where it is persisted, and
//! the events emitted when it changes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use instadmin_core::config::SessionConfig;
use instadmin_core::types::Token;
use instadmin_core::{Error, Result};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of the session event channel
const EVENT_CAPACITY: usize = 16;

/// A bearer token as persisted between runs
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    /// Opaque access token
    pub access_token: String,
    /// Token scheme, normally `bearer`
    pub token_type: String,
    /// When the token was obtained
    pub issued_at: DateTime<Utc>,
    /// When the backend will stop accepting it, if known
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Build from a login response received at `now`
    ///
    /// A lifetime too large to represent is treated as no expiry.
    #[must_use]
    pub fn from_token(token: &Token, now: DateTime<Utc>) -> Self {
        let expires_at = token
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));

        Self {
            access_token: token.access_token.clone(),
            token_type: token.token_type.clone(),
            issued_at: now,
            expires_at,
        }
    }

    /// Whether the token is past its expiry at `now`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// Value for the `Authorization` header
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Persistent storage for the session token
#[async_trait]
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Load a previously saved token
    async fn load(&self) -> Result<Option<StoredToken>>;

    /// Persist a token, replacing any previous one
    async fn save(&self, token: &StoredToken) -> Result<()>;

    /// Remove the persisted token
    async fn clear(&self) -> Result<()>;
}

/// Token store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<StoredToken>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| Error::Storage(format!("{}: {e}", self.path.display())))
    }

    async fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(token)?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).await?;

        // A file left by an older run keeps its mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
        }

        file.write_all(&body).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), "Saved session token");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Token store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<StoredToken>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<StoredToken>> {
        Ok(self.token.lock().clone())
    }

    async fn save(&self, token: &StoredToken) -> Result<()> {
        *self.token.lock() = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.lock() = None;
        Ok(())
    }
}

/// Session state changes observers can react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A token was obtained
    LoggedIn,
    /// The operator logged out
    LoggedOut,
    /// The API rejected the token; the operator must log in again
    Expired {
        /// Route to send the operator to
        redirect_to: String,
    },
}

struct SessionInner {
    token: RwLock<Option<StoredToken>>,
    store: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
    login_route: String,
}

/// Explicit authentication context shared by everything that talks to the API
///
/// Cloning is cheap; all clones observe the same token.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("store", &self.inner.store)
            .field("login_route", &self.inner.login_route)
            .finish()
    }
}

impl Session {
    /// Create a session over the given store
    pub fn new(store: Arc<dyn TokenStore>, login_route: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(None),
                store,
                events,
                login_route: login_route.into(),
            }),
        }
    }

    /// Create a session persisting to the configured token file
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            Arc::new(FileTokenStore::new(config.token_file.clone())),
            config.login_route.clone(),
        )
    }

    /// Create a session that is never persisted
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()), "/login")
    }

    /// Load a persisted token, returning whether a usable one was found
    ///
    /// Unreadable or expired tokens are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if a stale token cannot be removed from the store.
    pub async fn restore(&self) -> Result<bool> {
        let loaded = match self.inner.store.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Discarding unreadable session token: {e}");
                self.inner.store.clear().await?;
                None
            }
        };

        match loaded {
            Some(token) if !token.is_expired(Utc::now()) => {
                *self.inner.token.write() = Some(token);
                debug!("Restored session token");
                Ok(true)
            }
            Some(_) => {
                info!("Persisted session token has expired");
                self.inner.store.clear().await?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Install a freshly issued token and persist it
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted.
    pub async fn establish(&self, token: &Token) -> Result<()> {
        let stored = StoredToken::from_token(token, Utc::now());
        self.inner.store.save(&stored).await?;
        *self.inner.token.write() = Some(stored);
        self.emit(SessionEvent::LoggedIn);
        info!("Session established");
        Ok(())
    }

    /// Drop the token at the operator's request
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token cannot be removed.
    pub async fn logout(&self) -> Result<()> {
        self.inner.token.write().take();
        self.inner.store.clear().await?;
        self.emit(SessionEvent::LoggedOut);
        info!("Logged out");
        Ok(())
    }

    /// Drop the token because the API rejected it, and signal a redirect
    /// to the login route
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token cannot be removed. The
    /// in-memory token is cleared and the event is emitted regardless.
    pub async fn expire(&self) -> Result<()> {
        self.inner.token.write().take();
        let cleared = self.inner.store.clear().await;
        self.emit(SessionEvent::Expired {
            redirect_to: self.inner.login_route.clone(),
        });
        cleared
    }

    /// The current token, unless absent or past its expiry
    #[must_use]
    pub fn token(&self) -> Option<StoredToken> {
        self.inner
            .token
            .read()
            .as_ref()
            .filter(|token| !token.is_expired(Utc::now()))
            .cloned()
    }

    /// `Authorization` header value for the current token
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|token| token.authorization())
    }

    /// Whether a usable token is held
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Route the operator is sent to when the session expires
    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.inner.login_route
    }

    /// Subscribe to session events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn token(expires_in: Option<u64>) -> Token {
        Token {
            access_token: "secret-token".to_string(),
            token_type: "bearer".to_string(),
            expires_in,
        }
    }

    #[test]
    fn test_stored_token_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let stored = StoredToken::from_token(&token(Some(1800)), now);

        assert_eq!(stored.expires_at, Some(now + Duration::seconds(1800)));
        assert!(!stored.is_expired(now + Duration::seconds(1799)));
        assert!(stored.is_expired(now + Duration::seconds(1800)));

        let no_expiry = StoredToken::from_token(&token(None), now);
        assert!(!no_expiry.is_expired(now + Duration::days(365)));
    }

    #[test]
    fn test_huge_lifetime_means_no_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        for expires_in in [300_000_000_000_000, 9_000_000_000_000_000, 9_300_000_000_000_000, u64::MAX] {
            let stored = StoredToken::from_token(&token(Some(expires_in)), now);
            assert_eq!(stored.expires_at, None, "expires_in = {expires_in}");
            assert!(!stored.is_expired(now));
        }
    }

    #[test]
    fn test_stored_token_debug_redacts_secret() {
        let stored = StoredToken::from_token(&token(None), Utc::now());
        let debug = format!("{stored:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
        assert_eq!(stored.authorization(), "Bearer secret-token");
    }

    #[tokio::test]
    async fn test_establish_and_logout() {
        let session = Session::in_memory();
        let mut events = session.subscribe();
        assert!(!session.is_authenticated());

        session.establish(&token(Some(3600))).await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.bearer().as_deref(), Some("Bearer secret-token"));
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedIn);

        session.logout().await.unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
    }

    #[tokio::test]
    async fn test_expire_clears_store_and_signals_redirect() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = Session::new(store.clone(), "/login");
        let mut events = session.subscribe();

        session.establish(&token(None)).await.unwrap();
        let _ = events.recv().await;
        assert!(store.load().await.unwrap().is_some());

        session.expire().await.unwrap();

        assert!(!session.is_authenticated());
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Expired {
                redirect_to: "/login".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let session = Session::in_memory();
        let other = session.clone();

        session.establish(&token(None)).await.unwrap();
        assert!(other.is_authenticated());

        other.expire().await.unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileTokenStore::new(&path);

        assert!(store.load().await.unwrap().is_none());

        let stored = StoredToken::from_token(&token(Some(60)), Utc::now());
        store.save(&stored).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.load().await.unwrap(), Some(stored));

        store.clear().await.unwrap();
        assert!(!path.exists());
        // Clearing twice is not an error
        store.clear().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::new(&path);
        let stored = StoredToken::from_token(&token(None), Utc::now());

        store.save(&stored).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // A world-readable file from elsewhere is tightened before the token lands
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        store.save(&stored).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_restore_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let first = Session::new(Arc::new(FileTokenStore::new(&path)), "/login");
        first.establish(&token(Some(3600))).await.unwrap();

        let second = Session::new(Arc::new(FileTokenStore::new(&path)), "/login");
        assert!(!second.is_authenticated());
        assert!(second.restore().await.unwrap());
        assert_eq!(second.bearer().as_deref(), Some("Bearer secret-token"));
    }

    #[tokio::test]
    async fn test_restore_discards_expired_and_corrupt_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::new(&path);

        let expired = StoredToken {
            access_token: "old".to_string(),
            token_type: "bearer".to_string(),
            issued_at: Utc::now() - Duration::hours(2),
            expires_at: Some(Utc::now() - Duration::hours(1)),
        };
        store.save(&expired).await.unwrap();

        let session = Session::new(Arc::new(store.clone()), "/login");
        assert!(!session.restore().await.unwrap());
        assert!(!path.exists());

        tokio::fs::write(&path, b"not json").await.unwrap();
        assert!(!session.restore().await.unwrap());
        assert!(!path.exists());
    }
}
