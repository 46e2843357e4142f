//! Authentication provider: who is logged in, and where to go when the
//! session dies

use instadmin_client::{ApiClient, Session, SessionEvent};
use instadmin_core::types::Admin;
use instadmin_core::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

/// Login state shared by every dashboard view
#[derive(Debug, Clone)]
pub struct AuthProvider {
    client: ApiClient,
    admin: Arc<RwLock<Option<Admin>>>,
    redirect: Arc<Mutex<Option<String>>>,
    events: Arc<Mutex<broadcast::Receiver<SessionEvent>>>,
}

impl AuthProvider {
    /// Wrap a client; session events are observed from this point on
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let events = client.session().subscribe();
        Self {
            client,
            admin: Arc::new(RwLock::new(None)),
            redirect: Arc::new(Mutex::new(None)),
            events: Arc::new(Mutex::new(events)),
        }
    }

    /// Client requests are made with
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Underlying authentication context
    #[must_use]
    pub fn session(&self) -> &Session {
        self.client.session()
    }

    /// Restore a persisted session and load the admin profile
    ///
    /// Returns `None` when there is no usable session. A token the backend
    /// no longer accepts is cleared rather than reported as an error.
    ///
    /// # Errors
    ///
    /// Returns transport and server errors other than 401.
    pub async fn initialize(&self) -> Result<Option<Admin>> {
        if !self.session().restore().await? {
            debug!("No stored session");
            return Ok(None);
        }

        match self.refresh_admin().await {
            Ok(admin) => Ok(Some(admin)),
            Err(Error::Unauthorized) => {
                info!("Stored session is no longer valid");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Log in and load the admin profile
    ///
    /// # Errors
    ///
    /// Returns the login or profile error; on a failed profile fetch the
    /// session keeps its token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Admin> {
        self.client.login(username, password).await?;
        let admin = self.refresh_admin().await?;
        info!(email = %admin.email, "Logged in");
        Ok(admin)
    }

    /// Log out and forget the admin profile
    ///
    /// # Errors
    ///
    /// Returns an error if the stored token cannot be removed.
    pub async fn logout(&self) -> Result<()> {
        self.admin.write().take();
        self.client.logout().await
    }

    /// Re-fetch the admin profile
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when the session is rejected.
    pub async fn refresh_admin(&self) -> Result<Admin> {
        let admin = self.client.me().await?;
        // Earlier logout events must not clear the fresh profile
        self.sync_events();
        *self.admin.write() = Some(admin.clone());
        Ok(admin)
    }

    /// Whether a usable token is held
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.sync_events();
        self.session().is_authenticated()
    }

    /// Profile of the logged-in admin, if loaded
    #[must_use]
    pub fn current_admin(&self) -> Option<Admin> {
        self.sync_events();
        self.admin.read().clone()
    }

    /// Route the operator must be sent to, consumed on read
    #[must_use]
    pub fn take_redirect(&self) -> Option<String> {
        self.sync_events();
        self.redirect.lock().take()
    }

    /// Apply session events received since the last call
    fn sync_events(&self) {
        let mut events = self.events.lock();
        loop {
            match events.try_recv() {
                Ok(SessionEvent::Expired { redirect_to }) => {
                    warn!(%redirect_to, "Session expired");
                    self.admin.write().take();
                    *self.redirect.lock() = Some(redirect_to);
                }
                Ok(SessionEvent::LoggedOut) => {
                    self.admin.write().take();
                }
                Ok(SessionEvent::LoggedIn) => {
                    self.redirect.lock().take();
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Session event receiver lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}
