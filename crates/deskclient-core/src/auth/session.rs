use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::User;
use crate::storage::StorageContext;

/// How often a signed-in session trades its token for a fresh one.
pub const TOKEN_REFRESH_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Signed-in state on top of an `ApiClient` and its storage.
#[derive(Debug)]
pub struct AuthSession {
    client: ApiClient,
    user: Option<User>,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self { client, user: None }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn storage(&self) -> &StorageContext {
        self.client.storage()
    }

    /// The user confirmed by the last login, check or refresh
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Log in and store the token in the scope `remember_me` selects.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<&User, ApiError> {
        let login = self.client.login(username, password).await?;
        self.storage().store_login(&login.token, remember_me)?;
        Ok(&*self.user.insert(login.user))
    }

    /// Validate the stored token with the backend.
    ///
    /// Returns `Ok(None)` when there is no token or the backend rejects it.
    /// A rejected or unverifiable token is wiped from storage.
    pub async fn check_auth(&mut self) -> Result<Option<&User>, ApiError> {
        let Some(resolved) = self.storage().resolve_token()? else {
            debug!("No token found, skipping auth check");
            self.user = None;
            return Ok(None);
        };

        match self.client.current_user(&resolved.token).await {
            Ok(user) => {
                debug!(username = %user.username, source = %resolved.source, "Token valid");
                Ok(Some(&*self.user.insert(user)))
            }
            Err(e) => {
                warn!(error = %e, "Auth check failed, clearing stored token");
                self.storage().clear()?;
                self.user = None;
                Ok(None)
            }
        }
    }

    /// Trade the stored token for a fresh one.
    ///
    /// Returns `Ok(true)` when a new token was stored. Backend or network
    /// failures leave storage alone and return `Ok(false)`.
    pub async fn refresh_token(&mut self) -> Result<bool, ApiError> {
        let Some(resolved) = self.storage().resolve_token()? else {
            return Ok(false);
        };

        match self.client.refresh(&resolved.token).await {
            Ok(refreshed) => {
                let source = self.storage().replace_token(&refreshed.token)?;
                debug!(source = %source, "Token refreshed");
                self.user = Some(refreshed.user);
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                Ok(false)
            }
        }
    }

    /// Forget the token in both scopes and drop the user.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.storage().clear()?;
        if let Some(user) = self.user.take() {
            info!(username = %user.username, "Logged out");
        }
        Ok(())
    }

    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.user
            .as_ref()
            .map(|u| u.has_permission(resource, action))
            .unwrap_or(false)
    }
}

/// Refresh the session's token every `period` until the handle is aborted.
/// The first refresh happens one full period after spawning.
pub fn spawn_refresh_loop(session: Arc<Mutex<AuthSession>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let mut session = session.lock().await;
            if !session.is_authenticated() {
                continue;
            }
            if let Err(e) = session.refresh_token().await {
                warn!(error = %e, "Could not store refreshed token");
            }
        }
    })
}
