use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use crate::driver::cancellable;
use crate::driver::error::{DriverError, Result};

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { token: String },
    /// A sign-in was rejected. Nothing is retried until new credentials arrive.
    Fatal { reason: String },
}

/// Exchanges credentials for a bearer token against a provider's auth endpoint.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: &Credentials, cancel: &CancellationToken) -> Result<String>;
}

/// Per-account credentials and access token.
///
/// Sign-ins are serialized: while one is in flight, other callers wait and
/// then reuse its token instead of signing in again. A waiter whose `cancel`
/// fires stops waiting with `Cancelled`.
pub struct Session {
    credentials: RwLock<Credentials>,
    state: RwLock<SessionState>,
    login_flight: Mutex<()>,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Session {
            credentials: RwLock::new(credentials),
            state: RwLock::new(SessionState::Unauthenticated),
            login_flight: Mutex::new(()),
        }
    }

    /// Starts from a token obtained elsewhere.
    pub fn with_token(credentials: Credentials, token: impl Into<String>) -> Self {
        Session {
            credentials: RwLock::new(credentials),
            state: RwLock::new(SessionState::Authenticated { token: token.into() }),
            login_flight: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Current token, signing in first if the session has never been used.
    pub async fn token(&self, auth: &dyn Authenticator, cancel: &CancellationToken) -> Result<String> {
        let state = self.state.read().await.clone();
        match state {
            SessionState::Authenticated { token } => Ok(token),
            SessionState::Fatal { reason } => Err(DriverError::AuthFailed(reason)),
            SessionState::Unauthenticated => self.sign_in(None, auth, cancel).await,
        }
    }

    /// Replaces `stale`, which the provider just rejected. If another caller
    /// already replaced it, their token is returned without a new sign-in.
    pub async fn refresh(&self, stale: &str, auth: &dyn Authenticator, cancel: &CancellationToken) -> Result<String> {
        self.sign_in(Some(stale), auth, cancel).await
    }

    /// Installs new credentials, leaving `Fatal` behind.
    pub async fn reprovision(&self, credentials: Credentials) {
        let _flight = self.login_flight.lock().await;
        *self.credentials.write().await = credentials;
        *self.state.write().await = SessionState::Unauthenticated;
    }

    async fn sign_in(&self, stale: Option<&str>, auth: &dyn Authenticator, cancel: &CancellationToken) -> Result<String> {
        let _flight = cancellable(cancel, async { Ok(self.login_flight.lock().await) }).await?;
        let state = self.state.read().await.clone();
        match state {
            SessionState::Fatal { reason } => return Err(DriverError::AuthFailed(reason)),
            SessionState::Authenticated { token } if stale != Some(token.as_str()) => return Ok(token),
            _ => {}
        }
        let credentials = self.credentials.read().await.clone();
        match auth.login(&credentials, cancel).await {
            Ok(token) => {
                info!(username = %credentials.username, "signed in");
                *self.state.write().await = SessionState::Authenticated { token: token.clone() };
                Ok(token)
            }
            Err(e @ (DriverError::Transport(_) | DriverError::Cancelled)) => Err(e),
            Err(e) => {
                let reason = e.to_string();
                warn!(username = %credentials.username, "sign in rejected: {}", reason);
                *self.state.write().await = SessionState::Fatal { reason: reason.clone() };
                Err(DriverError::AuthFailed(reason))
            }
        }
    }
}
