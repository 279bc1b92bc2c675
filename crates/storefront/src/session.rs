//! Session token storage and sign-in.
//!
//! The bearer token lives in two places: attached to the [`ApiClient`] for
//! outgoing calls, and persisted through a [`TokenStore`] so the session
//! survives restarts. [`SessionManager`] keeps them in step.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use scentbox_core::{Email, EmailError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, User};
use crate::error::{clear_sentry_user, set_sentry_user};

/// Shortest accepted password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors from sign-in and session storage.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Email failed validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// Blank display name.
    #[error("Name is required")]
    MissingName,

    /// The stored token has expired.
    #[error("Session expired, please sign in again")]
    Expired,

    /// No session when one was required.
    #[error("Not signed in")]
    NotSignedIn,

    /// Reading or writing the session file failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The session file is not valid JSON.
    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A persisted session.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub token: SecretString,
    pub user: User,
}

/// On-disk shape of [`StoredSession`].
#[derive(Serialize, Deserialize)]
struct SessionFile {
    token: String,
    user: User,
}

/// Somewhere to keep the session between runs.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Load the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn load(&self) -> Result<Option<StoredSession>, SessionError>;

    /// Persist a session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), SessionError>;

    /// Forget the stored session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn clear(&self) -> Result<(), SessionError>;
}

// =============================================================================
// File Store
// =============================================================================

/// Session kept in a JSON file readable only by the current user.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the session at `path` (typically `session.json` in the session
    /// directory).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: SessionFile = serde_json::from_str(&contents)?;
        Ok(Some(StoredSession {
            token: SecretString::from(file.token),
            user: file.user,
        }))
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_vec_pretty(&SessionFile {
            token: session.token.expose_secret().to_string(),
            user: session.user.clone(),
        })?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(&contents)?;
        file.sync_all()?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Session kept only for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        // A panic while holding the lock cannot leave the Option half-written.
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        Ok(self.lock().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        *self.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.lock() = None;
        Ok(())
    }
}

// =============================================================================
// Token Expiry
// =============================================================================

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Expiry (Unix seconds) encoded in a JWT, if the token is one and has an
/// `exp` claim. The signature is not checked; the server does that.
#[must_use]
pub fn token_expiry(token: &SecretString) -> Option<i64> {
    let payload = token.expose_secret().split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<Claims>(&bytes).ok()?.exp
}

/// Whether a token's `exp` claim is in the past at `now`.
///
/// Tokens without a readable expiry are treated as live.
#[must_use]
pub fn is_expired(token: &SecretString, now: i64) -> bool {
    token_expiry(token).is_some_and(|exp| exp <= now)
}

// =============================================================================
// Session Manager
// =============================================================================

/// Signs in, out, and restores sessions.
#[derive(Debug)]
pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    user: Option<User>,
}

impl SessionManager {
    /// Manage the session of `api`, persisting through `store`.
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            user: None,
        }
    }

    /// The signed-in user, if any.
    ///
    /// Returns `None` once the server has rejected the token, even before
    /// [`Self::logout`] is called.
    pub async fn current_user(&self) -> Option<&User> {
        if self.api.has_token().await {
            self.user.as_ref()
        } else {
            None
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any call is made, or the API error
    /// (`Unauthorized` for wrong credentials).
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<User, SessionError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let response = self.api.login(&email, password).await?;
        self.start(StoredSession {
            token: response.token,
            user: response.user,
        })
        .await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any call is made, or the API error
    /// (`BusinessRule` when the email is taken).
    #[instrument(skip(self, password))]
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::MissingName);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let response = self.api.register(name, &email, password).await?;
        self.start(StoredSession {
            token: response.token,
            user: response.user,
        })
        .await
    }

    /// Resume the persisted session.
    ///
    /// Expired tokens are discarded without a network call. A live token is
    /// checked against `GET /auth/me`; if the backend cannot be reached the
    /// stored user is kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Expired` if the token has expired or the server
    /// rejects it, or a storage error.
    #[instrument(skip(self))]
    pub async fn restore(&mut self) -> Result<Option<User>, SessionError> {
        let Some(stored) = self.store.load()? else {
            return Ok(None);
        };

        if is_expired(&stored.token, chrono::Utc::now().timestamp()) {
            tracing::info!("Stored session expired");
            self.store.clear()?;
            return Err(SessionError::Expired);
        }

        self.api.set_token(stored.token.clone()).await;

        let user = match self.api.me().await {
            Ok(user) => {
                self.store.save(&StoredSession {
                    token: stored.token,
                    user: user.clone(),
                })?;
                user
            }
            Err(ApiError::Unauthorized(_)) => {
                // The client already dropped the token and cleared the store.
                self.user = None;
                return Err(SessionError::Expired);
            }
            Err(e) if e.is_network() => {
                tracing::warn!(error = %e, "Could not refresh user, using stored profile");
                stored.user
            }
            Err(e) => return Err(e.into()),
        };

        set_sentry_user(&user.id, Some(&user.email));
        self.user = Some(user.clone());
        Ok(Some(user))
    }

    /// Sign out locally. The backend keeps no session state to revoke.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted session cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.api.clear_token().await;
        self.user = None;
        clear_sentry_user();
        self.store.clear()
    }

    async fn start(&mut self, session: StoredSession) -> Result<User, SessionError> {
        self.api.set_token(session.token.clone()).await;
        self.store.save(&session)?;

        let user = session.user;
        set_sentry_user(&user.id, Some(&user.email));
        tracing::info!(user_id = %user.id, "Signed in");
        self.user = Some(user.clone());
        Ok(user)
    }
}

fn validate_password(password: &SecretString) -> Result<(), SessionError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(SessionError::WeakPassword);
    }
    Ok(())
}
