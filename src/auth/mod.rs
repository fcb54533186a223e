//! Authentication provider abstraction.
//!
//! DESIGN
//! ======
//! `AuthProvider` covers the email/password operations the client needs and
//! exposes sign-in status as an observable (`AuthEvents`). Observers get the
//! current status immediately on subscribe and every change after that, so
//! an observer registered once at startup always fires at least once.
//!
//! `firebase` is the production implementation; tests substitute a mock.

pub mod bridge;
pub mod firebase;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

// =============================================================================
// IDENTITY
// =============================================================================

/// The authenticated identity backing a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// The provider rejected the request. `message` is user-facing.
    #[error("{message}")]
    Provider { code: String, message: String },

    /// No user is signed in, or the user is no longer the current one.
    #[error("no user is signed in")]
    NotSignedIn,

    /// The HTTP request to the provider failed.
    #[error("auth request failed: {0}")]
    Request(String),

    /// The provider response body could not be deserialized.
    #[error("auth response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Persisting or restoring the provider credential failed.
    #[error("auth persistence failed: {0}")]
    Persistence(String),
}

impl AuthError {
    /// Text shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Sign-in status broadcaster owned by a provider.
#[derive(Debug)]
pub struct AuthEvents {
    tx: watch::Sender<Option<AuthUser>>,
}

impl AuthEvents {
    #[must_use]
    pub fn new(initial: Option<AuthUser>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Publish a new status. Observers are woken even when the value is
    /// unchanged, matching a provider that re-notifies on every transition.
    pub fn publish(&self, user: Option<AuthUser>) {
        self.tx.send_replace(user);
    }

    #[must_use]
    pub fn current(&self) -> Option<AuthUser> {
        self.tx.borrow().clone()
    }

    /// Subscribe to status changes. The receiver's current value is unseen,
    /// so the first `changed()` resolves immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();
        rx
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new(None)
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

/// Email/password authentication provider.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account. Does not sign the new user in.
    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Sign in and publish the new status to observers.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Sign out and publish the signed-out status to observers.
    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Return a valid bearer token for `user`, refreshing if needed.
    async fn id_token(&self, user: &AuthUser) -> Result<String, AuthError>;

    /// Subscribe to sign-in status. See [`AuthEvents::subscribe`].
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}
