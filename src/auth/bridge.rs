//! Auth bridge: provider calls in, session/storage/view updates out.
//!
//! SYSTEM CONTEXT
//! ==============
//! The bridge is the only writer of the session holder and of the `idToken`
//! and `uid` storage entries. Its state-change observer is what reveals the
//! app section and triggers the first feed load; user-initiated operations
//! only report their own result.
//!
//! ERROR HANDLING
//! ==============
//! Provider failures are terminal and user-facing: their message goes to
//! the status line (or an alert for password reset) and the operation
//! reports `Failed`. Storage and token failures inside the observer are
//! logged and do not stop the view transition.
//!
//! CONCURRENCY
//! ===========
//! A signed-in notification updates the view synchronously and spawns the
//! token persist and feed reload. The observer never waits on that work, so
//! a sign-out that arrives mid-reload is applied at once and aborts it.

#[cfg(test)]
#[path = "bridge_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::{AuthProvider, AuthUser};
use crate::feed::FeedClient;
use crate::messages;
use crate::session::SessionHolder;
use crate::storage::{ID_TOKEN_KEY, KeyValueStore, UID_KEY};
use crate::view::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    Done,
    /// The provider rejected the call; carries its message.
    Failed(String),
    /// Password reset was requested without an email.
    MissingEmail,
}

pub struct AuthBridge {
    auth: Arc<dyn AuthProvider>,
    session: SessionHolder,
    store: Arc<dyn KeyValueStore>,
    view: Arc<dyn View>,
    feed: Option<Arc<FeedClient>>,
    rooms_route: String,
}

impl AuthBridge {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        session: SessionHolder,
        store: Arc<dyn KeyValueStore>,
        view: Arc<dyn View>,
        rooms_route: impl Into<String>,
    ) -> Self {
        Self { auth, session, store, view, feed: None, rooms_route: rooms_route.into() }
    }

    /// Attach the feed client reloaded on sign-in.
    #[must_use]
    pub fn with_feed(mut self, feed: Arc<FeedClient>) -> Self {
        self.feed = Some(feed);
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionHolder {
        &self.session
    }

    // =========================================================================
    // USER OPERATIONS
    // =========================================================================

    /// Create an account. The user still has to sign in afterwards.
    pub async fn sign_up(&self, email: &str, password: &str) -> BridgeOutcome {
        match self.auth.create_user(email, password).await {
            Ok(user) => {
                tracing::info!(uid = %user.uid, "account created");
                self.view.set_status(messages::SIGN_UP_SUCCEEDED);
                BridgeOutcome::Done
            }
            Err(e) => {
                let message = e.user_message();
                self.view.set_status(&messages::error(&message));
                BridgeOutcome::Failed(message)
            }
        }
    }

    /// Sign in, then navigate to the rooms route.
    pub async fn sign_in(&self, email: &str, password: &str) -> BridgeOutcome {
        match self.auth.sign_in(email, password).await {
            Ok(user) => {
                tracing::info!(uid = %user.uid, "signed in");
                self.session.set(Some(user));
                self.view.set_status(messages::SIGN_IN_SUCCEEDED);
                self.view.navigate(&self.rooms_route);
                BridgeOutcome::Done
            }
            Err(e) => {
                let message = e.user_message();
                self.view.set_status(&messages::sign_in_error(&message));
                BridgeOutcome::Failed(message)
            }
        }
    }

    pub async fn sign_out(&self) -> BridgeOutcome {
        match self.auth.sign_out().await {
            Ok(()) => {
                self.session.clear();
                self.forget_credentials();
                self.view.set_status(messages::SIGNED_OUT);
                self.view.hide_app();
                BridgeOutcome::Done
            }
            Err(e) => {
                let message = e.user_message();
                self.view.set_status(&messages::error(&message));
                BridgeOutcome::Failed(message)
            }
        }
    }

    /// Send a password reset email. Reports through alerts, not status.
    pub async fn reset_password(&self, email: &str) -> BridgeOutcome {
        let email = email.trim();
        if email.is_empty() {
            self.view.alert(messages::EMAIL_REQUIRED);
            return BridgeOutcome::MissingEmail;
        }
        match self.auth.send_password_reset(email).await {
            Ok(()) => {
                self.view.alert(messages::RESET_EMAIL_SENT);
                BridgeOutcome::Done
            }
            Err(e) => {
                let message = e.user_message();
                self.view.alert(&messages::error(&message));
                BridgeOutcome::Failed(message)
            }
        }
    }

    // =========================================================================
    // STATE OBSERVER
    // =========================================================================

    /// Apply a sign-in status notification from the provider.
    ///
    /// Session, view, and status update immediately. When signed in, the
    /// token persist and the feed reload run on a spawned task whose handle
    /// is returned; dropping it leaves the work running detached.
    pub fn handle_state_change(&self, user: Option<AuthUser>) -> Option<JoinHandle<()>> {
        self.session.set(user.clone());
        match user {
            Some(user) => {
                self.view.show_app();
                self.view.set_status(&messages::signed_in_as(&user.email));
                Some(self.spawn_signed_in_work(user))
            }
            None => {
                self.view.hide_app();
                self.view.set_status(messages::PROMPT_SIGN_IN);
                self.forget_credentials();
                None
            }
        }
    }

    /// Apply the provider's current status once and wait for its
    /// background work.
    pub async fn sync(&self) {
        let current = self.auth.subscribe().borrow().clone();
        if let Some(work) = self.handle_state_change(current) {
            if let Err(e) = work.await {
                tracing::warn!(error = %e, "sign-in background work failed");
            }
        }
    }

    /// Follow provider notifications until the provider goes away. The
    /// first notification is the status at subscription time. Pending
    /// background work from the previous notification is aborted.
    pub async fn observe(&self) {
        let mut rx = self.auth.subscribe();
        let mut pending: Option<JoinHandle<()>> = None;
        while rx.changed().await.is_ok() {
            let user = rx.borrow_and_update().clone();
            if let Some(previous) = pending.take() {
                previous.abort();
            }
            pending = self.handle_state_change(user);
        }
        tracing::debug!("auth state observer finished");
    }

    /// Run [`AuthBridge::observe`] on a background task.
    pub fn spawn_observer(self: &Arc<Self>) -> JoinHandle<()> {
        let bridge = Arc::clone(self);
        tokio::spawn(async move { bridge.observe().await })
    }

    fn spawn_signed_in_work(&self, user: AuthUser) -> JoinHandle<()> {
        let auth = Arc::clone(&self.auth);
        let store = Arc::clone(&self.store);
        let session = self.session.clone();
        let feed = self.feed.clone();
        tokio::spawn(async move {
            let persist = persist_credentials(auth.as_ref(), store.as_ref(), &session, &user);
            let reload = async {
                if let Some(feed) = &feed {
                    if let Err(e) = feed.load_posts().await {
                        tracing::warn!(error = %e, "initial feed load failed");
                    }
                }
            };
            tokio::join!(persist, reload);
        })
    }

    fn forget_credentials(&self) {
        let removed = self
            .store
            .remove(ID_TOKEN_KEY)
            .and_then(|()| self.store.remove(UID_KEY));
        if let Err(e) = removed {
            tracing::warn!(error = %e, "could not remove persisted credentials");
        }
    }
}

async fn persist_credentials(
    auth: &dyn AuthProvider,
    store: &dyn KeyValueStore,
    session: &SessionHolder,
    user: &AuthUser,
) {
    let token = match auth.id_token(user).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "could not fetch token to persist");
            return;
        }
    };
    // A sign-out may have landed while the token was in flight.
    if session.current().as_ref() != Some(user) {
        tracing::debug!(uid = %user.uid, "session changed; not persisting token");
        return;
    }
    let stored = store
        .set(ID_TOKEN_KEY, &token)
        .and_then(|()| store.set(UID_KEY, &user.uid));
    if let Err(e) = stored {
        tracing::warn!(uid = %user.uid, error = %e, "could not persist credentials");
    }
}
