//! Session holder shared by the auth bridge, feed, and reaction clients.
//!
//! SYSTEM CONTEXT
//! ==============
//! The auth bridge is the only writer. Feed and reaction clients read it to
//! gate writes: no session, no network call.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::{Arc, RwLock};

use crate::auth::AuthUser;

/// Current authenticated identity, or its absence. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct SessionHolder {
    inner: Arc<RwLock<Option<AuthUser>>>,
}

impl SessionHolder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current identity.
    #[must_use]
    pub fn current(&self) -> Option<AuthUser> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    /// Replace the identity wholesale.
    pub fn set(&self, user: Option<AuthUser>) {
        *self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = user;
    }

    pub fn clear(&self) {
        self.set(None);
    }
}
