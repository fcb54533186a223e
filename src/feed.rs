//! Feed client: load a room's posts and submit new ones.
//!
//! DESIGN
//! ======
//! Every load is a full re-fetch that replaces the posts container. Loads
//! may overlap (user clicks, post/reaction follow-ups, the auth observer),
//! so each takes a ticket from a monotonically increasing counter. A
//! response renders only if no later-issued load has rendered already;
//! older responses that finish last are dropped as stale.
//!
//! TRADE-OFFS
//! ==========
//! A newer load that fails leaves whatever an older load rendered. That is
//! preferable to blanking the container on a transient error.

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::auth::{AuthProvider, AuthUser};
use crate::error::ClientError;
use crate::messages;
use crate::net::FeedApi;
use crate::net::types::{CreatePostRequest, RoomId};
use crate::session::SessionHolder;
use crate::view::{FeedContent, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No posts container or no room; nothing was requested.
    Skipped,
    Rendered { posts: usize },
    /// A newer load rendered first; this response was discarded.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Posted,
    NotSignedIn,
    EmptyContent,
    /// The backend answered with an `error` field.
    Rejected(String),
}

pub struct FeedClient {
    api: Arc<dyn FeedApi>,
    auth: Arc<dyn AuthProvider>,
    session: SessionHolder,
    view: Arc<dyn View>,
    room: Option<RoomId>,
    issued: AtomicU64,
    rendered: Mutex<u64>,
}

impl FeedClient {
    #[must_use]
    pub fn new(
        api: Arc<dyn FeedApi>,
        auth: Arc<dyn AuthProvider>,
        session: SessionHolder,
        view: Arc<dyn View>,
        room: Option<RoomId>,
    ) -> Self {
        Self { api, auth, session, view, room, issued: AtomicU64::new(0), rendered: Mutex::new(0) }
    }

    /// Fetch the room's posts and replace the container's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a post list.
    /// The container is left untouched in that case.
    pub async fn load_posts(&self) -> Result<LoadOutcome, ClientError> {
        if !self.view.has_posts_container() {
            return Ok(LoadOutcome::Skipped);
        }
        let Some(room_id) = self.room else {
            return Ok(LoadOutcome::Skipped);
        };

        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let posts = self.api.list_posts(room_id).await.map_err(|e| {
            tracing::warn!(room_id, ticket, error = %e, "post list request failed");
            e
        })?;

        let mut rendered = self
            .rendered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if ticket < *rendered {
            tracing::debug!(room_id, ticket, newest = *rendered, "discarding stale post list");
            return Ok(LoadOutcome::Stale);
        }
        *rendered = ticket;
        self.view.render_posts(&FeedContent::from_posts(&posts));
        tracing::debug!(room_id, ticket, posts = posts.len(), "rendered posts");
        Ok(LoadOutcome::Rendered { posts: posts.len() })
    }

    /// Submit the post input to the current room.
    ///
    /// Requires a session and non-blank content; neither failure touches
    /// the network.
    ///
    /// # Errors
    ///
    /// Returns an error if the bearer token cannot be obtained or the
    /// request fails.
    pub async fn post_content(&self) -> Result<PostOutcome, ClientError> {
        let content = self.view.post_input().trim().to_owned();
        let Some(user) = self.session.current() else {
            self.view.set_status(messages::SIGN_IN_REQUIRED);
            return Ok(PostOutcome::NotSignedIn);
        };
        if content.is_empty() {
            self.view.set_status(messages::EMPTY_CONTENT);
            return Ok(PostOutcome::EmptyContent);
        }

        let id_token = bearer_token(self.auth.as_ref(), self.view.as_ref(), &user).await?;
        let request = CreatePostRequest { id_token, content, room_id: self.room };
        let response = self.api.create_post(&request).await.map_err(|e| {
            tracing::warn!(room_id = ?self.room, error = %e, "post request failed");
            e
        })?;

        if let Some(error) = response.error {
            self.view.set_status(&messages::post_error(&error));
            return Ok(PostOutcome::Rejected(error));
        }

        tracing::info!(room_id = ?self.room, uid = %user.uid, "post submitted");
        self.view.set_status(messages::POST_SUCCEEDED);
        self.view.clear_post_input();
        self.reload_after_write().await;
        Ok(PostOutcome::Posted)
    }

    /// Reload following a successful write. The write already happened, so
    /// a failed reload is only logged.
    pub(crate) async fn reload_after_write(&self) {
        if let Err(e) = self.load_posts().await {
            tracing::warn!(error = %e, "feed reload after write failed");
        }
    }
}

/// Fetch a bearer token for `user`, surfacing provider failures.
pub(crate) async fn bearer_token(
    auth: &dyn AuthProvider,
    view: &dyn View,
    user: &AuthUser,
) -> Result<String, ClientError> {
    match auth.id_token(user).await {
        Ok(token) => Ok(token),
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "bearer token unavailable");
            view.set_status(&messages::error(&e.user_message()));
            Err(e.into())
        }
    }
}
