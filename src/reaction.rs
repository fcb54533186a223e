//! Reaction client: submit a like/heart for a post, then reload the feed.

#[cfg(test)]
#[path = "reaction_test.rs"]
mod tests;

use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::error::ClientError;
use crate::feed::{FeedClient, bearer_token};
use crate::messages;
use crate::net::FeedApi;
use crate::net::types::{PostId, ReactionKind, ReactionRequest};
use crate::session::SessionHolder;
use crate::view::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionOutcome {
    Accepted,
    NotSignedIn,
    /// Anything other than `{"result": "ok"}`; carries the shown message.
    Rejected(String),
}

pub struct ReactionClient {
    api: Arc<dyn FeedApi>,
    auth: Arc<dyn AuthProvider>,
    session: SessionHolder,
    view: Arc<dyn View>,
    feed: Arc<FeedClient>,
}

impl ReactionClient {
    #[must_use]
    pub fn new(
        api: Arc<dyn FeedApi>,
        auth: Arc<dyn AuthProvider>,
        session: SessionHolder,
        view: Arc<dyn View>,
        feed: Arc<FeedClient>,
    ) -> Self {
        Self { api, auth, session, view, feed }
    }

    /// React to `post_id`. Requires a session; without one nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the bearer token cannot be obtained or the
    /// request fails.
    pub async fn send_reaction(&self, post_id: PostId, kind: ReactionKind) -> Result<ReactionOutcome, ClientError> {
        let Some(user) = self.session.current() else {
            self.view.set_status(messages::SIGN_IN_REQUIRED);
            return Ok(ReactionOutcome::NotSignedIn);
        };

        let id_token = bearer_token(self.auth.as_ref(), self.view.as_ref(), &user).await?;
        let request = ReactionRequest { id_token, post_id, reaction: kind };
        let response = self.api.send_reaction(&request).await.map_err(|e| {
            tracing::warn!(post_id, reaction = %kind, error = %e, "reaction request failed");
            e
        })?;

        if response.is_ok() {
            tracing::debug!(post_id, reaction = %kind, "reaction accepted");
            self.feed.reload_after_write().await;
            return Ok(ReactionOutcome::Accepted);
        }

        let message = response
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| messages::REACTION_FAILED.to_owned());
        self.view.set_status(&message);
        Ok(ReactionOutcome::Rejected(message))
    }
}
