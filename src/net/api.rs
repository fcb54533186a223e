//! REST API client for the posts and reaction endpoints.
//!
//! ERROR HANDLING
//! ==============
//! The backend answers validation and auth failures with a 4xx status and an
//! `{"error": ...}` body. Bodies are decoded regardless of status so those
//! messages reach the caller as data; only transport failures and bodies
//! that are not the expected JSON become `ApiError`.

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::types::{CreatePostRequest, CreatePostResponse, Post, ReactionRequest, ReactionResponse, RoomId};
use crate::config::Timeouts;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request failed before a response arrived.
    #[error("API request failed: {0}")]
    Request(String),

    /// The response body was not the expected JSON.
    #[error("API response parse failed (status {status}): {message}")]
    Parse { status: u16, message: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// The three backend calls the client makes.
#[async_trait::async_trait]
pub trait FeedApi: Send + Sync {
    /// `GET /api/posts?room_id=<id>`
    async fn list_posts(&self, room_id: RoomId) -> Result<Vec<Post>, ApiError>;

    /// `POST /api/posts`
    async fn create_post(&self, request: &CreatePostRequest) -> Result<CreatePostResponse, ApiError>;

    /// `POST /api/reaction`
    async fn send_reaction(&self, request: &ReactionRequest) -> Result<ReactionResponse, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpFeedApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFeedApi {
    /// Build a client rooted at `base_url` (scheme + host, no trailing `/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url })
    }

    fn posts_url(&self) -> String {
        format!("{}/api/posts", self.base_url)
    }

    fn room_posts_url(&self, room_id: RoomId) -> String {
        format!("{}/api/posts?room_id={room_id}", self.base_url)
    }

    fn reaction_url(&self) -> String {
        format!("{}/api/reaction", self.base_url)
    }
}

#[async_trait::async_trait]
impl FeedApi for HttpFeedApi {
    async fn list_posts(&self, room_id: RoomId) -> Result<Vec<Post>, ApiError> {
        let response = self
            .http
            .get(self.room_posts_url(room_id))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        decode(response).await
    }

    async fn create_post(&self, request: &CreatePostRequest) -> Result<CreatePostResponse, ApiError> {
        let response = self
            .http
            .post(self.posts_url())
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        decode(response).await
    }

    async fn send_reaction(&self, request: &ReactionRequest) -> Result<ReactionResponse, ApiError> {
        let response = self
            .http
            .post(self.reaction_url())
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        decode(response).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;
    parse_body(status, &text)
}

fn parse_body<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse { status, message: e.to_string() })
}
