//! Wire types for the posts and reaction endpoints.
//!
//! Field names follow the backend's JSON exactly (`idToken`, `room_id`,
//! `post_id`), which mixes camel and snake case.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type RoomId = i64;
pub type PostId = i64;

// =============================================================================
// REACTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Heart,
}

impl ReactionKind {
    pub const ALL: [Self; 2] = [Self::Like, Self::Heart];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Heart => "heart",
        }
    }

    /// Glyph shown on the reaction control.
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Like => "👍",
            Self::Heart => "❤️",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reaction kind '{0}' (expected 'like' or 'heart')")]
pub struct UnknownReaction(pub String);

impl FromStr for ReactionKind {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "like" => Ok(Self::Like),
            "heart" => Ok(Self::Heart),
            other => Err(UnknownReaction(other.to_owned())),
        }
    }
}

// =============================================================================
// POSTS
// =============================================================================

/// A room-scoped message as returned by `GET /api/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Older backends omit the id; such posts cannot be reacted to.
    #[serde(default)]
    pub id: Option<PostId>,
    pub uid: String,
    #[serde(default)]
    pub username: Option<String>,
    pub content: String,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub hearts: Option<u64>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub creator_uid: Option<String>,
}

impl Post {
    /// Display name when set, otherwise the author's uid.
    #[must_use]
    pub fn author_label(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.uid)
    }

    #[must_use]
    pub fn count(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::Like => self.likes.unwrap_or(0),
            ReactionKind::Heart => self.hearts.unwrap_or(0),
        }
    }
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(rename = "idToken")]
    pub id_token: String,
    pub content: String,
    /// Serialized as `null` when the page has no room.
    pub room_id: Option<RoomId>,
}

/// Reply to `POST /api/posts`: `{}`, `{"success": true}`, or `{"error": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatePostResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/reaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRequest {
    #[serde(rename = "idToken")]
    pub id_token: String,
    pub post_id: PostId,
    pub reaction: ReactionKind,
}

/// Reply to `POST /api/reaction`: `{"result": "ok"}` or `{"error": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReactionResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ReactionResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.as_deref() == Some("ok")
    }
}
