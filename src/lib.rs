//! roomfeed: session and feed client for room-scoped posts.
//!
//! ARCHITECTURE
//! ============
//! - `auth`: provider trait, Firebase implementation, and the auth bridge
//!   that mirrors sign-in status into the session, storage, and view.
//! - `feed` / `reaction`: request/response flows against the posts API,
//!   gated on a present session.
//! - `net`: wire types and the reqwest-backed API client.
//! - `view`: rendering seam; `storage`: persistent key-value seam.

pub mod auth;
pub mod config;
pub mod error;
pub mod feed;
pub mod messages;
pub mod net;
pub mod reaction;
pub mod session;
pub mod storage;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use auth::bridge::{AuthBridge, BridgeOutcome};
pub use auth::{AuthError, AuthProvider, AuthUser};
pub use error::ClientError;
pub use feed::{FeedClient, LoadOutcome, PostOutcome};
pub use reaction::{ReactionClient, ReactionOutcome};
pub use session::SessionHolder;
