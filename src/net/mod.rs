//! Backend REST API: wire types and the HTTP client.

pub mod api;
pub mod types;

pub use api::{ApiError, FeedApi, HttpFeedApi};
