//! Crate-level error type.
//!
//! ERROR HANDLING
//! ==============
//! Application-level failures (provider messages, `{error}` bodies) are
//! surfaced to the view and reported through outcome enums. Only transport,
//! parse, and storage failures reach `ClientError`.

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::net::ApiError;
use crate::storage::StorageError;

/// Errors that terminate a client operation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("auth: {0}")]
    Auth(#[from] AuthError),
    #[error("api: {0}")]
    Api(#[from] ApiError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
