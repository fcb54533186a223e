//! Firebase Authentication over its REST APIs.
//!
//! Thin HTTP wrapper for the Identity Toolkit (`accounts:*`) and Secure Token
//! (`token`) endpoints. Pure parsing in `parse_*` helpers for testability.
//!
//! DESIGN
//! ======
//! The browser SDK keeps the signed-in user across page loads. This client
//! does the same by persisting `{uid, email, refreshToken}` under
//! [`PERSISTENCE_KEY`] in the injected store and restoring it at
//! construction. A restored credential has no id token yet; the first
//! `id_token` call refreshes it.
//!
//! TRADE-OFFS
//! ==========
//! The credential lock is held across the refresh request so concurrent
//! `id_token` callers share one refresh instead of racing two.

#[cfg(test)]
#[path = "firebase_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};

use super::{AuthError, AuthEvents, AuthProvider, AuthUser};
use crate::config::{FirebaseConfig, Timeouts};
use crate::storage::KeyValueStore;

/// Store key holding the persisted credential.
pub const PERSISTENCE_KEY: &str = "firebase:authUser";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone)]
struct Credential {
    user: AuthUser,
    refresh_token: String,
    id_token: Option<String>,
    expires_at: Instant,
}

impl Credential {
    fn fresh_token(&self, now: Instant) -> Option<&str> {
        let token = self.id_token.as_deref()?;
        (self.expires_at.saturating_duration_since(now) > REFRESH_MARGIN).then_some(token)
    }
}

pub struct FirebaseAuth {
    http: reqwest::Client,
    config: FirebaseConfig,
    store: Arc<dyn KeyValueStore>,
    credential: Mutex<Option<Credential>>,
    events: AuthEvents,
}

impl FirebaseAuth {
    /// Build the client and restore any persisted sign-in from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the store
    /// cannot be read. A malformed persisted credential is discarded.
    pub fn new(config: FirebaseConfig, timeouts: Timeouts, store: Arc<dyn KeyValueStore>) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| AuthError::HttpClientBuild(e.to_string()))?;

        let credential = restore_credential(store.as_ref())?;
        let events = AuthEvents::new(credential.as_ref().map(|c| c.user.clone()));
        if let Some(c) = &credential {
            tracing::debug!(uid = %c.user.uid, "restored persisted firebase credential");
        }

        Ok(Self { http, config, store, credential: Mutex::new(credential), events })
    }

    fn identity_url(&self, method: &str) -> String {
        format!("{}/accounts:{method}?key={}", self.config.identity_toolkit_url, self.config.api_key)
    }

    fn token_url(&self) -> String {
        format!("{}/token?key={}", self.config.secure_token_url, self.config.api_key)
    }

    async fn post_json<B: Serialize + Sync>(&self, url: &str, body: &B) -> Result<String, AuthError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;
        read_body(response).await
    }

    async fn password_request(&self, method: &str, email: &str, password: &str) -> Result<AccountResponse, AuthError> {
        let body = PasswordRequest { email, password, return_secure_token: true };
        let text = self.post_json(&self.identity_url(method), &body).await?;
        parse_account_response(&text)
    }

    fn persist(&self, credential: &Credential) -> Result<(), AuthError> {
        let persisted = PersistedCredential {
            uid: credential.user.uid.clone(),
            email: credential.user.email.clone(),
            refresh_token: credential.refresh_token.clone(),
        };
        let raw = serde_json::to_string(&persisted).map_err(|e| AuthError::Persistence(e.to_string()))?;
        self.store
            .set(PERSISTENCE_KEY, &raw)
            .map_err(|e| AuthError::Persistence(e.to_string()))
    }

    fn forget(&self) -> Result<(), AuthError> {
        self.store
            .remove(PERSISTENCE_KEY)
            .map_err(|e| AuthError::Persistence(e.to_string()))
    }

    async fn refresh(&self, credential: &mut Credential) -> Result<(), AuthError> {
        let body = RefreshRequest { grant_type: "refresh_token", refresh_token: &credential.refresh_token };
        let response = self
            .http
            .post(self.token_url())
            .form(&body)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;
        let text = read_body(response).await?;
        let refreshed = parse_refresh_response(&text)?;

        credential.id_token = Some(refreshed.id_token);
        credential.refresh_token = refreshed.refresh_token;
        credential.expires_at = Instant::now() + Duration::from_secs(parse_expires_in(&refreshed.expires_in));
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthProvider for FirebaseAuth {
    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let account = self.password_request("signUp", email, password).await?;
        tracing::info!(uid = %account.local_id, "firebase account created");
        Ok(account.user(email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let account = self
            .password_request("signInWithPassword", email, password)
            .await?;
        let user = account.user(email);
        let credential = Credential {
            user: user.clone(),
            expires_at: Instant::now() + Duration::from_secs(parse_expires_in(&account.expires_in)),
            id_token: Some(account.id_token),
            refresh_token: account.refresh_token,
        };

        {
            let mut slot = self.credential.lock().await;
            self.persist(&credential)?;
            *slot = Some(credential);
        }
        tracing::info!(uid = %user.uid, "firebase sign-in");
        self.events.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        {
            let mut slot = self.credential.lock().await;
            self.forget()?;
            *slot = None;
        }
        self.events.publish(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let body = OobRequest { request_type: "PASSWORD_RESET", email };
        self.post_json(&self.identity_url("sendOobCode"), &body)
            .await?;
        Ok(())
    }

    async fn id_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let mut slot = self.credential.lock().await;
        let Some(credential) = slot.as_mut().filter(|c| c.user.uid == user.uid) else {
            return Err(AuthError::NotSignedIn);
        };

        if let Some(token) = credential.fresh_token(Instant::now()) {
            return Ok(token.to_owned());
        }

        match self.refresh(credential).await {
            Ok(()) => {
                let token = credential.id_token.clone().unwrap_or_default();
                self.persist(credential)?;
                Ok(token)
            }
            Err(e @ AuthError::Provider { .. }) => {
                // The refresh token is revoked or the account is gone.
                tracing::warn!(uid = %user.uid, error = %e, "token refresh rejected; signing out");
                *slot = None;
                drop(slot);
                self.forget()?;
                self.events.publish(None);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.events.subscribe()
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: String,
}

impl AccountResponse {
    fn user(&self, fallback_email: &str) -> AuthUser {
        AuthUser {
            uid: self.local_id.clone(),
            email: self
                .email
                .clone()
                .unwrap_or_else(|| fallback_email.to_owned()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedCredential {
    uid: String,
    email: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

async fn read_body(response: reqwest::Response) -> Result<String, AuthError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AuthError::Request(e.to_string()))?;
    if !status.is_success() {
        return Err(parse_error_body(status.as_u16(), &text));
    }
    Ok(text)
}

fn parse_account_response(json: &str) -> Result<AccountResponse, AuthError> {
    serde_json::from_str(json).map_err(|e| AuthError::Parse(e.to_string()))
}

fn parse_refresh_response(json: &str) -> Result<RefreshResponse, AuthError> {
    serde_json::from_str(json).map_err(|e| AuthError::Parse(e.to_string()))
}

fn parse_expires_in(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(DEFAULT_EXPIRES_IN_SECS)
}

/// Turn a Firebase error body into a provider error with a readable message.
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be
/// at least 6 characters`; the part before ` : ` is the code.
fn parse_error_body(status: u16, body: &str) -> AuthError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return AuthError::Request(format!("status {status}: {body}"));
    };
    let raw = envelope.error.message;
    let (code, detail) = match raw.split_once(" : ") {
        Some((code, detail)) => (code.trim().to_owned(), Some(detail.trim().to_owned())),
        None => (raw.trim().to_owned(), None),
    };
    let message = describe_code(&code)
        .map(str::to_owned)
        .or(detail)
        .unwrap_or_else(|| code.clone());
    AuthError::Provider { code, message }
}

fn describe_code(code: &str) -> Option<&'static str> {
    Some(match code {
        "EMAIL_EXISTS" => "The email address is already in use by another account.",
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "The email address or password is incorrect."
        }
        "USER_DISABLED" => "The user account has been disabled by an administrator.",
        "WEAK_PASSWORD" => "The password must be 6 characters long or more.",
        "INVALID_EMAIL" => "The email address is badly formatted.",
        "MISSING_EMAIL" => "An email address must be provided.",
        "MISSING_PASSWORD" => "A password must be provided.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            "Access to this account has been temporarily disabled due to many failed login attempts."
        }
        "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "INVALID_REFRESH_TOKEN" => {
            "The user's credential is no longer valid. The user must sign in again."
        }
        _ => return None,
    })
}

fn restore_credential(store: &dyn KeyValueStore) -> Result<Option<Credential>, AuthError> {
    let raw = store
        .get(PERSISTENCE_KEY)
        .map_err(|e| AuthError::Persistence(e.to_string()))?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<PersistedCredential>(&raw) {
        Ok(p) => Ok(Some(Credential {
            user: AuthUser { uid: p.uid, email: p.email },
            refresh_token: p.refresh_token,
            id_token: None,
            expires_at: Instant::now(),
        })),
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed persisted credential");
            Ok(None)
        }
    }
}
